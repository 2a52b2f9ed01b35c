//! Current filter criteria and persisted preferences.
//!
//! Pure state plus persistence: no network, no timers. Each mutation
//! broadcasts exactly one [`CriteriaChange`].

use std::sync::Arc;

use tokio::sync::broadcast;

use super::storage::{KeyValueStore, StorageError};
use super::types::{CriteriaChange, FilterCriteria, FilterUpdate, PreferenceVector, Propagation};

/// Storage key holding the JSON-serialized preference vector.
pub const PREFERENCES_KEY: &str = "matchfeed.preferences";

const CHANGE_CHANNEL_SIZE: usize = 32;

pub struct CriteriaStore {
    criteria: FilterCriteria,
    preferences: PreferenceVector,
    storage: Arc<dyn KeyValueStore>,
    changes: broadcast::Sender<CriteriaChange>,
}

impl CriteriaStore {
    /// Open the store, restoring persisted preferences.
    ///
    /// Unreadable or corrupt entries are logged and treated as empty; a
    /// broken local file must not prevent browsing.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let preferences = match load_preferences(storage.as_ref()) {
            Ok(preferences) => preferences,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable persisted preferences");
                PreferenceVector::default()
            }
        };
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_SIZE);

        Self {
            criteria: FilterCriteria::default(),
            preferences,
            storage,
            changes,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn preferences(&self) -> &PreferenceVector {
        &self.preferences
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CriteriaChange> {
        self.changes.subscribe()
    }

    /// Merge a partial filter edit.
    pub fn set_filter(&mut self, update: FilterUpdate) -> CriteriaChange {
        let propagation = self.criteria.apply(update);
        self.emit(propagation)
    }

    /// Replace and persist the preference vector.
    ///
    /// Nothing changes in memory if persisting fails.
    pub fn set_preferences(
        &mut self,
        preferences: PreferenceVector,
    ) -> Result<CriteriaChange, StorageError> {
        let serialized = serde_json::to_string(&preferences)?;
        self.storage.set(PREFERENCES_KEY, &serialized)?;
        tracing::debug!(answers = preferences.len(), "Preferences saved");
        self.preferences = preferences;
        Ok(self.emit(Propagation::Immediate))
    }

    pub fn clear_filters(&mut self) -> CriteriaChange {
        let propagation = if self.criteria.is_empty() {
            Propagation::Unchanged
        } else {
            Propagation::Immediate
        };
        self.criteria = FilterCriteria::default();
        self.emit(propagation)
    }

    pub fn clear_preferences(&mut self) -> Result<CriteriaChange, StorageError> {
        self.storage.remove(PREFERENCES_KEY)?;
        self.preferences = PreferenceVector::default();
        Ok(self.emit(Propagation::Immediate))
    }

    fn emit(&self, propagation: Propagation) -> CriteriaChange {
        let change = CriteriaChange {
            criteria: self.criteria.clone(),
            preferences: self.preferences.clone(),
            propagation,
        };
        // No subscribers is fine.
        let _ = self.changes.send(change.clone());
        change
    }
}

fn load_preferences(storage: &dyn KeyValueStore) -> Result<PreferenceVector, StorageError> {
    match storage.get(PREFERENCES_KEY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(PreferenceVector::default()),
    }
}
