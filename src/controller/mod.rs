//! Discovery feed controller.
//!
//! The controller is the single writer of [`FeedState`]. It turns criteria
//! changes into Replace fetches, schedules Append prefetches, runs swipes,
//! and broadcasts [`FeedEvent`]s so a UI can stay a pure subscriber.
//!
//! # Epochs
//!
//! Every Replace opens a new epoch. The latest epoch is published on a
//! `watch` channel; an in-flight fetch whose epoch is superseded abandons
//! its request, and any response that still slips through is dropped by
//! the reducer's epoch check. Results therefore land in issue order, never
//! completion order.
//!
//! # Lifecycle
//!
//! Created with its collaborators, reset on every epoch change, disposed
//! with [`FeedController::dispose`] (or when the last handle drops), after
//! which pending timers are cancelled and background work becomes a no-op.

mod events;
mod swipe;

pub use events::FeedEvent;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};

use crate::api::{Candidate, DiscoveryApi, FeedError, FeedPage, PageRequest};
use crate::config::FeedConfig;
use crate::criteria::{
    CriteriaChange, CriteriaStore, FilterCriteria, FilterUpdate, PreferenceVector, Propagation,
    StorageError,
};
use crate::debounce::Debouncer;
use crate::feed::{FeedIntent, FeedReducer, FeedState, PrefetchPolicy};
use crate::mvi::Store;
use crate::swipe::InFlightSwipes;

const EVENT_CHANNEL_SIZE: usize = 64;

/// Pacing and pagination knobs for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSettings {
    pub page_size: usize,
    pub low_water_mark: usize,
    /// Quiet period for free-text filter edits.
    pub search_debounce: Duration,
    /// Delay between a confirmed swipe and removal, for exit animations.
    pub swipe_exit_delay: Duration,
}

impl From<&FeedConfig> for FeedSettings {
    fn from(config: &FeedConfig) -> Self {
        Self {
            page_size: config.page_size,
            low_water_mark: config.low_water_mark,
            search_debounce: Duration::from_millis(config.search_debounce_ms),
            swipe_exit_delay: Duration::from_millis(config.swipe_exit_delay_ms),
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

/// Result of a Replace that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The page replaced the feed.
    Replaced { fetched: usize, has_more: bool },
    /// A newer Replace was issued first; this result was discarded.
    Superseded,
}

/// Result of an Append. Append failures never surface as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Guard refused: already loading, exhausted, or a Replace is pending.
    Skipped,
    Appended {
        fetched: usize,
        added: usize,
        has_more: bool,
    },
    /// The epoch changed while fetching.
    Superseded,
    /// The fetch failed; the feed is treated as exhausted for this epoch.
    Failed,
}

/// Feed state plus the criteria the committed epoch was fetched with.
///
/// Appends reuse the committed criteria so a pending (debounced) text edit
/// never mixes into an offset computed for the previous query.
#[derive(Default)]
struct Inner {
    feed: Store<FeedReducer>,
    criteria: FilterCriteria,
    preferences: PreferenceVector,
}

impl Inner {
    fn state(&self) -> &FeedState {
        self.feed.state()
    }

    fn dispatch(&mut self, intent: FeedIntent) -> bool {
        self.feed.dispatch(intent)
    }

    /// Mark an Append as started and build its request, if the guard allows.
    fn start_append(&mut self, page_size: usize) -> Option<(u64, PageRequest)> {
        let epoch = self.state().epoch;
        if !self.dispatch(FeedIntent::AppendStarted { epoch }) {
            return None;
        }
        let request = PageRequest {
            criteria: self.criteria.clone(),
            preferences: self.preferences.clone(),
            cursor: self.state().cursor,
            page_size,
        };
        Some((epoch, request))
    }
}

struct Shared {
    api: Arc<dyn DiscoveryApi>,
    settings: FeedSettings,
    policy: PrefetchPolicy,
    inner: Mutex<Inner>,
    criteria: Mutex<CriteriaStore>,
    epoch: watch::Sender<u64>,
    debouncer: Debouncer,
    in_flight: InFlightSwipes,
    events: broadcast::Sender<FeedEvent>,
    disposed: AtomicBool,
}

/// Cloneable handle to the discovery feed.
#[derive(Clone)]
pub struct FeedController {
    shared: Arc<Shared>,
}

impl FeedController {
    pub fn new(api: Arc<dyn DiscoveryApi>, criteria: CriteriaStore, settings: FeedSettings) -> Self {
        let (epoch, _) = watch::channel(0);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Self {
            shared: Arc::new(Shared {
                api,
                policy: PrefetchPolicy::new(settings.low_water_mark),
                debouncer: Debouncer::new(settings.search_debounce),
                settings,
                inner: Mutex::new(Inner::default()),
                criteria: Mutex::new(criteria),
                epoch,
                in_flight: InFlightSwipes::new(),
                events,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.shared.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.shared.events.subscribe()
    }

    pub fn subscribe_criteria(&self) -> broadcast::Receiver<CriteriaChange> {
        self.shared.criteria.lock().subscribe()
    }

    /// Copy of the current feed state.
    pub fn snapshot(&self) -> FeedState {
        self.shared.inner.lock().state().clone()
    }

    pub fn current(&self) -> Option<Candidate> {
        self.shared.inner.lock().state().current().cloned()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.shared.criteria.lock().criteria().clone()
    }

    pub fn preferences(&self) -> PreferenceVector {
        self.shared.criteria.lock().preferences().clone()
    }

    /// Whether a text edit is still waiting out its debounce period.
    pub fn has_pending_refetch(&self) -> bool {
        self.shared.debouncer.is_pending()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::SeqCst)
    }

    /// Tear down: cancel the debounce timer and supersede in-flight fetches.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.debouncer.cancel();
        self.shared
            .epoch
            .send_modify(|epoch| *epoch = epoch.wrapping_add(1));
        tracing::debug!("Feed controller disposed");
    }

    // ----- criteria -----

    /// Merge a filter edit. Text edits refetch after the debounce period,
    /// enumerable edits refetch immediately.
    ///
    /// Outside a Tokio runtime the criteria still change but no refetch is
    /// scheduled.
    pub fn set_filter(&self, update: FilterUpdate) -> CriteriaChange {
        let change = self.shared.criteria.lock().set_filter(update);
        self.propagate(change.propagation);
        change
    }

    /// Save preferences and refetch immediately.
    pub fn set_preferences(
        &self,
        preferences: PreferenceVector,
    ) -> Result<CriteriaChange, StorageError> {
        let change = self.shared.criteria.lock().set_preferences(preferences)?;
        self.propagate(change.propagation);
        Ok(change)
    }

    pub fn clear_filters(&self) -> CriteriaChange {
        let change = self.shared.criteria.lock().clear_filters();
        self.propagate(change.propagation);
        change
    }

    pub fn clear_preferences(&self) -> Result<CriteriaChange, StorageError> {
        let change = self.shared.criteria.lock().clear_preferences()?;
        self.propagate(change.propagation);
        Ok(change)
    }

    fn propagate(&self, propagation: Propagation) {
        if self.is_disposed() {
            return;
        }
        match propagation {
            Propagation::Unchanged => {}
            Propagation::Debounced => {
                let weak = Arc::downgrade(&self.shared);
                self.shared.debouncer.schedule(move || {
                    if let Some(shared) = weak.upgrade() {
                        FeedController { shared }.spawn_replace();
                    }
                });
            }
            Propagation::Immediate => {
                // The immediate Replace already reads the latest text.
                self.shared.debouncer.cancel();
                self.spawn_replace();
            }
        }
    }

    // ----- replace -----

    /// Replace the feed with the first page for the current criteria.
    ///
    /// Returns `Superseded` if a newer Replace was issued before this one
    /// resolved. On failure the previous list is kept and the error is
    /// returned (and broadcast as [`FeedEvent::ReplaceFailed`]).
    pub async fn refresh(&self) -> Result<ReplaceOutcome, FeedError> {
        if self.is_disposed() {
            return Err(FeedError::Disposed);
        }
        let (epoch, request) = self.begin_replace();
        self.complete_replace(epoch, request).await
    }

    /// Issue the Replace now so its epoch reflects call order, then fetch
    /// in the background.
    fn spawn_replace(&self) {
        if self.is_disposed() {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("No Tokio runtime, skipping background refresh");
            return;
        };
        let (epoch, request) = self.begin_replace();
        let this = self.clone();
        runtime.spawn(async move {
            // Failures are logged and broadcast by complete_replace.
            let _ = this.complete_replace(epoch, request).await;
        });
    }

    fn begin_replace(&self) -> (u64, PageRequest) {
        // Lock order: criteria, then feed.
        let criteria = self.shared.criteria.lock();
        let mut inner = self.shared.inner.lock();

        let epoch = inner.state().epoch + 1;
        inner.dispatch(FeedIntent::ReplaceStarted { epoch });
        self.shared.epoch.send_replace(epoch);

        let request = PageRequest {
            criteria: criteria.criteria().clone(),
            preferences: criteria.preferences().clone(),
            cursor: 0,
            page_size: self.shared.settings.page_size,
        };
        drop(inner);
        drop(criteria);

        tracing::debug!(epoch, "Replace issued");
        self.emit(FeedEvent::Updated);
        (epoch, request)
    }

    async fn complete_replace(
        &self,
        epoch: u64,
        request: PageRequest,
    ) -> Result<ReplaceOutcome, FeedError> {
        let Some(result) = self.fetch_in_epoch(epoch, &request).await else {
            tracing::debug!(epoch, "Replace superseded before completion");
            return Ok(ReplaceOutcome::Superseded);
        };

        match result {
            Ok(page) => {
                let fetched = page.len();
                let committed = {
                    let mut inner = self.shared.inner.lock();
                    if inner.state().epoch != epoch || self.is_disposed() {
                        None
                    } else {
                        inner.dispatch(FeedIntent::ReplaceSucceeded { epoch, page });
                        inner.criteria = request.criteria;
                        inner.preferences = request.preferences;
                        Some(inner.state().has_more)
                    }
                };

                match committed {
                    Some(has_more) => {
                        tracing::info!(epoch, fetched, has_more, "Feed replaced");
                        self.emit(FeedEvent::Updated);
                        Ok(ReplaceOutcome::Replaced { fetched, has_more })
                    }
                    None => {
                        tracing::debug!(epoch, "Discarding stale replace response");
                        Ok(ReplaceOutcome::Superseded)
                    }
                }
            }
            Err(error) => {
                let current = {
                    let mut inner = self.shared.inner.lock();
                    inner.state().epoch == epoch
                        && !self.is_disposed()
                        && inner.dispatch(FeedIntent::ReplaceFailed { epoch })
                };
                if !current {
                    tracing::debug!(epoch, error = %error, "Discarding stale replace failure");
                    return Ok(ReplaceOutcome::Superseded);
                }

                tracing::warn!(
                    epoch,
                    error = %error,
                    error_type = error.error_type(),
                    "Replace failed, keeping previous feed"
                );
                self.emit(FeedEvent::Updated);
                self.emit(FeedEvent::ReplaceFailed {
                    epoch,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Run the fetch unless the epoch is superseded first.
    async fn fetch_in_epoch(
        &self,
        epoch: u64,
        request: &PageRequest,
    ) -> Option<Result<FeedPage, FeedError>> {
        let mut epoch_rx = self.shared.epoch.subscribe();
        tokio::select! {
            result = self.shared.api.fetch_page(request) => Some(result),
            _ = epoch_rx.wait_for(|latest| *latest != epoch) => None,
        }
    }

    // ----- append -----

    /// Fetch the next page, if one may exist and none is in flight.
    pub async fn load_more(&self) -> AppendOutcome {
        if self.is_disposed() {
            return AppendOutcome::Skipped;
        }
        let started = {
            let mut inner = self.shared.inner.lock();
            inner.start_append(self.shared.settings.page_size)
        };
        let Some((epoch, request)) = started else {
            return AppendOutcome::Skipped;
        };
        self.emit(FeedEvent::Updated);
        self.run_append(epoch, request).await
    }

    async fn run_append(&self, epoch: u64, request: PageRequest) -> AppendOutcome {
        let cursor = request.cursor;
        let Some(result) = self.fetch_in_epoch(epoch, &request).await else {
            tracing::debug!(epoch, cursor, "Append superseded before completion");
            return AppendOutcome::Superseded;
        };

        match result {
            Ok(page) => {
                let fetched = page.len();
                let applied = {
                    let mut inner = self.shared.inner.lock();
                    let before = inner.state().len();
                    if !self.is_disposed()
                        && inner.dispatch(FeedIntent::AppendSucceeded { epoch, page })
                    {
                        Some((inner.state().len() - before, inner.state().has_more))
                    } else {
                        None
                    }
                };

                match applied {
                    Some((added, has_more)) => {
                        tracing::debug!(epoch, cursor, fetched, added, has_more, "Page appended");
                        self.emit(FeedEvent::Updated);
                        AppendOutcome::Appended {
                            fetched,
                            added,
                            has_more,
                        }
                    }
                    None => AppendOutcome::Superseded,
                }
            }
            Err(error) => {
                let applied = {
                    let mut inner = self.shared.inner.lock();
                    !self.is_disposed() && inner.dispatch(FeedIntent::AppendFailed { epoch })
                };
                if !applied {
                    return AppendOutcome::Superseded;
                }
                // Background prefetch must not interrupt browsing.
                tracing::warn!(
                    epoch,
                    cursor,
                    error = %error,
                    "Append failed, ending feed for this epoch"
                );
                self.emit(FeedEvent::Updated);
                AppendOutcome::Failed
            }
        }
    }

    // ----- removal & browsing -----

    /// Drop a candidate from the feed. Returns false if it was not present.
    ///
    /// Evaluates the prefetch policy inline and, on a low-water breach,
    /// starts exactly one background Append.
    pub fn remove_candidate(&self, candidate_id: &str) -> bool {
        // Without a runtime the removal still applies, only the prefetch is skipped.
        let runtime = Handle::try_current().ok();
        let prefetch = {
            let mut inner = self.shared.inner.lock();
            if !inner.dispatch(FeedIntent::Remove {
                candidate_id: candidate_id.to_string(),
            }) {
                return false;
            }
            if runtime.is_some()
                && !self.is_disposed()
                && self.shared.policy.should_append(inner.state())
            {
                inner
                    .start_append(self.shared.settings.page_size)
                    .map(|started| (started, inner.state().len()))
            } else {
                None
            }
        };

        tracing::debug!(candidate_id, "Candidate removed");
        self.emit(FeedEvent::Updated);

        if let (Some(runtime), Some(((epoch, request), remaining))) = (runtime, prefetch) {
            tracing::debug!(
                epoch,
                remaining,
                cursor = request.cursor,
                "Low-water mark reached, prefetching"
            );
            let this = self.clone();
            runtime.spawn(async move {
                this.run_append(epoch, request).await;
            });
        }
        true
    }

    /// Browse forward (wraps to the first candidate).
    pub fn next(&self) -> Option<Candidate> {
        self.navigate(FeedIntent::Next)
    }

    /// Browse backward (wraps to the last candidate).
    pub fn previous(&self) -> Option<Candidate> {
        self.navigate(FeedIntent::Previous)
    }

    fn navigate(&self, intent: FeedIntent) -> Option<Candidate> {
        let (changed, current) = {
            let mut inner = self.shared.inner.lock();
            let changed = inner.dispatch(intent);
            (changed, inner.state().current().cloned())
        };
        if changed {
            self.emit(FeedEvent::Updated);
        }
        current
    }

    fn emit(&self, event: FeedEvent) {
        // No subscribers is fine.
        let _ = self.shared.events.send(event);
    }
}
