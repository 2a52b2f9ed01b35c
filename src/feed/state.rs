//! State of the discovery feed.

use crate::api::Candidate;
use crate::mvi::State;

/// Live feed snapshot.
///
/// `candidates` never holds two entries with the same id. `cursor` counts
/// every candidate fetched during the current epoch, including ones since
/// swiped away, so the next page starts past them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedState {
    pub candidates: Vec<Candidate>,
    /// Offset for the next Append.
    pub cursor: usize,
    /// The backend may have more candidates for this epoch.
    pub has_more: bool,
    /// A Replace is in flight.
    pub is_loading: bool,
    /// An Append is in flight.
    pub is_loading_more: bool,
    /// Browsing position; always `< candidates.len()` when non-empty.
    pub current_index: usize,
    /// Epoch of the most recently issued Replace.
    pub epoch: u64,
    /// At least one Replace has committed.
    pub loaded: bool,
}

impl State for FeedState {}

impl FeedState {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn contains(&self, candidate_id: &str) -> bool {
        self.candidates.iter().any(|c| c.id == candidate_id)
    }

    pub fn candidate(&self, candidate_id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == candidate_id)
    }

    pub fn position(&self, candidate_id: &str) -> Option<usize> {
        self.candidates.iter().position(|c| c.id == candidate_id)
    }

    /// The candidate under the browsing index.
    pub fn current(&self) -> Option<&Candidate> {
        self.candidates.get(self.current_index)
    }

    /// Nothing left to show and nothing more to fetch.
    pub fn is_finished(&self) -> bool {
        self.loaded && self.candidates.is_empty() && !self.has_more && !self.is_loading_more
    }
}
