//! Swipe decisions, outcomes, and the in-flight registry.
//!
//! The asynchronous swipe operation itself lives on the feed controller,
//! since it has to resolve and remove candidates from the feed state.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::api::FeedError;

/// A user's decision on a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SwipeDecision {
    #[serde(rename = "right")]
    Accept,
    #[serde(rename = "left")]
    Reject,
}

impl SwipeDecision {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Accept => "right",
            Self::Reject => "left",
        }
    }
}

impl fmt::Display for SwipeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept => f.write_str("accept"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

impl FromStr for SwipeDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accept" | "right" | "yes" => Ok(Self::Accept),
            "reject" | "left" | "no" => Ok(Self::Reject),
            other => Err(format!("unknown swipe decision '{}'", other)),
        }
    }
}

/// Outcome of a confirmed swipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeEvent {
    pub candidate_id: String,
    pub decision: SwipeDecision,
    pub founder_id: String,
    pub project_id: Option<String>,
    /// The backend detected a mutual accept.
    pub match_created: bool,
}

/// Candidates with a swipe currently pending.
#[derive(Clone, Default)]
pub struct InFlightSwipes {
    pending: Arc<Mutex<HashSet<String>>>,
}

impl InFlightSwipes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a swipe for `candidate_id`.
    ///
    /// The returned guard releases the slot when dropped, whatever path the
    /// swipe takes. A second registration while the first guard is alive
    /// fails with [`FeedError::Conflict`].
    pub fn begin(&self, candidate_id: &str) -> Result<SwipeSlot, FeedError> {
        let mut pending = self.pending.lock();
        if !pending.insert(candidate_id.to_string()) {
            return Err(FeedError::Conflict {
                candidate_id: candidate_id.to_string(),
            });
        }
        Ok(SwipeSlot {
            pending: self.pending.clone(),
            candidate_id: candidate_id.to_string(),
        })
    }

    pub fn is_pending(&self, candidate_id: &str) -> bool {
        self.pending.lock().contains(candidate_id)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

/// Registration held for the duration of one swipe.
pub struct SwipeSlot {
    pending: Arc<Mutex<HashSet<String>>>,
    candidate_id: String,
}

impl Drop for SwipeSlot {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.candidate_id);
    }
}
