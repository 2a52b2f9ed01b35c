use crate::api::FeedError;
use crate::swipe::{SwipeDecision, SwipeEvent};

/// Notifications broadcast by the feed controller.
///
/// Subscribers read the current state with `FeedController::snapshot`
/// when they see `Updated`.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Feed state changed.
    Updated,

    /// The latest Replace failed; the previous list is still shown.
    ReplaceFailed { epoch: u64, error: FeedError },

    /// A swipe was submitted; a UI may start its exit animation.
    SwipeStarted {
        candidate_id: String,
        decision: SwipeDecision,
    },

    /// A swipe produced a mutual match. Sent before the candidate leaves
    /// the feed.
    MatchCreated(SwipeEvent),

    /// A swipe could not be recorded; the candidate stays in place.
    SwipeFailed {
        candidate_id: String,
        error: FeedError,
    },
}
