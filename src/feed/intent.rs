//! Intents for the discovery feed.

use crate::api::FeedPage;
use crate::mvi::Intent;

/// Intents that can be dispatched to the feed reducer.
///
/// Fetch completions carry the epoch they were issued under; the reducer
/// drops any whose epoch is no longer current.
#[derive(Debug, Clone)]
pub enum FeedIntent {
    /// A Replace was issued; starts a new epoch.
    ReplaceStarted { epoch: u64 },

    /// A Replace fetch returned a page.
    ReplaceSucceeded { epoch: u64, page: FeedPage },

    /// A Replace fetch failed; the current list is kept.
    ReplaceFailed { epoch: u64 },

    /// An Append was scheduled for the given epoch.
    AppendStarted { epoch: u64 },

    /// An Append fetch returned a page.
    AppendSucceeded { epoch: u64, page: FeedPage },

    /// An Append fetch failed; treated as end of stream.
    AppendFailed { epoch: u64 },

    /// Drop a candidate by id (after a confirmed swipe).
    Remove { candidate_id: String },

    /// Browse forward with wrap-around.
    Next,

    /// Browse backward with wrap-around.
    Previous,
}

impl Intent for FeedIntent {}
