//! Low-water-mark prefetch trigger.

use super::state::FeedState;

pub const DEFAULT_LOW_WATER_MARK: usize = 5;

/// Decides when the feed should fetch the next page in the background.
///
/// Evaluated synchronously after every removal. Because the caller applies
/// `AppendStarted` under the same lock, `is_loading_more` is already set by
/// the time the next removal is evaluated, so one breach schedules one
/// Append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchPolicy {
    pub low_water_mark: usize,
}

impl Default for PrefetchPolicy {
    fn default() -> Self {
        Self {
            low_water_mark: DEFAULT_LOW_WATER_MARK,
        }
    }
}

impl PrefetchPolicy {
    pub fn new(low_water_mark: usize) -> Self {
        Self { low_water_mark }
    }

    pub fn should_append(&self, state: &FeedState) -> bool {
        state.candidates.len() <= self.low_water_mark
            && state.has_more
            && !state.is_loading_more
            && !state.is_loading
    }
}
