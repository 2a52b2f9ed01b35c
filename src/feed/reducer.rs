//! Reducer for the discovery feed.

use std::collections::HashSet;

use crate::api::{Candidate, FeedPage};
use crate::mvi::Reducer;

use super::intent::FeedIntent;
use super::navigation;
use super::state::FeedState;

/// Reducer for feed state transitions.
pub struct FeedReducer;

impl Reducer for FeedReducer {
    type State = FeedState;
    type Intent = FeedIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            FeedIntent::ReplaceStarted { epoch } => {
                if epoch <= state.epoch {
                    return state;
                }
                // A new epoch abandons any Append of the previous one.
                FeedState {
                    epoch,
                    is_loading: true,
                    is_loading_more: false,
                    ..state
                }
            }

            FeedIntent::ReplaceSucceeded { epoch, page } => {
                if epoch != state.epoch {
                    return state;
                }
                let fetched = page.len();
                let exhausted = page.exhausted;
                FeedState {
                    candidates: dedupe(page),
                    cursor: fetched,
                    has_more: !exhausted,
                    is_loading: false,
                    is_loading_more: false,
                    current_index: 0,
                    epoch,
                    loaded: true,
                }
            }

            FeedIntent::ReplaceFailed { epoch } => {
                if epoch != state.epoch {
                    return state;
                }
                FeedState {
                    is_loading: false,
                    ..state
                }
            }

            FeedIntent::AppendStarted { epoch } => {
                if epoch != state.epoch
                    || !state.has_more
                    || state.is_loading_more
                    || state.is_loading
                {
                    return state;
                }
                FeedState {
                    is_loading_more: true,
                    ..state
                }
            }

            FeedIntent::AppendSucceeded { epoch, page } => {
                if epoch != state.epoch || !state.is_loading_more {
                    return state;
                }
                let FeedState {
                    mut candidates,
                    cursor,
                    current_index,
                    ..
                } = state;

                // Server offset tracks everything requested, duplicates included.
                let fetched = page.len();
                let exhausted = page.exhausted;
                let mut seen: HashSet<String> = candidates.iter().map(|c| c.id.clone()).collect();
                candidates.extend(
                    page.candidates
                        .into_iter()
                        .filter(|c| seen.insert(c.id.clone())),
                );
                let current_index = navigation::clamp(current_index, candidates.len());

                FeedState {
                    candidates,
                    cursor: cursor + fetched,
                    has_more: !exhausted,
                    is_loading_more: false,
                    current_index,
                    ..state
                }
            }

            FeedIntent::AppendFailed { epoch } => {
                if epoch != state.epoch || !state.is_loading_more {
                    return state;
                }
                FeedState {
                    has_more: false,
                    is_loading_more: false,
                    ..state
                }
            }

            FeedIntent::Remove { candidate_id } => {
                let FeedState {
                    mut candidates,
                    current_index,
                    ..
                } = state;
                candidates.retain(|c| c.id != candidate_id);
                let current_index = navigation::clamp(current_index, candidates.len());
                FeedState {
                    candidates,
                    current_index,
                    ..state
                }
            }

            FeedIntent::Next => FeedState {
                current_index: navigation::next(state.current_index, state.candidates.len()),
                ..state
            },

            FeedIntent::Previous => FeedState {
                current_index: navigation::previous(state.current_index, state.candidates.len()),
                ..state
            },
        }
    }
}

/// Keep the first occurrence of every id, preserving server order.
fn dedupe(page: FeedPage) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    page.candidates
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect()
}
