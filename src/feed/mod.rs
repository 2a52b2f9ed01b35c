//! Discovery feed state machine.
//!
//! # Architecture
//!
//! Uses the MVI pattern:
//! - `state.rs` - Candidate list, cursor, loading flags, browsing index
//! - `intent.rs` - Fetch lifecycle, removal and browsing actions
//! - `reducer.rs` - State transitions, including stale-epoch discard
//! - `navigation.rs` - Circular index arithmetic
//! - `prefetch.rs` - Low-water-mark trigger

mod intent;
pub mod navigation;
mod prefetch;
mod reducer;
mod state;

pub use intent::FeedIntent;
pub use prefetch::{PrefetchPolicy, DEFAULT_LOW_WATER_MARK};
pub use reducer::FeedReducer;
pub use state::FeedState;
