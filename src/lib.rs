//! Discovery feed client for founder matching.
//!
//! Presents a stream of scored candidates, records accept/reject swipes,
//! and pages in more candidates as the stream is consumed, while filter and
//! preference edits re-query the backend.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod criteria;
pub mod debounce;
pub mod feed;
pub mod mvi;
pub mod swipe;
pub mod telemetry;

pub use api::{Candidate, DiscoveryApi, FeedError, FeedPage, HttpDiscoveryApi};
pub use controller::{AppendOutcome, FeedController, FeedEvent, FeedSettings, ReplaceOutcome};
pub use criteria::{CriteriaStore, FilterCriteria, FilterUpdate, PreferenceVector};
pub use feed::FeedState;
pub use swipe::{SwipeDecision, SwipeEvent};
