//! Candidate fetching and swipe recording against the discovery backend.

mod error;
mod http;
mod traits;
mod types;

pub use error::FeedError;
pub use http::HttpDiscoveryApi;
pub use traits::DiscoveryApi;
pub use types::{Candidate, FeedPage, PageRequest, ProjectRef, SwipeRequest, SwipeResponse};
