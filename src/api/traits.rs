//! Seam between the feed core and the discovery backend.

use async_trait::async_trait;

use super::error::FeedError;
use super::types::{FeedPage, PageRequest, SwipeRequest, SwipeResponse};

/// Backend operations the feed controller depends on.
///
/// Implementations must not retry internally; retry policy belongs to the
/// caller. Both calls are cancellation-safe: dropping the future abandons
/// the request.
#[async_trait]
pub trait DiscoveryApi: Send + Sync {
    /// Fetch one page of candidates starting at `request.cursor`.
    ///
    /// Candidates come back in server order and the page is marked
    /// exhausted when fewer than `request.page_size` were returned.
    async fn fetch_page(&self, request: &PageRequest) -> Result<FeedPage, FeedError>;

    /// Record a swipe decision.
    async fn record_swipe(&self, request: &SwipeRequest) -> Result<SwipeResponse, FeedError>;
}
