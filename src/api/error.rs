//! Error taxonomy for feed and swipe operations.

use thiserror::Error;

/// Errors surfaced by fetches, swipes and feed operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeedError {
    /// Transport failure: no response was received.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The backend rejected the caller's identity (401/403).
    #[error("Not authorized (HTTP {status})")]
    Auth { status: u16 },

    /// Any other non-2xx response.
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// A swipe for this candidate is already in flight.
    #[error("Swipe already in progress for candidate '{candidate_id}'")]
    Conflict { candidate_id: String },

    /// The candidate is not (or no longer) in the feed.
    #[error("Candidate '{candidate_id}' not found in feed")]
    CandidateNotFound { candidate_id: String },

    /// The controller was disposed.
    #[error("Feed controller has been disposed")]
    Disposed,
}

impl FeedError {
    pub fn network(err: impl std::fmt::Display) -> Self {
        FeedError::Network {
            message: err.to_string(),
        }
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            FeedError::Network { .. } | FeedError::Conflict { .. } => true,
            FeedError::Server { status, .. } => *status >= 500 || *status == 429,
            FeedError::Auth { .. }
            | FeedError::InvalidResponse { .. }
            | FeedError::CandidateNotFound { .. }
            | FeedError::Disposed => false,
        }
    }

    /// Get error type string for logs and event payloads
    pub fn error_type(&self) -> &'static str {
        match self {
            FeedError::Network { .. } => "network_error",
            FeedError::Auth { .. } => "auth_error",
            FeedError::Server { .. } => "server_error",
            FeedError::InvalidResponse { .. } => "invalid_response",
            FeedError::Conflict { .. } => "conflict",
            FeedError::CandidateNotFound { .. } => "candidate_not_found",
            FeedError::Disposed => "disposed",
        }
    }
}
