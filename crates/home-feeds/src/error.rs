//! Error types for the home-feeds crate.

use thiserror::Error;

/// Errors that can occur while reading a remote feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The request could not be sent or the body could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("Endpoint returned HTTP {0}")]
    Status(u16),

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The response was well-formed but carried nothing to show.
    #[error("No {0} in response")]
    Empty(&'static str),

    /// The request did not complete within the allotted time.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A configured base URL could not be used to build a request.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl FeedError {
    /// Returns `true` when the failure happened before any response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, FeedError::Network(_) | FeedError::Timeout(_))
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FeedError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            FeedError::Status(status.as_u16())
        } else {
            FeedError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Decode(e.to_string())
    }
}
