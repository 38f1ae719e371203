//! Gateway error types.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur while talking to the remote API.
///
/// The cache-reconciliation layer never distinguishes variants — any
/// failure triggers the offline fallback — but the message is preserved
/// and surfaced to the caller when the fallback also comes up empty.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("authentication required")]
    AuthRequired,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
