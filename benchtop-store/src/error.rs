//! Cache store error types.

use thiserror::Error;

/// Result type for cache store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading or writing the local cache.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
