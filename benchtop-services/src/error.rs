//! Service façade error types.

use benchtop_cloud::RemoteError;
use benchtop_store::StorageError;
use thiserror::Error;

/// Result type returned to UI consumers. Never panics past this boundary.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by domain services.
///
/// A `Remote` error means both the network call and the offline fallback
/// came up empty; the original remote failure is preserved. `Storage`
/// only surfaces from purely local operations (e.g. flushing pending read
/// receipts) — cache writes on the read path are swallowed by policy.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
