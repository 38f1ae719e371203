//! The generic reconciler: the read/write-path algorithm factored once,
//! with per-domain decomposition and rehydration supplied as closures.
//!
//! Policy, applied uniformly across every domain:
//! - cache writes after a successful fetch are best-effort; a failure is
//!   logged and swallowed so it can never turn a successful fetch into an
//!   error,
//! - within a page, each aggregate is cached independently; one bad item
//!   does not stop the rest,
//! - a remote failure falls back to rehydration; only an empty cache (or
//!   a failing one) propagates the ORIGINAL remote error,
//! - mutations are remote-first; the cache updates only on confirmation.

use crate::error::ServiceResult;
use benchtop_cloud::RemoteResult;
use benchtop_store::StorageResult;
use benchtop_types::Page;
use std::future::Future;
use tracing::{debug, warn};

/// Read path for a single aggregate.
pub(crate) async fn fetch_one<T, F, C, R>(
    remote: F,
    cache: C,
    rehydrate: R,
    what: &str,
) -> ServiceResult<T>
where
    F: Future<Output = RemoteResult<T>>,
    C: FnOnce(&T) -> StorageResult<()>,
    R: FnOnce() -> StorageResult<Option<T>>,
{
    match remote.await {
        Ok(value) => {
            if let Err(e) = cache(&value) {
                warn!("cache write failed for {what}: {e}");
            }
            Ok(value)
        }
        Err(remote_err) => match rehydrate() {
            Ok(Some(value)) => {
                debug!("serving {what} from local cache after remote failure: {remote_err}");
                Ok(value)
            }
            Ok(None) => Err(remote_err.into()),
            Err(e) => {
                warn!("rehydration failed for {what}: {e}");
                Err(remote_err.into())
            }
        },
    }
}

/// Read path for a paginated collection. Offline, `rehydrate` supplies the
/// emulated page: a limit/offset slice under the domain's deterministic
/// ordering, with `count` equal to the matching local rows and no cursors.
pub(crate) async fn fetch_page<T, F, C, R>(
    remote: F,
    cache_each: C,
    rehydrate: R,
    what: &str,
) -> ServiceResult<Page<T>>
where
    F: Future<Output = RemoteResult<Page<T>>>,
    C: Fn(&T) -> StorageResult<()>,
    R: FnOnce() -> StorageResult<Page<T>>,
{
    match remote.await {
        Ok(page) => {
            for item in &page.results {
                if let Err(e) = cache_each(item) {
                    warn!("cache write failed while caching a page of {what}: {e}");
                }
            }
            Ok(page)
        }
        Err(remote_err) => match rehydrate() {
            Ok(page) => {
                debug!("serving {what} page from local cache after remote failure: {remote_err}");
                Ok(page)
            }
            Err(e) => {
                warn!("offline page emulation failed for {what}: {e}");
                Err(remote_err.into())
            }
        },
    }
}

/// Write path for create/update: remote first, cache on confirmation.
pub(crate) async fn mutate<T, F, C>(remote: F, cache: C, what: &str) -> ServiceResult<T>
where
    F: Future<Output = RemoteResult<T>>,
    C: FnOnce(&T) -> StorageResult<()>,
{
    let value = remote.await?;
    if let Err(e) = cache(&value) {
        warn!("cache write failed after {what} mutation: {e}");
    }
    Ok(value)
}

/// Write path for delete: remote first, evict on confirmation.
pub(crate) async fn mutate_delete<F, E>(remote: F, evict: E, what: &str) -> ServiceResult<()>
where
    F: Future<Output = RemoteResult<()>>,
    E: FnOnce() -> StorageResult<()>,
{
    remote.await?;
    if let Err(e) = evict() {
        warn!("cache eviction failed for {what}: {e}");
    }
    Ok(())
}
