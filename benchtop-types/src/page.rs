//! Remote pagination envelope.

use serde::{Deserialize, Serialize};

/// The paginated list shape every collection endpoint returns:
/// `{ count, next, previous, results }`.
///
/// `count` is the total number of rows matching the query, independent of
/// the requested slice. `next`/`previous` are opaque cursor URLs when the
/// page came from the network; offline reconstructions always carry `None`
/// there — only limit/offset slicing is navigable against the local cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Builds the offline emulation of a remote page.
    pub fn offline(count: i64, results: Vec<T>) -> Self {
        Self {
            count,
            next: None,
            previous: None,
            results,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
