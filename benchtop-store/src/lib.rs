//! SQLite cache store for the Benchtop data layer.
//!
//! Every domain aggregate the remote API serves is decomposed here into a
//! normalized parent table plus shared side-tables (users, tags, reagents,
//! storage objects) and cross-reference tables for collection relations.
//! The reverse direction — rehydration — re-joins those tables into the
//! aggregate shape the remote would have returned, substituting
//! placeholders for children that were never cached.
//!
//! # Architecture
//!
//! - One [`CacheDb`] wraps a single connection; its impl is split across
//!   per-domain modules.
//! - Identity is always the remote-assigned primary key (integer, or the
//!   session `unique_id` string). The cache never allocates ids.
//! - Each `cache_*` call runs in one transaction: children first, then the
//!   parent row, then full replacement of cross-reference tables.
//! - Eviction after a remote-confirmed delete cascades to child and
//!   association rows in the same transaction.

mod annotations;
mod db;
mod error;
mod instruments;
mod lab_groups;
mod messaging;
mod protocols;
mod reagents;
mod schema;
mod sessions;
mod site;
mod storage_objects;
mod stored_reagents;
mod tags;
mod trackers;
mod users;

pub use db::CacheDb;
pub use error::{StorageError, StorageResult};
pub use messaging::PendingReadReceipt;
