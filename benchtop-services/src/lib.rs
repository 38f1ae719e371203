//! Offline-first domain services for the Benchtop data layer.
//!
//! Every service follows the same read path:
//!
//! 1. Issue the remote call with the given filter/pagination parameters.
//! 2. On success, decompose each returned aggregate into the local cache
//!    and return the remote result verbatim — a cache-write failure is
//!    logged and swallowed, never surfaced.
//! 3. On failure, rehydrate from the cache with the same parameters. Data
//!    found locally is returned as a plain success, masking the network
//!    error; an empty cache propagates the original error.
//!
//! Mutations go remote-first: the cache is only updated (or evicted) after
//! the server confirms. The single exception is message read receipts,
//! which apply locally with a pending marker and flush later.
//!
//! UI consumers hold the service structs and stay unaware of caching.

mod annotations;
mod error;
mod instruments;
mod lab_groups;
mod messaging;
mod protocols;
mod reagents;
mod reconcile;
mod sessions;
mod site;
mod storage;
mod stored_reagents;
mod tags;
mod trackers;

pub use annotations::AnnotationService;
pub use error::{ServiceError, ServiceResult};
pub use instruments::InstrumentService;
pub use lab_groups::LabGroupService;
pub use messaging::MessagingService;
pub use protocols::ProtocolService;
pub use reagents::ReagentService;
pub use sessions::SessionService;
pub use site::SiteService;
pub use storage::StorageService;
pub use stored_reagents::StoredReagentService;
pub use tags::TagService;
pub use trackers::ImportTrackerService;
