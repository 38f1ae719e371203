//! Domain aggregates and wire types for the Benchtop data layer.
//!
//! Every type here mirrors the shape the remote API serves: aggregates carry
//! fully-populated nested objects (a `StoredReagent` embeds its `Reagent`,
//! `UserBasic` and `StorageObjectBasic`), while the local cache flattens them
//! into foreign keys. List endpoints wrap results in the [`Page`] envelope.
//!
//! Create/update payloads are explicit optional-field request structs, one
//! per operation — a field left as `None` is omitted from the JSON body and
//! the remote keeps its current value.

mod annotation;
mod instrument;
mod lab_group;
mod messaging;
mod misc;
mod page;
mod protocol;
mod reagent;
mod session;
mod storage;
mod tag;
mod user;

pub use annotation::{Annotation, AnnotationRequest, AnnotationType};
pub use instrument::{
    ContactEntry, Instrument, InstrumentRef, InstrumentRequest, InstrumentUsage,
    InstrumentUsageRequest, MaintenanceLog, MaintenanceLogRequest, MaintenanceStatus,
    MaintenanceType, SupportInformation, SupportInformationRequest,
};
pub use lab_group::{LabGroup, LabGroupRequest};
pub use messaging::{
    Message, MessageAttachment, MessagePriority, MessageRecipient, MessageRequest, MessageThread,
    MessageType, ThreadRequest,
};
pub use misc::{ImportStatus, ImportTracker, SiteSettings, SiteSettingsRequest};
pub use page::Page;
pub use protocol::{
    Protocol, ProtocolReagent, ProtocolRequest, ProtocolSection, ProtocolSectionRequest,
    ProtocolStep, ProtocolStepRequest,
};
pub use reagent::{Reagent, ReagentRequest, StoredReagent, StoredReagentRequest};
pub use session::{Session, SessionRequest};
pub use storage::{StorageObject, StorageObjectBasic, StorageObjectRequest};
pub use tag::{Tag, TagRequest};
pub use user::UserBasic;
