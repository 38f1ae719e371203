use crate::storage::StorageObjectBasic;
use crate::user::UserBasic;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A shared lab instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: i64,
    pub instrument_name: String,
    #[serde(default)]
    pub instrument_description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Instrument {
    /// Placeholder substituted during rehydration when the referenced
    /// instrument row is absent from the cache.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            instrument_name: String::new(),
            instrument_description: String::new(),
            enabled: false,
            created_at: None,
            updated_at: None,
        }
    }
}

/// An instrument reference as served by the remote: the booking list
/// endpoint embeds the full instrument, the per-instrument endpoint sends
/// only the bare id. Decomposition handles both without letting the bare
/// shape clobber a richer cached copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstrumentRef {
    Full(Instrument),
    Id(i64),
}

impl InstrumentRef {
    pub fn id(&self) -> i64 {
        match self {
            InstrumentRef::Full(instrument) => instrument.id,
            InstrumentRef::Id(id) => *id,
        }
    }

    pub fn as_full(&self) -> Option<&Instrument> {
        match self {
            InstrumentRef::Full(instrument) => Some(instrument),
            InstrumentRef::Id(_) => None,
        }
    }
}

/// A booking/usage window on an instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstrumentUsage {
    pub id: i64,
    pub instrument: InstrumentRef,
    #[serde(default)]
    pub user: Option<UserBasic>,
    #[serde(default)]
    pub time_started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_ended: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceType {
    Routine,
    Emergency,
    Other,
}

impl MaintenanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceType::Routine => "routine",
            MaintenanceType::Emergency => "emergency",
            MaintenanceType::Other => "other",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "pending",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::Cancelled => "cancelled",
        }
    }
}

/// A maintenance record for an instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceLog {
    pub id: i64,
    pub instrument: i64,
    pub maintenance_date: DateTime<Utc>,
    pub maintenance_type: MaintenanceType,
    pub status: MaintenanceStatus,
    #[serde(default)]
    pub maintenance_description: String,
    #[serde(default)]
    pub created_by: Option<UserBasic>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A vendor contact line on support information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub contact_type: String,
    pub contact_value: String,
}

/// Vendor/warranty record attached to an instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportInformation {
    pub id: i64,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_contacts: Vec<ContactEntry>,
    #[serde(default)]
    pub manufacturer_name: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub maintenance_frequency_days: Option<i64>,
    #[serde(default)]
    pub location: Option<StorageObjectBasic>,
    #[serde(default)]
    pub warranty_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub warranty_end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InstrumentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InstrumentUsageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_started: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_ended: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MaintenanceLogRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_type: Option<MaintenanceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MaintenanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_description: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SupportInformationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_contacts: Option<Vec<ContactEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_frequency_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty_end_date: Option<NaiveDate>,
}
