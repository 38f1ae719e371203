use crate::storage::StorageObjectBasic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lab group (team) that owns shared resources.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_core_facility: bool,
    #[serde(default)]
    pub default_storage: Option<StorageObjectBasic>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LabGroupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_core_facility: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_storage_id: Option<i64>,
}
