use crate::user::UserBasic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A storage location (freezer, shelf, box...) in the lab hierarchy.
///
/// `stored_at` points at the parent location; `path_to_root` is the chain
/// of ancestors the remote computes for display. Offline it is rebuilt by
/// walking cached parent rows, so it may be shorter than the remote's if
/// an ancestor was never cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageObject {
    pub id: i64,
    pub object_name: String,
    pub object_type: String,
    #[serde(default)]
    pub object_description: String,
    #[serde(default)]
    pub stored_at: Option<i64>,
    #[serde(default)]
    pub user: Option<UserBasic>,
    #[serde(default)]
    pub path_to_root: Vec<StorageObjectBasic>,
    /// Computed by the remote; not persisted in the cache.
    #[serde(default)]
    pub child_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Minimal storage-object representation embedded in other aggregates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageObjectBasic {
    pub id: i64,
    #[serde(default)]
    pub object_name: String,
}

impl StorageObjectBasic {
    /// Placeholder substituted during rehydration when the referenced
    /// storage-object row is absent from the cache.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            object_name: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StorageObjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<i64>,
}
