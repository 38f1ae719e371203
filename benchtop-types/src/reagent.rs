use crate::storage::StorageObjectBasic;
use crate::user::UserBasic;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A reagent definition (name + unit), referenced by stored reagents and
/// protocol reagent lists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reagent {
    pub id: i64,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Reagent {
    /// Placeholder substituted during rehydration when the referenced
    /// reagent row is absent from the cache.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            name: String::new(),
            unit: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReagentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A physical quantity of a reagent sitting in a storage location.
///
/// The remote serves the nested `reagent`, `storage_object` and `user`
/// fully populated; the cache flattens each into its own table and keeps
/// only the foreign keys on the stored-reagent row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredReagent {
    pub id: i64,
    pub reagent: Reagent,
    pub storage_object: StorageObjectBasic,
    pub quantity: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub user: Option<UserBasic>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub shareable: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoredReagentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reagent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_object_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shareable: Option<bool>,
}
