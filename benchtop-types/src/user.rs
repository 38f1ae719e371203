use serde::{Deserialize, Serialize};

/// Minimal user representation embedded in other aggregates.
///
/// Some endpoints serve only `id` and `username`; name fields default to
/// empty strings in that case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBasic {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl UserBasic {
    /// Placeholder substituted during rehydration when the referenced user
    /// row is absent from the cache. Keeps the known id, empty names.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}
