use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A free-form tag attachable to protocols.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub tag: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tag {
    /// Placeholder substituted during rehydration when the referenced tag
    /// row is absent from the cache.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            tag: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TagRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}
