use crate::reagent::Reagent;
use crate::tag::Tag;
use crate::user::UserBasic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lab protocol aggregate: the parent document plus its sections, steps,
/// tags and reagent list, all fully populated by the detail endpoint.
///
/// List endpoints may serve the parent with empty collections; the cache
/// only replaces a collection it actually observed (an empty list from the
/// remote still replaces, absence of the field does not arise because the
/// detail endpoint always includes them).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    pub id: i64,
    pub protocol_title: String,
    #[serde(default)]
    pub protocol_description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub user: Option<UserBasic>,
    #[serde(default)]
    pub sections: Vec<ProtocolSection>,
    #[serde(default)]
    pub steps: Vec<ProtocolStep>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub reagents: Vec<ProtocolReagent>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A titled region of a protocol grouping consecutive steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSection {
    pub id: i64,
    pub protocol: i64,
    #[serde(default)]
    pub section_description: String,
    #[serde(default)]
    pub section_duration: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A single protocol step. `next_step` is the ordered list of successor
/// step ids — a step can branch. The cache records these edges in a
/// cross-reference table that is fully replaced on every write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolStep {
    pub id: i64,
    pub protocol: i64,
    #[serde(default)]
    pub step_section: Option<i64>,
    #[serde(default)]
    pub step_description: String,
    #[serde(default)]
    pub step_duration: Option<i64>,
    #[serde(default)]
    pub next_step: Vec<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A reagent requirement attached to a protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolReagent {
    pub id: i64,
    pub protocol: i64,
    pub reagent: Reagent,
    pub quantity: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProtocolRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProtocolSectionRequest {
    /// Owning protocol; required on create, ignored on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_duration: Option<i64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProtocolStepRequest {
    /// Owning protocol; required on create, ignored on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_section: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<Vec<i64>>,
}
