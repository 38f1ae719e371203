use crate::user::UserBasic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content kind of an annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    Text,
    File,
    Image,
    Video,
    Audio,
    Sketch,
    Checklist,
    Counter,
    Table,
}

impl AnnotationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationType::Text => "text",
            AnnotationType::File => "file",
            AnnotationType::Image => "image",
            AnnotationType::Video => "video",
            AnnotationType::Audio => "audio",
            AnnotationType::Sketch => "sketch",
            AnnotationType::Checklist => "checklist",
            AnnotationType::Counter => "counter",
            AnnotationType::Table => "table",
        }
    }
}

/// A note, file or media record attached to a protocol step and/or a
/// running session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: i64,
    #[serde(default)]
    pub step: Option<i64>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub annotation: String,
    pub annotation_type: AnnotationType,
    /// Remote file URL. The file body itself is never cached.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub transcribed: bool,
    #[serde(default)]
    pub transcription: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub scratched: bool,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub user: Option<UserBasic>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnnotationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_type: Option<AnnotationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
