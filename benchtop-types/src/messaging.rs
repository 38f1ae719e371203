use crate::user::UserBasic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    UserMessage,
    SystemNotification,
    Alert,
    Announcement,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::UserMessage => "user_message",
            MessageType::SystemNotification => "system_notification",
            MessageType::Alert => "alert",
            MessageType::Announcement => "announcement",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagePriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl MessagePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessagePriority::Low => "low",
            MessagePriority::Normal => "normal",
            MessagePriority::High => "high",
            MessagePriority::Urgent => "urgent",
        }
    }
}

/// A conversation thread.
///
/// `unread_count` is computed per-requesting-user by the remote and is not
/// persisted — offline reconstructions serve `None` there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageThread {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub participants: Vec<UserBasic>,
    #[serde(default)]
    pub lab_group: Option<i64>,
    #[serde(default)]
    pub is_system_thread: bool,
    #[serde(default)]
    pub creator: Option<UserBasic>,
    #[serde(default)]
    pub unread_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Per-recipient delivery state for a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageRecipient {
    pub user: UserBasic,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
}

/// A file attached to a message. Only metadata is cached; the body stays
/// remote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttachment {
    pub id: i64,
    pub file_name: String,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// A message inside a thread, with its recipient read-states and
/// attachment metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub thread: i64,
    #[serde(default)]
    pub sender: Option<UserBasic>,
    #[serde(default)]
    pub content: String,
    pub message_type: MessageType,
    pub priority: MessagePriority,
    #[serde(default)]
    pub recipients: Vec<MessageRecipient>,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MessageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<MessagePriority>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ThreadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab_group: Option<i64>,
}
