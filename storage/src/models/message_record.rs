//! Message record model for persistence.
//!
//! Maps to the `messages` table and is used by MessageRepository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Composite identity of a message. Scheduled posts live in their own id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageKey {
    pub chat_id: i64,
    pub message_id: i64,
    pub is_scheduled: bool,
}

/// One message instance. `file_path`/`file_mime_type` are set iff a media attachment is stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRecord {
    pub chat_id: i64,
    pub message_id: i64,
    pub datetime: DateTime<Utc>,
    pub text: Option<String>,
    pub is_forward: bool,
    pub file_path: Option<String>,
    pub file_mime_type: Option<String>,
    /// Message id (same chat) this message replies to.
    pub reply_to: Option<i64>,
    pub sender_id: i64,
    pub is_scheduled: bool,
}

impl MessageRecord {
    /// Creates a posted, non-forwarded text-less record timestamped now.
    pub fn new(chat_id: i64, message_id: i64, sender_id: i64) -> Self {
        Self {
            chat_id,
            message_id,
            datetime: Utc::now(),
            text: None,
            is_forward: false,
            file_path: None,
            file_mime_type: None,
            reply_to: None,
            sender_id,
            is_scheduled: false,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: i64) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    pub fn with_file(mut self, file_path: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self.file_mime_type = Some(mime_type.into());
        self
    }

    pub fn key(&self) -> MessageKey {
        MessageKey {
            chat_id: self.chat_id,
            message_id: self.message_id,
            is_scheduled: self.is_scheduled,
        }
    }

    /// True when the message carries a locally stored attachment.
    pub fn has_video(&self) -> bool {
        self.file_path.is_some()
    }

    /// Text trimmed and lower-cased; empty when there is no text.
    pub fn clean_text(&self) -> String {
        self.text
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .unwrap_or_default()
    }
}
