//! Transport abstraction for sending, editing, forwarding and deleting messages.
//!
//! [`Bot`] is transport-agnostic; pipeline-telegram implements it via teloxide and tests
//! substitute a recording mock. Every returned [`MessageRecord`] describes the message as the
//! platform created it; attaching local media paths is the caller's job.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use storage::MessageRecord;

/// Inline button: a label and the callback payload delivered when it is pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Button layout, one inner vec per row.
pub type ButtonRows = Vec<Vec<Button>>;

#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message, optionally as a reply and with inline buttons.
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
        buttons: Option<&ButtonRows>,
    ) -> Result<MessageRecord>;

    /// Uploads a local video file.
    async fn send_video(
        &self,
        chat_id: i64,
        file_path: &str,
        caption: Option<&str>,
        reply_to: Option<i64>,
    ) -> Result<MessageRecord>;

    /// Replaces text and buttons of a sent message. `None` buttons strips the keyboard.
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        buttons: Option<&ButtonRows>,
    ) -> Result<MessageRecord>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()>;

    async fn forward_message(
        &self,
        from_chat_id: i64,
        message_id: i64,
        to_chat_id: i64,
    ) -> Result<MessageRecord>;

    /// Operator ids allowed to post in the chat.
    async fn list_authorized_posters(&self, chat_id: i64) -> Result<HashSet<i64>>;

    /// Operator ids allowed to delete messages in the chat.
    async fn list_authorized_deleters(&self, chat_id: i64) -> Result<HashSet<i64>>;
}
