//! Chat record model: maps to the `chats` table.

use serde::{Deserialize, Serialize};

/// Identity of a chat. `chat_id` is the only stable key; `username` and `title` are upserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatRecord {
    pub chat_id: i64,
    pub username: Option<String>,
    pub title: String,
}

impl ChatRecord {
    pub fn new(chat_id: i64, username: Option<String>, title: impl Into<String>) -> Self {
        Self {
            chat_id,
            username,
            title: title.into(),
        }
    }
}
