//! Chat repository: upsert and lookup of chat identities.

use crate::error::StorageError;
use crate::models::ChatRecord;
use crate::sqlite_pool::SqlitePoolManager;
use tracing::debug;

#[derive(Clone)]
pub struct ChatRepository {
    pool_manager: SqlitePoolManager,
}

impl ChatRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Inserts the chat or updates `username` and `title` of the existing row.
    pub async fn save_chat(&self, chat: &ChatRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO chats (chat_id, username, title) VALUES (?, ?, ?)
            ON CONFLICT(chat_id) DO UPDATE SET username = excluded.username, title = excluded.title
            "#,
        )
        .bind(chat.chat_id)
        .bind(&chat.username)
        .bind(&chat.title)
        .execute(self.pool_manager.pool())
        .await?;

        debug!(chat_id = chat.chat_id, title = %chat.title, "Saved chat");
        Ok(())
    }

    pub async fn get_chat(&self, chat_id: i64) -> Result<Option<ChatRecord>, StorageError> {
        let chat = sqlx::query_as::<_, ChatRecord>(
            "SELECT chat_id, username, title FROM chats WHERE chat_id = ?",
        )
        .bind(chat_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(chat)
    }

    pub async fn list_chats(&self) -> Result<Vec<ChatRecord>, StorageError> {
        let chats = sqlx::query_as::<_, ChatRecord>(
            "SELECT chat_id, username, title FROM chats ORDER BY chat_id",
        )
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(chats)
    }
}
