//! Message repository: persistence and lineage queries for messages.
//!
//! Identity is `(chat_id, message_id, is_scheduled)`. History walks the reply chain upwards
//! from a message; family is the reply-chain closure in both directions.

use crate::error::StorageError;
use crate::models::{MessageKey, MessageRecord};
use crate::sqlite_pool::SqlitePoolManager;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};

const MESSAGE_COLUMNS: &str = "chat_id, message_id, datetime, text, is_forward, \
    file_path, file_mime_type, reply_to, sender_id, is_scheduled";

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: SqlitePoolManager,
}

impl MessageRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Inserts the record, or updates every non-identity field of the existing one.
    pub async fn save_message(&self, message: &MessageRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO messages (chat_id, message_id, datetime, text, is_forward,
                file_path, file_mime_type, reply_to, sender_id, is_scheduled)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(chat_id, message_id, is_scheduled) DO UPDATE SET
                datetime = excluded.datetime,
                text = excluded.text,
                is_forward = excluded.is_forward,
                file_path = excluded.file_path,
                file_mime_type = excluded.file_mime_type,
                reply_to = excluded.reply_to,
                sender_id = excluded.sender_id
            "#,
        )
        .bind(message.chat_id)
        .bind(message.message_id)
        .bind(message.datetime)
        .bind(&message.text)
        .bind(message.is_forward)
        .bind(&message.file_path)
        .bind(&message.file_mime_type)
        .bind(message.reply_to)
        .bind(message.sender_id)
        .bind(message.is_scheduled)
        .execute(self.pool_manager.pool())
        .await?;

        debug!(
            chat_id = message.chat_id,
            message_id = message.message_id,
            is_scheduled = message.is_scheduled,
            "Saved message"
        );
        Ok(())
    }

    /// Deletes the exact identity together with its fingerprints, in one transaction. Returns
    /// whether a row was removed; absence is not an error.
    pub async fn remove_message(&self, key: MessageKey) -> Result<bool, StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;
        sqlx::query(
            "DELETE FROM video_hashes WHERE chat_id = ? AND message_id = ? AND is_scheduled = ?",
        )
        .bind(key.chat_id)
        .bind(key.message_id)
        .bind(key.is_scheduled)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "DELETE FROM messages WHERE chat_id = ? AND message_id = ? AND is_scheduled = ?",
        )
        .bind(key.chat_id)
        .bind(key.message_id)
        .bind(key.is_scheduled)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(
            chat_id = key.chat_id,
            message_id = key.message_id,
            removed = result.rows_affected(),
            "Removed message"
        );
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_message(&self, key: MessageKey) -> Result<Option<MessageRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM messages WHERE chat_id = ? AND message_id = ? AND is_scheduled = ?",
            MESSAGE_COLUMNS
        );
        let message = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(key.chat_id)
            .bind(key.message_id)
            .bind(key.is_scheduled)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(message)
    }

    /// All records of a chat, ordered by message id.
    pub async fn list_messages_for_chat(
        &self,
        chat_id: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM messages WHERE chat_id = ? ORDER BY message_id, is_scheduled",
            MESSAGE_COLUMNS
        );
        let messages = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(chat_id)
            .fetch_all(self.pool_manager.pool())
            .await?;
        info!("Retrieved {} messages for chat {}", messages.len(), chat_id);
        Ok(messages)
    }

    async fn get_replies(&self, key: MessageKey) -> Result<Vec<MessageRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM messages WHERE chat_id = ? AND reply_to = ? AND is_scheduled = ? \
             ORDER BY message_id",
            MESSAGE_COLUMNS
        );
        let messages = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(key.chat_id)
            .bind(key.message_id)
            .bind(key.is_scheduled)
            .fetch_all(self.pool_manager.pool())
            .await?;
        Ok(messages)
    }

    /// Lineage of a message, most recent first: the stored record itself, then the message it
    /// replies to, and so on up the chain. Empty when the message is not stored.
    pub async fn get_message_history(
        &self,
        message: &MessageRecord,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let mut history = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(message.key());

        while let Some(key) = next.take() {
            if !seen.insert(key) {
                break;
            }
            let Some(record) = self.get_message(key).await? else {
                break;
            };
            next = record.reply_to.map(|reply_to| MessageKey {
                message_id: reply_to,
                ..key
            });
            history.push(record);
        }

        Ok(history)
    }

    /// The message plus everything transitively linked to it through `reply_to`, in either
    /// direction, ordered by message id.
    pub async fn get_message_family(
        &self,
        message: &MessageRecord,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let root = message.key();
        let mut family = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([root]);

        while let Some(key) = queue.pop_front() {
            if !seen.insert(key) {
                continue;
            }
            let record = match self.get_message(key).await? {
                Some(record) => record,
                None if key == root => message.clone(),
                None => continue,
            };
            if let Some(reply_to) = record.reply_to {
                queue.push_back(MessageKey {
                    message_id: reply_to,
                    ..key
                });
            }
            for reply in self.get_replies(key).await? {
                queue.push_back(reply.key());
            }
            family.push(record);
        }

        family.sort_by_key(|m| m.message_id);
        Ok(family)
    }

    /// Stores content fingerprints for a message. Existing pairs are left unchanged.
    pub async fn save_hashes(
        &self,
        message: &MessageRecord,
        hashes: &[String],
    ) -> Result<(), StorageError> {
        for hash in hashes {
            sqlx::query(
                "INSERT OR IGNORE INTO video_hashes (chat_id, message_id, is_scheduled, hash) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(message.chat_id)
            .bind(message.message_id)
            .bind(message.is_scheduled)
            .bind(hash)
            .execute(self.pool_manager.pool())
            .await?;
        }
        Ok(())
    }

    /// Messages having at least one of the given fingerprints, each listed once.
    pub async fn get_messages_matching_hashes(
        &self,
        hashes: &[String],
    ) -> Result<Vec<MessageRecord>, StorageError> {
        if hashes.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; hashes.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM messages m WHERE EXISTS (\
                SELECT 1 FROM video_hashes h WHERE h.chat_id = m.chat_id \
                AND h.message_id = m.message_id AND h.is_scheduled = m.is_scheduled \
                AND h.hash IN ({})) \
             ORDER BY m.chat_id, m.message_id",
            MESSAGE_COLUMNS
                .split(", ")
                .map(|c| format!("m.{0} AS {0}", c.trim()))
                .collect::<Vec<_>>()
                .join(", "),
            placeholders
        );
        let mut query = sqlx::query_as::<_, MessageRecord>(&sql);
        for hash in hashes {
            query = query.bind(hash);
        }
        let messages = query.fetch_all(self.pool_manager.pool()).await?;
        info!("Found {} messages matching {} hashes", messages.len(), hashes.len());
        Ok(messages)
    }
}
