//! Storage crate: durable chat and message records plus the lineage queries built on them.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – ChatRecord, MessageRecord, MessageKey
//! - [`chat_repo`] – ChatRepository (SQLite)
//! - [`message_repo`] – MessageRepository (SQLite): upsert, removal, history, family, hashes
//! - [`sqlite_pool`] – SqlitePoolManager and schema

mod chat_repo;
mod error;
mod message_repo;
mod models;
mod sqlite_pool;


pub use chat_repo::ChatRepository;
pub use error::StorageError;
pub use message_repo::MessageRepository;
pub use models::{ChatRecord, MessageKey, MessageRecord};
pub use sqlite_pool::SqlitePoolManager;

/// Both repositories over one pool. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pub chats: ChatRepository,
    pub messages: MessageRepository,
}

impl Store {
    /// Opens (creating if missing) the database at `database_url` and ensures the schema exists.
    pub async fn open(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        pool_manager.init_schema().await?;
        Ok(Self {
            chats: ChatRepository::new(pool_manager.clone()),
            messages: MessageRepository::new(pool_manager),
        })
    }
}
