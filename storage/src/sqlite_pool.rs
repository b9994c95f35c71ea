//! SQLite connection pool wrapper for the storage crate.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Manages a single SQLite pool; creates DB file if missing.
#[derive(Clone)]
pub struct SqlitePoolManager {
    pool: SqlitePool,
}

fn is_in_memory(database_url: &str) -> bool {
    database_url == ":memory:" || database_url.starts_with("sqlite::memory:")
}

impl SqlitePoolManager {
    /// Creates a pool for the given database URL (file path or in-memory).
    ///
    /// Writes use `synchronous = FULL`, so a returned write is on disk. An in-memory database
    /// is pinned to one connection that never expires, since each connection would otherwise
    /// see its own empty database.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        info!("Initializing SQLite pool: {}", database_url);

        let (options, max_connections) = if is_in_memory(database_url) {
            (SqliteConnectOptions::from_str("sqlite::memory:")?, 1)
        } else {
            let path = database_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:")
                .trim_start_matches("file:");
            (
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true),
                4,
            )
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options.synchronous(SqliteSynchronous::Full))
            .await?;

        Ok(Self { pool })
    }

    /// Returns the underlying pool for running queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the `chats`, `messages` and `video_hashes` tables if they do not exist.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        info!("Creating database tables if not exist");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chats (
                chat_id INTEGER PRIMARY KEY,
                username TEXT,
                title TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                chat_id INTEGER NOT NULL,
                message_id INTEGER NOT NULL,
                datetime TEXT NOT NULL,
                text TEXT,
                is_forward INTEGER NOT NULL,
                file_path TEXT,
                file_mime_type TEXT,
                reply_to INTEGER,
                sender_id INTEGER NOT NULL,
                is_scheduled INTEGER NOT NULL,
                PRIMARY KEY (chat_id, message_id, is_scheduled)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS video_hashes (
                chat_id INTEGER NOT NULL,
                message_id INTEGER NOT NULL,
                is_scheduled INTEGER NOT NULL,
                hash TEXT NOT NULL,
                PRIMARY KEY (chat_id, message_id, is_scheduled, hash)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_messages_reply_to ON messages(chat_id, reply_to);
            CREATE INDEX IF NOT EXISTS idx_video_hashes_hash ON video_hashes(hash);
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database tables created successfully");
        Ok(())
    }
}
