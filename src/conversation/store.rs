use super::types::{Conversation, Message, Mode};
use crate::error::StoreError;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Mutex;

type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Async conversation persistence contract: one row per (user, mode),
/// overwritten in place on every save (last writer wins).
pub trait ConversationStore: Send + Sync {
    fn load<'a>(&'a self, user_id: &'a str, mode: Mode) -> StoreFuture<'a, Option<Conversation>>;

    fn save<'a>(
        &'a self,
        user_id: &'a str,
        mode: Mode,
        messages: &'a [Message],
    ) -> StoreFuture<'a, Conversation>;
}

// ── SQLite ──────────────────────────────────────────────────────────────────

const CONVERSATION_SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS conversation_schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const CONVERSATION_SCHEMA_VERSION_KEY: &str = "conversation_schema_version";
const CONVERSATION_SCHEMA_VERSION: u32 = 1;

async fn ensure_schema_version(pool: &SqlitePool) -> anyhow::Result<()> {
    use anyhow::Context;

    sqlx::query(CONVERSATION_SCHEMA_META_TABLE)
        .execute(pool)
        .await
        .context("create conversation_schema_meta table")?;

    let stored_version: Option<(String,)> =
        sqlx::query_as("SELECT value FROM conversation_schema_meta WHERE key = $1")
            .bind(CONVERSATION_SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await
            .context("load conversation schema version")?;

    if let Some((value,)) = stored_version {
        let parsed = value
            .parse::<u32>()
            .with_context(|| format!("invalid conversation schema version value: {value}"))?;
        anyhow::ensure!(
            parsed == CONVERSATION_SCHEMA_VERSION,
            "incompatible conversation schema version: stored={parsed}, expected={CONVERSATION_SCHEMA_VERSION}"
        );
        return Ok(());
    }

    sqlx::query("INSERT INTO conversation_schema_meta (key, value) VALUES ($1, $2)")
        .bind(CONVERSATION_SCHEMA_VERSION_KEY)
        .bind(CONVERSATION_SCHEMA_VERSION.to_string())
        .execute(pool)
        .await
        .context("persist conversation schema version")?;

    Ok(())
}

/// SQLite-backed conversation table using the sqlx async pool.
pub struct SqliteConversationStore {
    pool: SqlitePool,
}

impl SqliteConversationStore {
    /// Create a store over an existing pool and run migrations.
    pub async fn new(pool: SqlitePool) -> anyhow::Result<Self> {
        ensure_schema_version(&pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS conversations (
                 user_id    TEXT NOT NULL,
                 mode       TEXT NOT NULL,
                 messages   TEXT NOT NULL,
                 updated_at TEXT NOT NULL,
                 PRIMARY KEY (user_id, mode)
             )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Open (creating if missing) the database file at `path`.
    pub async fn open(path: &std::path::Path) -> anyhow::Result<Self> {
        use sqlx::sqlite::SqliteConnectOptions;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Self::new(pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn map_conversation_row(row: &SqliteRow) -> Result<Conversation, StoreError> {
    let mode_raw: String = row.try_get("mode")?;
    let messages_raw: String = row.try_get("messages")?;

    let mode = Mode::from_str(&mode_raw)
        .map_err(|_| StoreError::Corrupt(format!("unknown mode: {mode_raw}")))?;
    let messages = serde_json::from_str::<Vec<Message>>(&messages_raw)
        .map_err(|e| StoreError::Corrupt(format!("messages column: {e}")))?;

    Ok(Conversation {
        user_id: row.try_get("user_id")?,
        mode,
        messages,
        updated_at: row.try_get("updated_at")?,
    })
}

impl ConversationStore for SqliteConversationStore {
    fn load<'a>(&'a self, user_id: &'a str, mode: Mode) -> StoreFuture<'a, Option<Conversation>> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT user_id, mode, messages, updated_at
                 FROM conversations
                 WHERE user_id = $1 AND mode = $2",
            )
            .bind(user_id)
            .bind(mode.as_ref())
            .fetch_optional(&self.pool)
            .await?;

            row.map(|r| map_conversation_row(&r)).transpose()
        })
    }

    fn save<'a>(
        &'a self,
        user_id: &'a str,
        mode: Mode,
        messages: &'a [Message],
    ) -> StoreFuture<'a, Conversation> {
        Box::pin(async move {
            let encoded = serde_json::to_string(messages)
                .map_err(|e| StoreError::Query(format!("encode messages: {e}")))?;
            let timestamp = Utc::now().to_rfc3339();

            sqlx::query(
                "INSERT INTO conversations (user_id, mode, messages, updated_at)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT(user_id, mode)
                 DO UPDATE SET messages = excluded.messages, updated_at = excluded.updated_at",
            )
            .bind(user_id)
            .bind(mode.as_ref())
            .bind(&encoded)
            .bind(&timestamp)
            .execute(&self.pool)
            .await?;

            Ok(Conversation {
                user_id: user_id.to_string(),
                mode,
                messages: messages.to_vec(),
                updated_at: timestamp,
            })
        })
    }
}

// ── In-memory ───────────────────────────────────────────────────────────────

/// Process-local store, used when no backend table is reachable.
#[derive(Default)]
pub struct MemoryConversationStore {
    rows: Mutex<HashMap<(String, Mode), Conversation>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryConversationStore {
    fn load<'a>(&'a self, user_id: &'a str, mode: Mode) -> StoreFuture<'a, Option<Conversation>> {
        Box::pin(async move {
            let rows = self
                .rows
                .lock()
                .map_err(|e| StoreError::Query(format!("lock poisoned: {e}")))?;
            Ok(rows.get(&(user_id.to_string(), mode)).cloned())
        })
    }

    fn save<'a>(
        &'a self,
        user_id: &'a str,
        mode: Mode,
        messages: &'a [Message],
    ) -> StoreFuture<'a, Conversation> {
        Box::pin(async move {
            let conversation = Conversation {
                user_id: user_id.to_string(),
                mode,
                messages: messages.to_vec(),
                updated_at: Utc::now().to_rfc3339(),
            };
            let mut rows = self
                .rows
                .lock()
                .map_err(|e| StoreError::Query(format!("lock poisoned: {e}")))?;
            rows.insert((user_id.to_string(), mode), conversation.clone());
            Ok(conversation)
        })
    }
}
