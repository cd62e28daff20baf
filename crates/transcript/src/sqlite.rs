//! SQLite transcript backend.
//!
//! Uses a single SQLite database file with one `turns` table. Rows are
//! append-only: no UPDATE or DELETE statement exists in this module. The
//! integer rowid (`iid`) breaks ordering ties between turns written within
//! the same timestamp granularity.

use async_trait::async_trait;
use chrono::Utc;
use godchat_core::error::StoreError;
use godchat_core::store::TranscriptStore;
use godchat_core::turn::{Role, SessionId, Turn};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// The production SQLite transcript store.
pub struct SqliteTranscript {
    pool: SqlitePool,
}

impl SqliteTranscript {
    /// Create a new SQLite transcript store from a file path.
    ///
    /// The database and schema are created automatically. Pass
    /// `":memory:"` for an in-process ephemeral database (useful for tests).
    /// WAL journaling with `synchronous = NORMAL` keeps every committed
    /// append durable before the call returns — no write-behind buffering.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Unreachable(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unreachable(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite transcript store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run schema migrations — creates the turns table and its index.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                iid        INTEGER PRIMARY KEY AUTOINCREMENT,
                id         TEXT UNIQUE NOT NULL,
                session_id TEXT NOT NULL,
                role       TEXT NOT NULL,
                content    TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("turns table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_turns_session_created
             ON turns(session_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("session index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Parse a `Turn` from a SQLite row.
    ///
    /// An unparseable role or timestamp is a query failure, not a silent
    /// fallback — a turn that cannot be ordered cannot be trusted in context.
    fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<Turn, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let session_id: String = row
            .try_get("session_id")
            .map_err(|e| StoreError::QueryFailed(format!("session_id column: {e}")))?;
        let role_str: String = row
            .try_get("role")
            .map_err(|e| StoreError::QueryFailed(format!("role column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| StoreError::QueryFailed(format!("content column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

        let role = Role::from_str(&role_str)
            .map_err(|e| StoreError::QueryFailed(format!("role column: {e}")))?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

        Ok(Turn {
            id,
            session_id: SessionId(session_id),
            role,
            content,
            created_at,
        })
    }
}

#[async_trait]
impl TranscriptStore for SqliteTranscript {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(
        &self,
        session: &SessionId,
        role: Role,
        content: &str,
    ) -> Result<Turn, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        sqlx::query(
            "INSERT INTO turns (id, session_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(&session.0)
        .bind(role.as_str())
        .bind(content)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unreachable(format!("INSERT failed: {e}")))?;

        debug!(session = %session, role = %role, "Appended turn {id}");

        Ok(Turn {
            id,
            session_id: session.clone(),
            role,
            content: content.to_string(),
            created_at,
        })
    }

    async fn history(&self, session: &SessionId, limit: usize) -> Result<Vec<Turn>, StoreError> {
        // Most recent `limit` turns, re-ordered oldest-first. The inner
        // query selects from the tail; the outer restores creation order.
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, role, content, created_at FROM (
                SELECT * FROM turns
                WHERE session_id = ?1
                ORDER BY created_at DESC, iid DESC
                LIMIT ?2
            ) ORDER BY created_at ASC, iid ASC
            "#,
        )
        .bind(&session.0)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("history query: {e}")))?;

        rows.iter().map(Self::row_to_turn).collect()
    }

    async fn tail(&self, limit: usize) -> Result<Vec<Turn>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, role, content, created_at FROM (
                SELECT * FROM turns
                ORDER BY created_at DESC, iid DESC
                LIMIT ?1
            ) ORDER BY created_at ASC, iid ASC
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("tail query: {e}")))?;

        rows.iter().map(Self::row_to_turn).collect()
    }

    async fn count(&self, session: &SessionId) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM turns WHERE session_id = ?1")
            .bind(&session.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }
}
