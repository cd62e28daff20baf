//! TranscriptStore trait — append-only persistence of conversation turns.
//!
//! The transcript is the system's only durable state. Turns are written
//! once, never mutated, never deleted, and queried in creation order. A
//! "session" is a query filter over turns sharing a `session_id`, not a
//! stored entity with its own lifecycle.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::turn::{Role, SessionId, Turn};

/// The core TranscriptStore trait.
///
/// Implementations: SQLite, in-memory (for testing and ephemeral runs).
///
/// Contract:
/// - `append` is durable before it returns — a turn visible to the next
///   `history` call is guaranteed once `append` succeeds. It never retries
///   internally; the caller decides.
/// - `history` returns the most recent `limit` turns of a session in
///   non-decreasing `created_at` order, and an empty Vec (not an error)
///   for a session with no turns yet.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Persist one turn. The store assigns `id` and `created_at`.
    async fn append(
        &self,
        session: &SessionId,
        role: Role,
        content: &str,
    ) -> std::result::Result<Turn, StoreError>;

    /// The most recent `limit` turns of a session, oldest-first.
    async fn history(
        &self,
        session: &SessionId,
        limit: usize,
    ) -> std::result::Result<Vec<Turn>, StoreError>;

    /// The most recent `limit` turns across all sessions, oldest-first.
    /// Backs the admin history view.
    async fn tail(&self, limit: usize) -> std::result::Result<Vec<Turn>, StoreError>;

    /// Number of turns persisted for a session.
    async fn count(&self, session: &SessionId) -> std::result::Result<usize, StoreError>;
}
