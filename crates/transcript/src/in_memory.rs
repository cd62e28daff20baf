//! In-memory backend — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use godchat_core::error::StoreError;
use godchat_core::store::TranscriptStore;
use godchat_core::turn::{Role, SessionId, Turn};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// An in-memory store that keeps turns in a Vec, in append order.
pub struct InMemoryTranscript {
    turns: Arc<RwLock<Vec<Turn>>>,
}

impl InMemoryTranscript {
    pub fn new() -> Self {
        Self {
            turns: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryTranscript {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscript {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(
        &self,
        session: &SessionId,
        role: Role,
        content: &str,
    ) -> Result<Turn, StoreError> {
        let mut turns = self.turns.write().await;

        // Append order is the ordering authority; the timestamp is clamped
        // so created_at never regresses even if the clock does.
        let now = Utc::now();
        let created_at = match turns.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };

        let turn = Turn {
            id: Uuid::new_v4().to_string(),
            session_id: session.clone(),
            role,
            content: content.to_string(),
            created_at,
        };
        turns.push(turn.clone());
        Ok(turn)
    }

    async fn history(&self, session: &SessionId, limit: usize) -> Result<Vec<Turn>, StoreError> {
        let turns = self.turns.read().await;
        let matching: Vec<Turn> = turns
            .iter()
            .filter(|t| &t.session_id == session)
            .cloned()
            .collect();

        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).collect())
    }

    async fn tail(&self, limit: usize) -> Result<Vec<Turn>, StoreError> {
        let turns = self.turns.read().await;
        let skip = turns.len().saturating_sub(limit);
        Ok(turns.iter().skip(skip).cloned().collect())
    }

    async fn count(&self, session: &SessionId) -> Result<usize, StoreError> {
        let turns = self.turns.read().await;
        Ok(turns.iter().filter(|t| &t.session_id == session).count())
    }
}
