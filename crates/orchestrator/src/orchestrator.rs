//! The request orchestrator — sequences assembly, completion, persistence.

use std::sync::Arc;

use godchat_core::completion::CompletionClient;
use godchat_core::error::ChatError;
use godchat_core::store::TranscriptStore;
use godchat_core::turn::{IncomingTurn, Role, SessionId, Turn};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::context::ContextAssembler;

/// One inbound request from the UI collaborator.
///
/// This is the externally visible request contract: a caller-generated
/// session id, one or more new turns, and an optional short-term memory
/// buffer the client already holds.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,

    pub turns: Vec<IncomingTurn>,

    #[serde(default)]
    pub client_memory: Vec<IncomingTurn>,
}

/// The phases a request moves through.
///
/// Per request, not per session — each `handle` call is independent.
/// Failure is reachable from `Assembling`, `Calling`, and `Persisting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Received,
    Assembling,
    Calling,
    Persisting,
    Completed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Received => "received",
            Phase::Assembling => "assembling",
            Phase::Calling => "calling",
            Phase::Persisting => "persisting",
            Phase::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// The orchestrator: assembles context, calls the completion endpoint,
/// persists the exchange.
///
/// Holds no per-request state. The store and completion client are
/// injected, explicitly constructed dependencies — never ambient
/// singletons — so the whole path is testable with substitutable fakes.
pub struct ChatOrchestrator {
    store: Arc<dyn TranscriptStore>,
    completion: Arc<dyn CompletionClient>,
    assembler: ContextAssembler,
}

impl ChatOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        store: Arc<dyn TranscriptStore>,
        completion: Arc<dyn CompletionClient>,
        assembler: ContextAssembler,
    ) -> Self {
        Self {
            store,
            completion,
            assembler,
        }
    }

    /// The transcript store this orchestrator writes to.
    pub fn store(&self) -> &Arc<dyn TranscriptStore> {
        &self.store
    }

    /// Handle one request end to end.
    ///
    /// Ordering and failure guarantees:
    /// - Any completion failure aborts **before** any write, so no user
    ///   turn is ever persisted without its reply alongside.
    /// - The user turn(s) are appended before the assistant turn. If a user
    ///   append fails, the assistant append is never attempted.
    /// - If the assistant append fails after the user turn landed, the call
    ///   still fails: the caller never receives a reply that is missing
    ///   from the transcript.
    /// - A failed history read fails the request outright rather than
    ///   degrading to a no-history prompt the user cannot audit.
    ///
    /// Concurrent calls on one session are not serialized: both may read
    /// overlapping history and interleave their appends. The store's append
    /// order decides final `created_at` ordering. Accepted, documented race.
    pub async fn handle(&self, request: ChatRequest) -> Result<Turn, ChatError> {
        Self::validate(&request)?;
        let session = SessionId::from(&request.session_id);
        debug!(phase = %Phase::Received, session = %session, turns = request.turns.len(), "Handling chat request");

        debug!(phase = %Phase::Assembling, session = %session, "Assembling prompt");
        let prompt = self
            .assembler
            .assemble(
                self.store.as_ref(),
                &session,
                &request.client_memory,
                &request.turns,
            )
            .await?;

        debug!(phase = %Phase::Calling, session = %session, messages = prompt.len(), "Calling completion endpoint");
        let reply = self.completion.complete(&prompt).await?;

        debug!(phase = %Phase::Persisting, session = %session, "Persisting exchange");
        for turn in &request.turns {
            self.store.append(&session, turn.role, &turn.content).await?;
        }

        let assistant = match self
            .store
            .append(&session, Role::Assistant, &reply.content)
            .await
        {
            Ok(turn) => turn,
            Err(e) => {
                // The model call was spent, but an unpersisted reply must
                // not reach the caller: transcript and response stay
                // consistent at the cost of one wasted completion.
                warn!(session = %session, error = %e, "Assistant turn append failed after user turn was persisted");
                return Err(e.into());
            }
        };

        info!(
            phase = %Phase::Completed,
            session = %session,
            model = %reply.model,
            "Chat request completed"
        );
        Ok(assistant)
    }

    /// Reject malformed input before touching any dependency.
    fn validate(request: &ChatRequest) -> Result<(), ChatError> {
        if request.session_id.trim().is_empty() {
            return Err(ChatError::InvalidRequest("session_id is required".into()));
        }

        if request.turns.is_empty() {
            return Err(ChatError::InvalidRequest("turns must not be empty".into()));
        }

        if request
            .turns
            .iter()
            .chain(request.client_memory.iter())
            .any(|t| t.content.trim().is_empty())
        {
            return Err(ChatError::InvalidRequest(
                "turn content must not be empty".into(),
            ));
        }

        Ok(())
    }
}
