//! Context assembly — builds the bounded prompt for one completion call.
//!
//! Prompt layout, in order:
//!
//! 1. **Persona preamble** — exactly one system entry, always first
//! 2. **Stored history** — the most recent `history_window` turns,
//!    oldest-first; older turns are dropped from context, never from storage
//! 3. **Client memory** — the caller's short-term buffer, appended verbatim.
//!    Overlap with stored history is accepted redundancy: deduplicating
//!    would require a content-equality contract the transcript does not have
//! 4. **Current turn(s)** — the new message(s) for this call, always last
//!
//! Assembly is pure with respect to its inputs aside from the single store
//! read: identical inputs and store state produce an identical prompt.

use godchat_config::AppConfig;
use godchat_core::error::StoreError;
use godchat_core::prompt::Prompt;
use godchat_core::store::TranscriptStore;
use godchat_core::turn::{IncomingTurn, Role, SessionId};
use tracing::debug;

/// The context assembler. Stateless — create one and reuse it.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    preamble: String,
    history_window: usize,
}

impl ContextAssembler {
    /// Create an assembler with an explicit preamble and history window.
    pub fn new(preamble: impl Into<String>, history_window: usize) -> Self {
        Self {
            preamble: preamble.into(),
            history_window,
        }
    }

    /// Create an assembler from application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.persona.preamble, config.context.history_window)
    }

    /// How many stored turns are pulled into the prompt.
    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Assemble the prompt for one request.
    ///
    /// A failed history read is surfaced, not degraded around — an answer
    /// produced without the context the user expects cannot be audited.
    pub async fn assemble(
        &self,
        store: &dyn TranscriptStore,
        session: &SessionId,
        client_memory: &[IncomingTurn],
        current_turns: &[IncomingTurn],
    ) -> Result<Prompt, StoreError> {
        let history = store.history(session, self.history_window).await?;

        let mut prompt = Prompt::new();
        prompt.push(Role::System, self.preamble.clone());

        for turn in &history {
            prompt.push_turn(turn);
        }

        for turn in client_memory {
            prompt.push_incoming(turn);
        }

        for turn in current_turns {
            prompt.push_incoming(turn);
        }

        debug!(
            session = %session,
            history = history.len(),
            client_memory = client_memory.len(),
            current = current_turns.len(),
            "Assembled prompt"
        );

        Ok(prompt)
    }
}
