//! Shared test doubles for orchestrator tests.

use async_trait::async_trait;
use godchat_core::completion::{CompletionClient, CompletionReply, Usage};
use godchat_core::error::{CompletionError, StoreError};
use godchat_core::prompt::Prompt;
use godchat_core::store::TranscriptStore;
use godchat_core::turn::{Role, SessionId, Turn};
use godchat_transcript::InMemoryTranscript;
use std::sync::Mutex;

/// A completion client that returns one scripted outcome on every call
/// and records the prompts it was given.
pub struct ScriptedClient {
    outcome: Result<CompletionReply, CompletionError>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedClient {
    /// A client that always replies with the given text.
    pub fn replying(text: &str) -> Self {
        Self {
            outcome: Ok(CompletionReply {
                content: text.to_string(),
                model: "mock-model".into(),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
            }),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A client that always fails with the given error.
    pub fn failing(error: CompletionError) -> Self {
        Self {
            outcome: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<CompletionReply, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.outcome.clone()
    }
}

/// A store wrapper that fails on command: either every read, or every
/// append past a threshold. Successful calls pass through to an
/// in-memory store so persisted state can be asserted on.
pub struct FailingStore {
    inner: InMemoryTranscript,
    fail_reads: bool,
    appends_allowed: Option<usize>,
    appends_made: Mutex<usize>,
}

impl FailingStore {
    /// Every `history`/`tail` call fails; appends pass through.
    pub fn failing_reads() -> Self {
        Self {
            inner: InMemoryTranscript::new(),
            fail_reads: true,
            appends_allowed: None,
            appends_made: Mutex::new(0),
        }
    }

    /// The first `allowed` appends succeed, every later one fails.
    pub fn failing_append_after(allowed: usize) -> Self {
        Self {
            inner: InMemoryTranscript::new(),
            fail_reads: false,
            appends_allowed: Some(allowed),
            appends_made: Mutex::new(0),
        }
    }
}

#[async_trait]
impl TranscriptStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn append(
        &self,
        session: &SessionId,
        role: Role,
        content: &str,
    ) -> Result<Turn, StoreError> {
        if let Some(allowed) = self.appends_allowed {
            let mut made = self.appends_made.lock().unwrap();
            if *made >= allowed {
                return Err(StoreError::Unreachable("append failed (scripted)".into()));
            }
            *made += 1;
        }
        self.inner.append(session, role, content).await
    }

    async fn history(&self, session: &SessionId, limit: usize) -> Result<Vec<Turn>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unreachable("read failed (scripted)".into()));
        }
        self.inner.history(session, limit).await
    }

    async fn tail(&self, limit: usize) -> Result<Vec<Turn>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unreachable("read failed (scripted)".into()));
        }
        self.inner.tail(limit).await
    }

    async fn count(&self, session: &SessionId) -> Result<usize, StoreError> {
        self.inner.count(session).await
    }
}
