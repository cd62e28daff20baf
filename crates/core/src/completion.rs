//! CompletionClient trait — the abstraction over the model endpoint.
//!
//! A CompletionClient sends an assembled prompt to an external completion
//! endpoint and returns exactly one reply or one classified error. No
//! caching, no streaming, no internal retry — the boundary is too expensive
//! to blind-retry, so retry policy stays with the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;
use crate::prompt::Prompt;

/// A complete reply from the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReply {
    /// The reply text, trimmed. Guaranteed non-empty by the client —
    /// a blank reply is classified as [`CompletionError::EmptyReply`].
    pub content: String,

    /// Which model actually responded (may differ from requested).
    pub model: String,

    /// Token usage statistics, when the endpoint reports them.
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core CompletionClient trait.
///
/// Model, temperature, and credentials are fixed at construction time —
/// injected configuration, not ambient state.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// A human-readable name for this client (e.g., "openai").
    fn name(&self) -> &str;

    /// Send the prompt and get a complete reply.
    async fn complete(
        &self,
        prompt: &Prompt,
    ) -> std::result::Result<CompletionReply, CompletionError>;
}
