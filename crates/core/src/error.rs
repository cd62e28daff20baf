//! Error types for the GodChat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`ChatError`] is the
//! request-level taxonomy the orchestrator surfaces to callers.

use thiserror::Error;

/// Result type alias using the request-level [`ChatError`].
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors from the transcript store.
///
/// Every variant surfaces to callers as [`ChatError::Persistence`] — the
/// distinction between unreachable storage and a failed query matters for
/// diagnostics, not for the request contract.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage unreachable: {0}")]
    Unreachable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Errors from the completion endpoint.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    /// Transport-level failure — no response from the endpoint at all.
    #[error("Completion endpoint unreachable: {0}")]
    Unavailable(String),

    /// The endpoint responded with a non-success status. The upstream's own
    /// error detail is preserved for diagnostics.
    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// A success response that carried no usable reply content. Distinct
    /// from an outage: the endpoint answered, but the answer was malformed.
    #[error("Completion succeeded but returned no reply content")]
    EmptyReply,
}

/// The request-level error taxonomy.
///
/// Every failure of `handle` maps to exactly one of these kinds. None of
/// them is retried automatically anywhere in the core path — retry policy
/// belongs to the caller.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// Malformed input. Never retryable as-is; always caller-fixable.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The completion endpoint could not be reached. Retryable by the caller.
    #[error("Completion endpoint unreachable: {0}")]
    Unavailable(String),

    /// The completion endpoint rejected the request.
    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// The completion endpoint returned a success with no reply content.
    #[error("Completion succeeded but returned no reply content")]
    EmptyReply,

    /// The transcript store failed. Not retried automatically — the user
    /// turn may already be written, and the store does not deduplicate.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        ChatError::Persistence(err.to_string())
    }
}

impl From<CompletionError> for ChatError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Unavailable(msg) => ChatError::Unavailable(msg),
            CompletionError::Upstream { status, message } => {
                ChatError::Upstream { status, message }
            }
            CompletionError::EmptyReply => ChatError::EmptyReply,
        }
    }
}
