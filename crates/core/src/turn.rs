//! Turn and session domain types.
//!
//! These are the core value objects that flow through the system:
//! the client submits a turn → the orchestrator assembles context around it →
//! the completion endpoint replies → both turns land in the transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier grouping turns into one conversation.
///
/// Caller-generated and unauthenticated by design. A session has no
/// lifecycle record of its own — it exists only as the set of persisted
/// turns that share this identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The persona preamble
    System,
    /// The end user
    User,
    /// The model's reply
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role: '{other}'")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted turn — one row in the transcript.
///
/// `id` and `created_at` are assigned by the store at write time, never by
/// the client. `role` and `content` are immutable once created; the
/// transcript is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Store-assigned unique identifier, used for display keys only
    pub id: String,

    /// The session this turn belongs to
    pub session_id: SessionId,

    /// Who authored this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Store-assigned creation timestamp, the ordering key within a session
    pub created_at: DateTime<Utc>,
}

/// A client-supplied turn that has not been persisted yet.
///
/// Used both for the new turn(s) of a request and for the short-term
/// client memory buffer that accompanies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingTurn {
    pub role: Role,
    pub content: String,
}

impl IncomingTurn {
    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant turn (for client memory buffers).
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
