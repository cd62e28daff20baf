//! The ephemeral prompt sent to the completion endpoint.
//!
//! A [`Prompt`] is constructed per request by the context assembler and
//! discarded after the completion call — it is never persisted. Layout:
//! [system preamble] + [stored history, oldest-first, capped] +
//! [client-supplied short-term memory] + [current turn(s)].

use serde::{Deserialize, Serialize};

use crate::turn::{IncomingTurn, Role, Turn};

/// One role/content pair inside a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

/// An ordered sequence of role/content pairs, ready for one completion call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    messages: Vec<PromptMessage>,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the end of the prompt.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(PromptMessage {
            role,
            content: content.into(),
        });
    }

    /// Append a persisted turn. The store-assigned id and timestamp are
    /// dropped — the endpoint only sees role/content pairs.
    pub fn push_turn(&mut self, turn: &Turn) {
        self.push(turn.role, turn.content.clone());
    }

    /// Append a client-supplied turn.
    pub fn push_incoming(&mut self, turn: &IncomingTurn) {
        self.push(turn.role, turn.content.clone());
    }

    pub fn messages(&self) -> &[PromptMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_order() {
        let mut prompt = Prompt::new();
        prompt.push(Role::System, "preamble");
        prompt.push(Role::User, "first");
        prompt.push(Role::Assistant, "second");

        let roles: Vec<Role> = prompt.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert_eq!(prompt.len(), 3);
    }

    #[test]
    fn push_incoming_copies_role_and_content() {
        let mut prompt = Prompt::new();
        prompt.push_incoming(&IncomingTurn::user("hello"));
        assert_eq!(prompt.messages()[0].role, Role::User);
        assert_eq!(prompt.messages()[0].content, "hello");
    }

    #[test]
    fn empty_prompt() {
        let prompt = Prompt::new();
        assert!(prompt.is_empty());
        assert_eq!(prompt.len(), 0);
    }
}
