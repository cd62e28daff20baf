//! The conversation orchestration path — the heart of GodChat.
//!
//! Each request moves through a fixed sequence:
//!
//! 1. **Receive** the client's new turn(s), session id, and optional
//!    short-term memory
//! 2. **Assemble** the prompt (persona preamble + stored history + client
//!    memory + current turns)
//! 3. **Call** the completion endpoint — exactly one request
//! 4. **Persist** the user turn(s) and the assistant reply, in that order
//! 5. **Return** the persisted assistant turn
//!
//! Every failure aborts the sequence at its phase and surfaces a single
//! classified [`godchat_core::ChatError`]. Nothing in this path retries.

pub mod context;
pub mod orchestrator;

pub use context::ContextAssembler;
pub use orchestrator::{ChatOrchestrator, ChatRequest, Phase};

#[cfg(test)]
pub(crate) mod test_helpers;
