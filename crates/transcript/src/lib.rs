//! Transcript store implementations for GodChat.
//!
//! Two backends implement [`godchat_core::TranscriptStore`]:
//! - [`SqliteTranscript`] — the production backend (WAL journal, durable
//!   writes, creation-order queries)
//! - [`InMemoryTranscript`] — for tests and ephemeral runs

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryTranscript;
pub use sqlite::SqliteTranscript;
