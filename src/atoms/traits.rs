// ── Rolo Atoms: Boundary Traits ────────────────────────────────────────────
// Interfaces to external collaborators. The engine never talks to a mail
// server directly — analysis code consumes an opaque provider that returns
// message metadata, and the core only ever sees the summarized
// communication metrics derived from it.

use crate::atoms::error::EngineResult;
use chrono::{DateTime, Utc};

/// A reference to a message thread held by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    pub thread_id: String,
}

/// One message within a thread, reduced to the metadata analysis needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadMessage {
    /// Sender address as reported by the transport.
    pub sender: String,
    pub timestamp: DateTime<Utc>,
}

/// Opaque mail-transport access layer.
///
/// Implementations live outside this crate (IMAP bridge, API client, test
/// fixture). `search` returns matching thread references; `get_thread`
/// returns a thread's messages in chronological order.
pub trait MessageProvider {
    fn search(&self, query: &str) -> EngineResult<Vec<ThreadRef>>;
    fn get_thread(&self, thread_id: &str) -> EngineResult<Vec<ThreadMessage>>;
}
