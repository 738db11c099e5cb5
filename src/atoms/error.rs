// ── Rolo Atoms: Error Types ────────────────────────────────────────────────
// Single canonical error enum for the engine, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (I/O, Validation, Decode…).
//   • The `#[from]` attribute wires std/external error conversions automatically.
//   • Store and codec operations fail fast; the response correlator treats
//     per-variant decode failures as soft and only surfaces `NoMatch` /
//     `NotFound` to its caller.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Engine configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A relationship references an entity that is not in the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No entity, observation, or outreach record for the given id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A signature character is not in the separator alphabet, or a
    /// separator offset falls outside the signature text.
    #[error("Decode error: {0}")]
    Decode(String),

    /// An identifier exceeds the codec capacity for the given slot count.
    /// Never silently wrapped — an out-of-range id would decode to a
    /// different contact.
    #[error("Identifier {id} exceeds codec capacity {capacity}")]
    Overflow { id: u64, capacity: u64 },

    /// Robust decoding exhausted every chunk variant without a
    /// self-consistent match.
    #[error("No tracking code matched the signature text")]
    NoMatch,
}

// ── Convenience constructors ───────────────────────────────────────────────

impl EngineError {
    /// Create a not-found error for an entity id.
    pub fn entity_not_found(id: impl AsRef<str>) -> Self {
        Self::NotFound(format!("entity '{}'", id.as_ref()))
    }

    /// Create a not-found error for an outreach record.
    pub fn outreach_not_found(contact_id: impl AsRef<str>) -> Self {
        Self::NotFound(format!("outreach record for contact '{}'", contact_id.as_ref()))
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All engine operations should return this type.
pub type EngineResult<T> = Result<T, EngineError>;
