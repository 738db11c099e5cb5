// Rolo — personal contact intelligence engine.
// Keeps a ranked, relationship-typed record of who you know, signs outbound
// mail with an identifier hidden in signature whitespace, and correlates
// replies back to contacts to track response rates over time.
//
// Layering:
//   atoms/   pure data types, constants, traits, errors — no I/O
//   engine/  store, codec, scoring, ledger, aggregation, persistence
//
// The engine is synchronous over one in-memory snapshot: load at session
// start, mutate in place, flush explicitly through `Storage`.

pub mod atoms;
pub mod engine;

pub use atoms::error::{EngineError, EngineResult};
pub use atoms::traits::{MessageProvider, ThreadMessage, ThreadRef};
pub use atoms::types::{
    CategoryMetrics, CommunicationMetrics, ContactDetails, Entity, EntityKind,
    ImportanceMetrics, Observation, ObservationKind, OutreachRecord, Relationship,
    RelationshipInfo, ResponseMetrics, ScoreUpdate, ScoringWeights, TrackingCode, WeeklyStats,
};
pub use engine::config::RoloConfig;
pub use engine::outreach::OutreachLedger;
pub use engine::storage::Storage;
pub use engine::store::ContactStore;
