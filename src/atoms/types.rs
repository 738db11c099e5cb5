// ── Rolo Atoms: Core Types ─────────────────────────────────────────────────
// Type definitions for the contact graph, outreach ledger, and response
// metrics. These are pure data types (no DB access, no I/O); the only logic
// here is observation merging and typed field access.
//
// Follows the project pattern: structs in atoms/, engine logic in engine/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: Entities & Relationships
// ═══════════════════════════════════════════════════════════════════════════

/// Node kind in the contact graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Contact,
    Organization,
    Category,
}

/// A node in the contact graph. Observations are typed payloads attached to
/// the entity — at most one per kind; writing an existing kind merges fields
/// rather than duplicating (see `Observation::merge`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    #[serde(default)]
    pub observations: Vec<Observation>,
}

impl Entity {
    /// Create an entity with a fresh v4 id and no observations.
    pub fn new(name: &str, kind: EntityKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            kind,
            observations: Vec::new(),
        }
    }

    /// Contact details, if observed.
    pub fn contact_details(&self) -> Option<&ContactDetails> {
        self.observations.iter().find_map(|o| match o {
            Observation::ContactDetails(d) => Some(d),
            _ => None,
        })
    }

    /// Communication metrics, if observed.
    pub fn communication_metrics(&self) -> Option<&CommunicationMetrics> {
        self.observations.iter().find_map(|o| match o {
            Observation::CommunicationMetrics(m) => Some(m),
            _ => None,
        })
    }

    /// Importance metrics, if observed.
    pub fn importance_metrics(&self) -> Option<&ImportanceMetrics> {
        self.observations.iter().find_map(|o| match o {
            Observation::ImportanceMetrics(m) => Some(m),
            _ => None,
        })
    }

    /// Relationship info, if observed.
    pub fn relationship_info(&self) -> Option<&RelationshipInfo> {
        self.observations.iter().find_map(|o| match o {
            Observation::RelationshipInfo(r) => Some(r),
            _ => None,
        })
    }

    /// Primary email address, if any is on record.
    pub fn primary_email(&self) -> Option<&str> {
        self.contact_details()
            .and_then(|d| d.emails.first())
            .map(String::as_str)
    }
}

/// A typed directed edge between two entities.
/// Both endpoints must exist in the store at creation time. Identical
/// `(from, type, to)` triples may coexist — inserts are not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub to: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: Observations (tagged union, one per kind per entity)
// ═══════════════════════════════════════════════════════════════════════════

/// Discriminant for `Observation` — used for same-kind lookup on merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    ContactDetails,
    CommunicationMetrics,
    ImportanceMetrics,
    RelationshipInfo,
}

/// A typed, mergeable payload attached to an entity.
///
/// Modeled as a tagged union rather than a schema-less record so that merge
/// handling is exhaustive at compile time. Scalar fields are `Option`:
/// `Some` overwrites on merge, `None` preserves the existing value
/// (shallow, field-by-field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    ContactDetails(ContactDetails),
    CommunicationMetrics(CommunicationMetrics),
    ImportanceMetrics(ImportanceMetrics),
    RelationshipInfo(RelationshipInfo),
}

impl Observation {
    pub fn kind(&self) -> ObservationKind {
        match self {
            Observation::ContactDetails(_) => ObservationKind::ContactDetails,
            Observation::CommunicationMetrics(_) => ObservationKind::CommunicationMetrics,
            Observation::ImportanceMetrics(_) => ObservationKind::ImportanceMetrics,
            Observation::RelationshipInfo(_) => ObservationKind::RelationshipInfo,
        }
    }

    /// Merge an incoming observation of the same kind into this one.
    /// A kind mismatch replaces the slot wholesale; the store only routes
    /// same-kind observations here, so the fallback arm is a safety net.
    pub fn merge(&mut self, incoming: Observation) {
        match (self, incoming) {
            (Observation::ContactDetails(cur), Observation::ContactDetails(new)) => cur.merge(new),
            (Observation::CommunicationMetrics(cur), Observation::CommunicationMetrics(new)) => {
                cur.merge(new)
            }
            (Observation::ImportanceMetrics(cur), Observation::ImportanceMetrics(new)) => {
                cur.merge(new)
            }
            (Observation::RelationshipInfo(cur), Observation::RelationshipInfo(new)) => {
                cur.merge(new)
            }
            (slot, new) => *slot = new,
        }
    }
}

/// Email addresses, phone numbers, and the employing organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    /// Entity id of the employing organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl ContactDetails {
    fn merge(&mut self, new: ContactDetails) {
        // Empty collections mean "not provided"; a present list overwrites.
        if !new.emails.is_empty() {
            self.emails = new.emails;
        }
        if !new.phones.is_empty() {
            self.phones = new.phones;
        }
        if new.organization.is_some() {
            self.organization = new.organization;
        }
    }
}

/// Summarized communication history for a contact. Produced by analysis
/// over the message provider; consumed by the scoring engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunicationMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contacted_at: Option<DateTime<Utc>>,
    /// Fraction of outbound messages answered, nominally in [0, 1].
    /// Values outside that range are used as-is by the scoring engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_count: Option<u32>,
}

impl CommunicationMetrics {
    fn merge(&mut self, new: CommunicationMetrics) {
        if new.email_count.is_some() {
            self.email_count = new.email_count;
        }
        if new.last_contacted_at.is_some() {
            self.last_contacted_at = new.last_contacted_at;
        }
        if new.response_rate.is_some() {
            self.response_rate = new.response_rate;
        }
        if new.meeting_count.is_some() {
            self.meeting_count = new.meeting_count;
        }
    }
}

/// Manual priority plus the materialized importance score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportanceMetrics {
    /// User-assigned priority, 0–10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_priority: Option<u8>,
    /// Computed importance, nominally 0–100. May exceed 100 when caller
    /// weights do not sum to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_score: Option<i64>,
}

impl ImportanceMetrics {
    fn merge(&mut self, new: ImportanceMetrics) {
        if new.manual_priority.is_some() {
            self.manual_priority = new.manual_priority;
        }
        if new.calculated_score.is_some() {
            self.calculated_score = new.calculated_score;
        }
    }
}

/// How the contact entered the graph and free-form context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipInfo {
    /// Entity id of the person who made the introduction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RelationshipInfo {
    fn merge(&mut self, new: RelationshipInfo) {
        if new.introduced_by.is_some() {
            self.introduced_by = new.introduced_by;
        }
        if new.notes.is_some() {
            self.notes = new.notes;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 3: Scoring
// ═══════════════════════════════════════════════════════════════════════════

/// Per-factor weights for the importance score. Non-negative coefficients;
/// the defaults sum to 1.0. Custom weights are taken as given; when they
/// do not sum to 1.0 the final score scales accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub frequency: f64,
    pub recency: f64,
    pub response_rate: f64,
    pub meeting_frequency: f64,
    pub manual_priority: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            frequency: crate::atoms::constants::DEFAULT_WEIGHT_FREQUENCY,
            recency: crate::atoms::constants::DEFAULT_WEIGHT_RECENCY,
            response_rate: crate::atoms::constants::DEFAULT_WEIGHT_RESPONSE_RATE,
            meeting_frequency: crate::atoms::constants::DEFAULT_WEIGHT_MEETING_FREQUENCY,
            manual_priority: crate::atoms::constants::DEFAULT_WEIGHT_MANUAL_PRIORITY,
        }
    }
}

/// One pending score write-back, produced by the pure compute phase of a
/// batch analysis and applied serially to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreUpdate {
    pub entity_id: String,
    pub score: i64,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 4: Outreach Ledger
// ═══════════════════════════════════════════════════════════════════════════

/// Binds a contact id to the literal-chunk template and the small integer
/// encoded into that contact's stealth signatures.
///
/// Invariants: `literal_chunks.len() - 1` is the separator slot count;
/// `numeric_id` is representable in base 6 across those slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingCode {
    pub contact_id: String,
    pub literal_chunks: Vec<String>,
    pub numeric_id: u64,
}

/// Send/response state for one contact. Created on first send, mutated on
/// every subsequent send and on a matched response. The `responded` flag is
/// one-way: once set it never reverts, even as sends keep counting up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutreachRecord {
    pub contact_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub last_outreach_at: DateTime<Utc>,
    pub outreach_count: u32,
    #[serde(default)]
    pub responded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_days: Option<f64>,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 5: Response Metrics
// ═══════════════════════════════════════════════════════════════════════════

/// Per-category sent/response counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub sent: u32,
    pub responses: u32,
    pub response_rate: f64,
}

/// Counters for one ISO-8601 week (Thursday-anchored — week 1 of a year is
/// the week containing that year's first Thursday).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub iso_year: i32,
    pub iso_week: u32,
    pub sent: u32,
    pub responses: u32,
    pub response_rate: f64,
}

/// Rolling outreach totals plus category and weekly breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetrics {
    pub total_sent: u32,
    pub total_responses: u32,
    pub response_rate: f64,
    #[serde(default)]
    pub response_times_by_contact: HashMap<String, f64>,
    #[serde(default)]
    pub category_metrics: HashMap<String, CategoryMetrics>,
    #[serde(default)]
    pub weekly_stats: Vec<WeeklyStats>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
