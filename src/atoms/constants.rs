// ── Rolo Atoms: Constants ──────────────────────────────────────────────────
// All named constants for the crate live here.
// Rationale: collecting constants in one place eliminates magic strings,
// makes auditing easier, and keeps every layer's code self-documenting.

// ── Stealth signature separator alphabet ───────────────────────────────────
// Six Unicode space code points that render near-identically but compare
// as distinct characters. Each separator slot between two literal chunks
// carries one base-6 digit. Changing the order or membership of this set
// invalidates every tracking code already in the field — treat as a stable
// identifier set.
pub const SIGNATURE_ALPHABET: [char; 6] = [
    '\u{0020}', // SPACE
    '\u{00A0}', // NO-BREAK SPACE
    '\u{2004}', // THREE-PER-EM SPACE
    '\u{2005}', // FOUR-PER-EM SPACE
    '\u{2009}', // THIN SPACE
    '\u{200A}', // HAIR SPACE
];

// ── Importance scoring normalization ───────────────────────────────────────
// Used by `compute_score()` in engine/scoring.rs.
/// Email count at which the frequency factor saturates at 1.0.
pub const FREQUENCY_SATURATION: f64 = 100.0;
/// Meeting count at which the meeting-frequency factor saturates at 1.0.
pub const MEETING_SATURATION: f64 = 20.0;
/// Days after which the recency factor reaches 0.
pub const RECENCY_WINDOW_DAYS: f64 = 365.0;
/// Manual priority scale ceiling (0–10).
pub const MANUAL_PRIORITY_MAX: f64 = 10.0;

/// Seconds per day, for response-time conversion.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// ── Default scoring weights (sum to 1.0) ───────────────────────────────────
pub const DEFAULT_WEIGHT_FREQUENCY: f64 = 0.25;
pub const DEFAULT_WEIGHT_RECENCY: f64 = 0.30;
pub const DEFAULT_WEIGHT_RESPONSE_RATE: f64 = 0.20;
pub const DEFAULT_WEIGHT_MEETING_FREQUENCY: f64 = 0.15;
pub const DEFAULT_WEIGHT_MANUAL_PRIORITY: f64 = 0.10;

// ── Persisted record file names ────────────────────────────────────────────
// One JSON document per record family under the configured data directory.
pub const ENTITIES_FILE: &str = "entities.json";
pub const RELATIONSHIPS_FILE: &str = "relationships.json";
pub const TRACKING_CODES_FILE: &str = "tracking_codes.json";
pub const OUTREACH_STATUS_FILE: &str = "outreach_status.json";
pub const RESPONSE_METRICS_FILE: &str = "response_metrics.json";

// ── Default signature template ─────────────────────────────────────────────
// Literal chunks interleaved with separator digits. Three chunks = two
// separator slots = 36 addressable contacts; override in rolo.toml for
// larger address spaces.
pub const DEFAULT_SIGNATURE_CHUNKS: [&str; 3] = ["Warm regards,", "Alex", "Rolo"];
