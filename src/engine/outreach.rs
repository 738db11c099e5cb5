// engine/outreach.rs — Outreach Ledger & Response Correlator.
// Records every send, stamps each contact with a stealth-signed tracking
// code, and correlates inbound replies back to a contact by decoding the
// identifier hidden in the reply's quoted signature.
//
// Counter families kept in lockstep on every send/response:
//   - global totals and rolling response rate
//   - per-category sent/response buckets
//   - per-ISO-week buckets (Thursday rule — chrono's iso_week)
//
// OutreachRecord state machine: Sent → Responded, one-way. Later sends keep
// incrementing the count but never reset the responded flag.

use crate::atoms::constants::{
    OUTREACH_STATUS_FILE, RESPONSE_METRICS_FILE, TRACKING_CODES_FILE,
};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{
    CategoryMetrics, OutreachRecord, ResponseMetrics, TrackingCode, WeeklyStats,
};
use crate::engine::codec::{self, RobustOutcome};
use crate::engine::storage::{days_between, Storage};
use chrono::{DateTime, Datelike, Utc};
use log::{info, warn};
use std::collections::HashMap;

pub struct OutreachLedger {
    /// Active literal-chunk template for newly issued tracking codes.
    template: Vec<String>,
    tracking_codes: HashMap<String, TrackingCode>,
    status: HashMap<String, OutreachRecord>,
    metrics: ResponseMetrics,
}

impl OutreachLedger {
    pub fn new(template: Vec<String>) -> Self {
        Self {
            template,
            tracking_codes: HashMap::new(),
            status: HashMap::new(),
            metrics: ResponseMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &ResponseMetrics {
        &self.metrics
    }

    pub fn record(&self, contact_id: &str) -> Option<&OutreachRecord> {
        self.status.get(contact_id)
    }

    pub fn tracking_code(&self, contact_id: &str) -> Option<&TrackingCode> {
        self.tracking_codes.get(contact_id)
    }

    /// Render the signed signature text for a contact's current code.
    pub fn signature_for(&self, contact_id: &str) -> EngineResult<String> {
        let code = self
            .tracking_codes
            .get(contact_id)
            .ok_or_else(|| EngineError::NotFound(format!("tracking code for '{contact_id}'")))?;
        codec::encode(code.numeric_id, &code.literal_chunks)
    }

    // ── Sends ──────────────────────────────────────────────────────────

    /// Record one outbound message to a contact.
    ///
    /// Creates the outreach record on first send (count = 1) or increments
    /// it, bumps the global / category / ISO-week sent counters, and issues
    /// (or refreshes onto the active template) the contact's tracking code.
    pub fn record_outreach(
        &mut self,
        contact_id: &str,
        email: &str,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        // Issue (or refresh) the tracking code first: capacity exhaustion
        // must fail the send before any counter moves.
        self.issue_tracking_code(contact_id)?;

        match self.status.get_mut(contact_id) {
            Some(record) => {
                record.outreach_count += 1;
                record.last_outreach_at = now;
                record.email = email.to_string();
                if let Some(cat) = category {
                    record.category = Some(cat.to_string());
                }
            }
            None => {
                self.status.insert(
                    contact_id.to_string(),
                    OutreachRecord {
                        contact_id: contact_id.to_string(),
                        email: email.to_string(),
                        category: category.map(str::to_string),
                        last_outreach_at: now,
                        outreach_count: 1,
                        responded: false,
                        responded_at: None,
                        response_time_days: None,
                    },
                );
            }
        }

        self.metrics.total_sent += 1;
        self.metrics.response_rate =
            rate(self.metrics.total_responses, self.metrics.total_sent);
        if let Some(cat) = category.or_else(|| {
            self.status
                .get(contact_id)
                .and_then(|r| r.category.as_deref())
        }) {
            let bucket = self
                .metrics
                .category_metrics
                .entry(cat.to_string())
                .or_default();
            bucket.sent += 1;
            bucket.response_rate = rate(bucket.responses, bucket.sent);
        }
        let week = week_bucket(&mut self.metrics.weekly_stats, now);
        week.sent += 1;
        week.response_rate = rate(week.responses, week.sent);

        info!(
            "[outreach] Sent to {contact_id} ({email}), count={}",
            self.status[contact_id].outreach_count
        );
        Ok(())
    }

    /// Bind the contact to the active template, keeping its numeric id
    /// stable across re-issues. Fails with `Overflow` when the template's
    /// separator slots cannot address another contact.
    fn issue_tracking_code(&mut self, contact_id: &str) -> EngineResult<()> {
        let numeric_id = match self.tracking_codes.get(contact_id) {
            Some(code) => code.numeric_id,
            None => self
                .tracking_codes
                .values()
                .map(|c| c.numeric_id + 1)
                .max()
                .unwrap_or(0),
        };

        let slots = self.template.len().saturating_sub(1);
        let cap = codec::capacity(slots);
        if u128::from(numeric_id) >= cap {
            return Err(EngineError::Overflow {
                id: numeric_id,
                capacity: cap.min(u128::from(u64::MAX)) as u64,
            });
        }

        self.tracking_codes.insert(
            contact_id.to_string(),
            TrackingCode {
                contact_id: contact_id.to_string(),
                literal_chunks: self.template.clone(),
                numeric_id,
            },
        );
        Ok(())
    }

    // ── Responses ──────────────────────────────────────────────────────

    /// Correlate an inbound reply's signature text back to a contact.
    ///
    /// Runs the robust decoder against every known tracking code, checking
    /// the decoded id against that code's own numeric id (self-consistency,
    /// not mere membership in the global id set). On a match, flips the
    /// contact's record to Responded and updates every counter family.
    /// Returns the resolved contact id.
    pub fn record_response(
        &mut self,
        signature_text: &str,
        responded_at: DateTime<Utc>,
    ) -> EngineResult<String> {
        // Deterministic scan order: contact id ascending.
        let mut contact_ids: Vec<&String> = self.tracking_codes.keys().collect();
        contact_ids.sort();

        let mut matched: Option<String> = None;
        for contact_id in contact_ids {
            let code = &self.tracking_codes[contact_id];
            match codec::robust_decode(signature_text, &code.literal_chunks, &[code.numeric_id]) {
                RobustOutcome::Matched(_) => {
                    matched = Some(contact_id.clone());
                    break;
                }
                RobustOutcome::Exhausted => continue,
            }
        }

        let contact_id = matched.ok_or(EngineError::NoMatch)?;
        let record = self
            .status
            .get_mut(&contact_id)
            .ok_or_else(|| EngineError::outreach_not_found(&contact_id))?;

        if record.responded {
            // Already Responded; the state machine is one-way and the
            // counters were taken on the first response.
            warn!("[outreach] Duplicate response from {contact_id}, ignoring");
            return Ok(contact_id);
        }

        let response_time_days = days_between(record.last_outreach_at, responded_at);
        record.responded = true;
        record.responded_at = Some(responded_at);
        record.response_time_days = Some(response_time_days);
        let category = record.category.clone();

        self.metrics.total_responses += 1;
        self.metrics.response_rate =
            rate(self.metrics.total_responses, self.metrics.total_sent);
        self.metrics
            .response_times_by_contact
            .insert(contact_id.clone(), response_time_days);
        if let Some(cat) = category {
            let bucket = self.metrics.category_metrics.entry(cat).or_default();
            bucket.responses += 1;
            bucket.response_rate = rate(bucket.responses, bucket.sent);
        }
        let week = week_bucket(&mut self.metrics.weekly_stats, responded_at);
        week.responses += 1;
        week.response_rate = rate(week.responses, week.sent);

        info!(
            "[outreach] ✓ Response from {contact_id} after {response_time_days:.1} days"
        );
        Ok(contact_id)
    }

    // ── Persistence ────────────────────────────────────────────────────

    pub fn load(storage: &Storage, template: Vec<String>) -> EngineResult<Self> {
        let ledger = Self {
            template,
            tracking_codes: storage.load_json(TRACKING_CODES_FILE)?,
            status: storage.load_json(OUTREACH_STATUS_FILE)?,
            metrics: storage.load_json(RESPONSE_METRICS_FILE)?,
        };
        info!(
            "[outreach] Loaded {} tracking codes, {} outreach records",
            ledger.tracking_codes.len(),
            ledger.status.len()
        );
        Ok(ledger)
    }

    pub fn save(&self, storage: &Storage) -> EngineResult<()> {
        storage.save_json(TRACKING_CODES_FILE, &self.tracking_codes)?;
        storage.save_json(OUTREACH_STATUS_FILE, &self.status)?;
        storage.save_json(RESPONSE_METRICS_FILE, &self.metrics)?;
        Ok(())
    }
}

fn rate(responses: u32, sent: u32) -> f64 {
    if sent == 0 {
        0.0
    } else {
        f64::from(responses) / f64::from(sent)
    }
}

/// Find or create the `(iso_year, iso_week)` bucket for a timestamp.
/// Buckets stay sorted so the persisted sequence reads chronologically.
fn week_bucket(weekly: &mut Vec<WeeklyStats>, at: DateTime<Utc>) -> &mut WeeklyStats {
    let iso = at.iso_week();
    let key = (iso.year(), iso.week());
    let pos = weekly
        .iter()
        .position(|w| (w.iso_year, w.iso_week) == key);
    match pos {
        Some(i) => &mut weekly[i],
        None => {
            let insert_at = weekly
                .iter()
                .position(|w| (w.iso_year, w.iso_week) > key)
                .unwrap_or(weekly.len());
            weekly.insert(
                insert_at,
                WeeklyStats {
                    iso_year: key.0,
                    iso_week: key.1,
                    ..Default::default()
                },
            );
            &mut weekly[insert_at]
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn template() -> Vec<String> {
        vec!["Best,".to_string(), "Larry Velez".to_string(), "Sinu".to_string()]
    }

    #[test]
    fn test_outreach_then_response_scenario() {
        let mut ledger = OutreachLedger::new(template());
        let sent_at = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

        ledger
            .record_outreach("contact_1", "a@b.com", None, sent_at)
            .expect("outreach");
        let signature = ledger.signature_for("contact_1").expect("signature");

        let responded_at = sent_at + Duration::days(3);
        let resolved = ledger
            .record_response(&signature, responded_at)
            .expect("response");
        assert_eq!(resolved, "contact_1");

        let record = ledger.record("contact_1").expect("record");
        assert!(record.responded);
        assert_eq!(record.responded_at, Some(responded_at));
        assert!((record.response_time_days.expect("delta") - 3.0).abs() < 1e-9);

        let metrics = ledger.metrics();
        assert_eq!(metrics.total_sent, 1);
        assert_eq!(metrics.total_responses, 1);
        assert_eq!(metrics.response_rate, 1.0);
        assert_eq!(
            metrics.response_times_by_contact.get("contact_1").copied(),
            Some(3.0)
        );
    }

    #[test]
    fn test_repeat_sends_increment_but_never_reset_responded() {
        let mut ledger = OutreachLedger::new(template());
        let t0 = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

        ledger.record_outreach("c1", "a@b.com", None, t0).expect("send 1");
        let signature = ledger.signature_for("c1").expect("signature");
        ledger
            .record_response(&signature, t0 + Duration::days(1))
            .expect("response");

        ledger
            .record_outreach("c1", "a@b.com", None, t0 + Duration::days(7))
            .expect("send 2");
        let record = ledger.record("c1").expect("record");
        assert_eq!(record.outreach_count, 2);
        assert!(record.responded, "Responded is one-way");
        assert_eq!(ledger.metrics().total_sent, 2);
        assert_eq!(ledger.metrics().total_responses, 1);
        assert_eq!(ledger.metrics().response_rate, 0.5);
    }

    #[test]
    fn test_numeric_ids_are_stable_and_distinct() {
        let mut ledger = OutreachLedger::new(template());
        let now = Utc::now();
        ledger.record_outreach("alice", "a@x.com", None, now).expect("a");
        ledger.record_outreach("bob", "b@x.com", None, now).expect("b");
        ledger.record_outreach("alice", "a@x.com", None, now).expect("a again");

        let alice = ledger.tracking_code("alice").expect("alice").numeric_id;
        let bob = ledger.tracking_code("bob").expect("bob").numeric_id;
        assert_ne!(alice, bob);
        assert_eq!(
            ledger.tracking_code("alice").expect("alice").numeric_id,
            alice,
            "re-issuing must keep the id stable"
        );
    }

    #[test]
    fn test_template_capacity_exhaustion_is_overflow() {
        // One chunk = zero separator slots = capacity 1.
        let mut ledger = OutreachLedger::new(vec!["Larry".to_string()]);
        let now = Utc::now();
        ledger.record_outreach("first", "a@x.com", None, now).expect("fits");
        let err = ledger
            .record_outreach("second", "b@x.com", None, now)
            .unwrap_err();
        assert!(matches!(err, EngineError::Overflow { id: 1, capacity: 1 }));
    }

    #[test]
    fn test_unmatchable_signature_is_no_match() {
        let mut ledger = OutreachLedger::new(template());
        let now = Utc::now();
        ledger.record_outreach("c1", "a@b.com", None, now).expect("send");

        let err = ledger
            .record_response("Cheers, Somebody Else", now)
            .unwrap_err();
        assert!(matches!(err, EngineError::NoMatch));
        assert_eq!(ledger.metrics().total_responses, 0);
    }

    #[test]
    fn test_category_buckets() {
        let mut ledger = OutreachLedger::new(template());
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

        ledger
            .record_outreach("c1", "a@b.com", Some("investors"), now)
            .expect("send 1");
        ledger
            .record_outreach("c2", "c@d.com", Some("investors"), now)
            .expect("send 2");
        let signature = ledger.signature_for("c1").expect("signature");
        ledger
            .record_response(&signature, now + Duration::days(2))
            .expect("response");

        let bucket = &ledger.metrics().category_metrics["investors"];
        assert_eq!(bucket.sent, 2);
        assert_eq!(bucket.responses, 1);
        assert_eq!(bucket.response_rate, 0.5);
    }

    #[test]
    fn test_iso_week_thursday_rule_spans_calendar_years() {
        let mut ledger = OutreachLedger::new(template());
        // 2024-12-30 (Monday) and 2025-01-02 (Thursday) are both 2025-W01.
        let dec = Utc.with_ymd_and_hms(2024, 12, 30, 12, 0, 0).unwrap();
        let jan = Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap();

        ledger.record_outreach("c1", "a@b.com", None, dec).expect("send 1");
        ledger.record_outreach("c2", "c@d.com", None, jan).expect("send 2");

        let weekly = &ledger.metrics().weekly_stats;
        assert_eq!(weekly.len(), 1, "both sends share one ISO week");
        assert_eq!((weekly[0].iso_year, weekly[0].iso_week), (2025, 1));
        assert_eq!(weekly[0].sent, 2);
    }

    #[test]
    fn test_weekly_buckets_stay_sorted() {
        let mut ledger = OutreachLedger::new(template());
        let later = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 2, 3, 9, 0, 0).unwrap();

        ledger.record_outreach("c1", "a@b.com", None, later).expect("send 1");
        ledger.record_outreach("c2", "c@d.com", None, earlier).expect("send 2");

        let weeks: Vec<(i32, u32)> = ledger
            .metrics()
            .weekly_stats
            .iter()
            .map(|w| (w.iso_year, w.iso_week))
            .collect();
        let mut sorted = weeks.clone();
        sorted.sort();
        assert_eq!(weeks, sorted);
    }

    #[test]
    fn test_ledger_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::open(dir.path()).expect("storage");

        let mut ledger = OutreachLedger::new(template());
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        ledger
            .record_outreach("c1", "a@b.com", Some("investors"), now)
            .expect("send");
        let signature = ledger.signature_for("c1").expect("signature");
        ledger
            .record_response(&signature, now + Duration::days(3))
            .expect("response");
        ledger.save(&storage).expect("save");

        let loaded = OutreachLedger::load(&storage, template()).expect("load");
        assert_eq!(loaded.record("c1"), ledger.record("c1"));
        assert_eq!(loaded.metrics(), ledger.metrics());
        assert_eq!(loaded.tracking_code("c1"), ledger.tracking_code("c1"));
    }
}
