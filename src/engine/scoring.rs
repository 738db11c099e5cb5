// engine/scoring.rs — Importance Scoring Engine.
// Computes a weighted 0–100 rank per contact from five normalized factors:
// email frequency (log-scaled), recency of contact (linear decay over a
// year), response rate, meeting frequency, and manual priority.
//
// Missing metrics are not errors: an unobserved factor normalizes to 0.
// The final score is not clamped: weights are caller-supplied, and weights
// that do not sum to 1.0 scale the score past 100 accordingly.

use crate::atoms::constants::{
    FREQUENCY_SATURATION, MANUAL_PRIORITY_MAX, MEETING_SATURATION, RECENCY_WINDOW_DAYS,
};
use crate::atoms::error::EngineResult;
use crate::atoms::types::{
    Entity, EntityKind, ImportanceMetrics, Observation, ScoreUpdate, ScoringWeights,
};
use crate::engine::storage::days_between;
use crate::engine::store::ContactStore;
use chrono::{DateTime, Utc};
use log::info;

/// The five normalized factors, each nominally in [0, 1].
/// `response_rate` is passed through as stored and may leave that range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Factors {
    pub frequency: f64,
    pub recency: f64,
    pub response_rate: f64,
    pub meeting_frequency: f64,
    pub manual_priority: f64,
}

/// Normalize a contact's observed metrics into scoring factors.
pub fn normalized_factors(entity: &Entity, now: DateTime<Utc>) -> Factors {
    let comm = entity.communication_metrics();
    let importance = entity.importance_metrics();

    let frequency = match comm.and_then(|m| m.email_count) {
        None | Some(0) => 0.0,
        Some(n) if n as f64 >= FREQUENCY_SATURATION => 1.0,
        Some(n) => (n as f64).ln() / FREQUENCY_SATURATION.ln(),
    };

    let recency = match comm.and_then(|m| m.last_contacted_at) {
        None => 0.0,
        Some(last) => (1.0 - days_between(last, now) / RECENCY_WINDOW_DAYS).max(0.0),
    };

    let response_rate = comm.and_then(|m| m.response_rate).unwrap_or(0.0);

    let meeting_frequency = comm
        .and_then(|m| m.meeting_count)
        .map(|n| (n as f64 / MEETING_SATURATION).clamp(0.0, 1.0))
        .unwrap_or(0.0);

    let manual_priority = importance
        .and_then(|m| m.manual_priority)
        .map(|p| p as f64 / MANUAL_PRIORITY_MAX)
        .unwrap_or(0.0);

    Factors {
        frequency,
        recency,
        response_rate,
        meeting_frequency,
        manual_priority,
    }
}

/// Weighted importance score for one contact: `round(100 * Σ wᵢ·fᵢ)`.
pub fn compute_score(entity: &Entity, weights: &ScoringWeights, now: DateTime<Utc>) -> i64 {
    let f = normalized_factors(entity, now);
    let sum = weights.frequency * f.frequency
        + weights.recency * f.recency
        + weights.response_rate * f.response_rate
        + weights.meeting_frequency * f.meeting_frequency
        + weights.manual_priority * f.manual_priority;
    (100.0 * sum).round() as i64
}

/// Pure compute phase of a batch analysis: score every Contact entity.
/// Safe to parallelize per contact: nothing here touches shared state.
/// Results are ordered by entity id so the apply phase is deterministic.
pub fn compute_batch(
    store: &ContactStore,
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> Vec<ScoreUpdate> {
    let mut updates: Vec<ScoreUpdate> = store
        .query_by_kind(EntityKind::Contact)
        .into_iter()
        .map(|entity| ScoreUpdate {
            entity_id: entity.id.clone(),
            score: compute_score(entity, weights, now),
        })
        .collect();
    updates.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
    updates
}

/// Serialized apply phase: write computed scores back into the store.
/// Each write merges into the contact's importance metrics, preserving its
/// manual priority. All writes funnel through this one sequential pass;
/// the store has no internal locking.
pub fn apply_batch(store: &mut ContactStore, updates: Vec<ScoreUpdate>) -> EngineResult<usize> {
    let count = updates.len();
    store.apply_batch(updates.into_iter().map(|u| {
        (
            u.entity_id,
            Observation::ImportanceMetrics(ImportanceMetrics {
                manual_priority: None,
                calculated_score: Some(u.score),
            }),
        )
    }))?;
    info!("[scoring] Applied {count} score updates");
    Ok(count)
}

/// Top-N contacts by materialized score, descending; ties broken by entity
/// id ascending for determinism. Recomputes nothing; a contact that has
/// never been scored ranks as 0.
pub fn rank_top_n(store: &ContactStore, n: usize) -> Vec<&Entity> {
    let mut contacts = store.query_by_kind(EntityKind::Contact);
    contacts.sort_by(|a, b| {
        let score_a = materialized_score(a);
        let score_b = materialized_score(b);
        score_b.cmp(&score_a).then_with(|| a.id.cmp(&b.id))
    });
    contacts.truncate(n);
    contacts
}

fn materialized_score(entity: &Entity) -> i64 {
    entity
        .importance_metrics()
        .and_then(|m| m.calculated_score)
        .unwrap_or(0)
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::CommunicationMetrics;
    use chrono::Duration;

    fn contact_with_metrics(
        id: &str,
        comm: CommunicationMetrics,
        manual_priority: Option<u8>,
    ) -> Entity {
        let mut entity = Entity {
            id: id.to_string(),
            name: id.to_string(),
            kind: EntityKind::Contact,
            observations: Vec::new(),
        };
        entity
            .observations
            .push(Observation::CommunicationMetrics(comm));
        if manual_priority.is_some() {
            entity
                .observations
                .push(Observation::ImportanceMetrics(ImportanceMetrics {
                    manual_priority,
                    calculated_score: None,
                }));
        }
        entity
    }

    #[test]
    fn test_missing_metrics_normalize_to_zero() {
        let entity = Entity::new("nobody", EntityKind::Contact);
        let now = Utc::now();
        assert_eq!(normalized_factors(&entity, now), Factors::default());
        assert_eq!(compute_score(&entity, &ScoringWeights::default(), now), 0);
    }

    #[test]
    fn test_frequency_saturates_at_one_hundred_emails() {
        let now = Utc::now();
        let at_cap = contact_with_metrics(
            "a",
            CommunicationMetrics {
                email_count: Some(100),
                ..Default::default()
            },
            None,
        );
        let over_cap = contact_with_metrics(
            "b",
            CommunicationMetrics {
                email_count: Some(5000),
                ..Default::default()
            },
            None,
        );
        assert_eq!(normalized_factors(&at_cap, now).frequency, 1.0);
        assert_eq!(normalized_factors(&over_cap, now).frequency, 1.0);
    }

    #[test]
    fn test_recency_floor_is_zero() {
        let now = Utc::now();
        let stale = contact_with_metrics(
            "a",
            CommunicationMetrics {
                last_contacted_at: Some(now - Duration::days(1000)),
                ..Default::default()
            },
            None,
        );
        assert_eq!(normalized_factors(&stale, now).recency, 0.0);
    }

    #[test]
    fn test_worked_example_scores_84() {
        // emailCount=45, 15 days since contact, responseRate=0.85,
        // meetingCount=12, manualPriority=9, default weights:
        //   frequency  = ln(45)/ln(100)       ≈ 0.8266
        //   recency    = 1 - 15/365           ≈ 0.9589
        //   meetings   = 12/20                = 0.6
        //   manual     = 9/10                 = 0.9
        //   Σ w·f ≈ 0.8443 → round(84.43) = 84
        let now = Utc::now();
        let entity = contact_with_metrics(
            "larry",
            CommunicationMetrics {
                email_count: Some(45),
                last_contacted_at: Some(now - Duration::days(15)),
                response_rate: Some(0.85),
                meeting_count: Some(12),
            },
            Some(9),
        );
        assert_eq!(compute_score(&entity, &ScoringWeights::default(), now), 84);
    }

    #[test]
    fn test_score_monotonic_in_each_factor() {
        let now = Utc::now();
        let weights = ScoringWeights::default();
        let base = CommunicationMetrics {
            email_count: Some(20),
            last_contacted_at: Some(now - Duration::days(30)),
            response_rate: Some(0.5),
            meeting_count: Some(5),
        };

        let score =
            |comm: CommunicationMetrics, prio| compute_score(&contact_with_metrics("x", comm, prio), &weights, now);
        let baseline = score(base.clone(), Some(5));

        let mut more_email = base.clone();
        more_email.email_count = Some(60);
        assert!(score(more_email, Some(5)) >= baseline);

        let mut better_rate = base.clone();
        better_rate.response_rate = Some(0.9);
        assert!(score(better_rate, Some(5)) >= baseline);

        let mut more_meetings = base.clone();
        more_meetings.meeting_count = Some(15);
        assert!(score(more_meetings, Some(5)) >= baseline);

        assert!(score(base.clone(), Some(9)) >= baseline);

        let mut staler = base.clone();
        staler.last_contacted_at = Some(now - Duration::days(200));
        assert!(score(staler, Some(5)) <= baseline);
    }

    #[test]
    fn test_unnormalized_weights_can_exceed_100() {
        let now = Utc::now();
        let entity = contact_with_metrics(
            "x",
            CommunicationMetrics {
                email_count: Some(200),
                last_contacted_at: Some(now),
                response_rate: Some(1.0),
                meeting_count: Some(30),
            },
            Some(10),
        );
        let heavy = ScoringWeights {
            frequency: 0.5,
            recency: 0.5,
            response_rate: 0.5,
            meeting_frequency: 0.5,
            manual_priority: 0.5,
        };
        assert!(compute_score(&entity, &heavy, now) > 100);
    }

    #[test]
    fn test_rank_top_n_orders_and_breaks_ties_by_id() {
        let mut store = ContactStore::new();
        for (id, score) in [("c", 50), ("a", 90), ("b", 50), ("d", 70)] {
            let mut entity = Entity {
                id: id.to_string(),
                name: id.to_string(),
                kind: EntityKind::Contact,
                observations: Vec::new(),
            };
            entity
                .observations
                .push(Observation::ImportanceMetrics(ImportanceMetrics {
                    manual_priority: None,
                    calculated_score: Some(score),
                }));
            store.upsert_entity(entity);
        }

        let first = rank_top_n(&store, 5);
        let ids: Vec<&str> = first.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d", "b", "c"], "desc by score, ties id asc");

        // Stable across repeated calls with unchanged input.
        let second = rank_top_n(&store, 5);
        assert_eq!(
            ids,
            second.iter().map(|e| e.id.as_str()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_compute_then_apply_batch_materializes_scores() {
        let mut store = ContactStore::new();
        let now = Utc::now();
        store.upsert_entity(contact_with_metrics(
            "c1",
            CommunicationMetrics {
                email_count: Some(45),
                last_contacted_at: Some(now - Duration::days(15)),
                response_rate: Some(0.85),
                meeting_count: Some(12),
            },
            Some(9),
        ));

        let updates = compute_batch(&store, &ScoringWeights::default(), now);
        assert_eq!(updates.len(), 1);
        apply_batch(&mut store, updates).expect("apply");

        let metrics = store.get("c1").expect("c1").importance_metrics().expect("metrics");
        assert_eq!(metrics.calculated_score, Some(84));
        assert_eq!(metrics.manual_priority, Some(9), "apply must not clobber priority");
    }
}
