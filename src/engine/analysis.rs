// engine/analysis.rs — Communication analysis over the message provider.
// Summarizes a contact's thread history into communication metrics, then
// refreshes importance scores. The provider is opaque — the core never
// sees raw message bodies, only sender/timestamp metadata.
//
// Batch shape follows the snapshot rule: the per-contact summarize step is
// pure and may run concurrently; every write-back funnels through the
// store's single serialized apply step.

use crate::atoms::error::EngineResult;
use crate::atoms::traits::MessageProvider;
use crate::atoms::types::{
    CommunicationMetrics, EntityKind, Observation, ScoringWeights,
};
use crate::engine::scoring;
use crate::engine::store::ContactStore;
use chrono::{DateTime, Utc};
use log::info;

/// Summarize every thread involving `contact_email` into metrics.
///
/// - `email_count`: messages sent by the contact across matching threads
/// - `last_contacted_at`: newest message timestamp in those threads
/// - `response_rate`: fraction of threads where the contact wrote anything
///   after the opening message
///
/// Meeting counts come from elsewhere (calendar import) and are left unset.
pub fn summarize_communication(
    provider: &dyn MessageProvider,
    contact_email: &str,
) -> EngineResult<CommunicationMetrics> {
    let threads = provider.search(contact_email)?;

    let mut email_count: u32 = 0;
    let mut last_contacted_at: Option<DateTime<Utc>> = None;
    let mut threads_seen: u32 = 0;
    let mut threads_replied: u32 = 0;

    for thread_ref in &threads {
        let messages = provider.get_thread(&thread_ref.thread_id)?;
        if messages.is_empty() {
            continue;
        }
        threads_seen += 1;

        let replied = messages
            .iter()
            .skip(1)
            .any(|m| m.sender.eq_ignore_ascii_case(contact_email));
        if replied {
            threads_replied += 1;
        }

        for message in &messages {
            if message.sender.eq_ignore_ascii_case(contact_email) {
                email_count += 1;
            }
            last_contacted_at = Some(match last_contacted_at {
                Some(prev) => prev.max(message.timestamp),
                None => message.timestamp,
            });
        }
    }

    let response_rate = if threads_seen == 0 {
        None
    } else {
        Some(f64::from(threads_replied) / f64::from(threads_seen))
    };

    Ok(CommunicationMetrics {
        email_count: Some(email_count),
        last_contacted_at,
        response_rate,
        meeting_count: None,
    })
}

/// Analyze every contact with a known email address, then rescore.
///
/// Phase 1 summarizes each contact independently (pure with respect to the
/// store) and collects the pending observations; phase 2 applies them
/// serially; phase 3 recomputes and applies importance scores the same way.
/// Returns the number of contacts analyzed.
pub fn analyze_contacts(
    store: &mut ContactStore,
    provider: &dyn MessageProvider,
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> EngineResult<usize> {
    let mut pending: Vec<(String, Observation)> = Vec::new();
    for entity in store.query_by_kind(EntityKind::Contact) {
        let Some(email) = entity.primary_email() else {
            continue;
        };
        let metrics = summarize_communication(provider, email)?;
        pending.push((
            entity.id.clone(),
            Observation::CommunicationMetrics(metrics),
        ));
    }
    pending.sort_by(|a, b| a.0.cmp(&b.0));

    let analyzed = store.apply_batch(pending)?;
    let updates = scoring::compute_batch(store, weights, now);
    scoring::apply_batch(store, updates)?;

    info!("[analysis] Analyzed and rescored {analyzed} contacts");
    Ok(analyzed)
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
