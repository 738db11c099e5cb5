// engine/metrics.rs — Metrics Aggregator.
// Read-only rollups over the store and the outreach ledger for reporting.
// Nothing here mutates state; the CLI renders what comes out of this layer.

use crate::atoms::types::{CategoryMetrics, WeeklyStats};
use crate::engine::outreach::OutreachLedger;
use crate::engine::scoring;
use crate::engine::store::ContactStore;

/// One line of the top-N contact report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub rank: usize,
    pub entity_id: String,
    pub name: String,
    pub email: Option<String>,
    pub score: i64,
    pub outreach_count: u32,
    pub responded: bool,
}

/// Top-N contacts by materialized importance score, joined against the
/// ledger's outreach state.
pub fn top_contacts(store: &ContactStore, ledger: &OutreachLedger, n: usize) -> Vec<ReportRow> {
    scoring::rank_top_n(store, n)
        .into_iter()
        .enumerate()
        .map(|(i, entity)| {
            let record = ledger.record(&entity.id);
            ReportRow {
                rank: i + 1,
                entity_id: entity.id.clone(),
                name: entity.name.clone(),
                email: entity.primary_email().map(str::to_string),
                score: entity
                    .importance_metrics()
                    .and_then(|m| m.calculated_score)
                    .unwrap_or(0),
                outreach_count: record.map(|r| r.outreach_count).unwrap_or(0),
                responded: record.map(|r| r.responded).unwrap_or(false),
            }
        })
        .collect()
}

/// Per-category counters, sorted by category name for stable output.
pub fn category_summary(ledger: &OutreachLedger) -> Vec<(String, CategoryMetrics)> {
    let mut rows: Vec<(String, CategoryMetrics)> = ledger
        .metrics()
        .category_metrics
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

/// Weekly counters in chronological order (the ledger keeps them sorted).
pub fn weekly_summary(ledger: &OutreachLedger) -> &[WeeklyStats] {
    &ledger.metrics().weekly_stats
}
