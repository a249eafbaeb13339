// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::types::{Deal, DealSource};
use futures::future::join_all;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time counter registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_deals_total", "Deals parsed from sources.");
        describe_counter!(
            "ingest_promoted_skipped_total",
            "Promoted/sponsored items dropped by providers."
        );
        describe_counter!(
            "ingest_item_errors_total",
            "Individual feed items that failed to decode."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Source fetch/decode failures."
        );
        describe_counter!(
            "ingest_dedup_total",
            "Deals removed by normalized-title dedup."
        );
    });
}

/// Short prefix of a raw feed item for skip warnings.
pub(crate) fn item_snippet(v: &serde_json::Value) -> String {
    v.to_string().chars().take(120).collect()
}

/// Fetch every source concurrently and concatenate results in source order.
/// A failing source is logged and contributes nothing.
pub async fn fetch_all(sources: &[Box<dyn DealSource>]) -> Vec<Deal> {
    ensure_metrics_described();

    let results = join_all(sources.iter().map(|s| s.fetch_latest())).await;

    let mut all = Vec::new();
    for (source, res) in sources.iter().zip(results) {
        match res {
            Ok(mut deals) => {
                tracing::info!(source = source.name(), count = deals.len(), "fetched deals");
                counter!("ingest_deals_total").increment(deals.len() as u64);
                all.append(&mut deals);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = source.name(), "source error");
                counter!("ingest_source_errors_total").increment(1);
            }
        }
    }
    all
}

/// Sort by score (highest first) and keep the first deal per normalized title.
pub fn dedup_by_title(mut deals: Vec<Deal>) -> Vec<Deal> {
    deals.sort_by(|a, b| b.score.cmp(&a.score));

    let before = deals.len();
    let mut seen: HashSet<String> = HashSet::new();
    deals.retain(|d| seen.insert(d.title_key()));

    counter!("ingest_dedup_total").increment((before - deals.len()) as u64);
    deals
}
