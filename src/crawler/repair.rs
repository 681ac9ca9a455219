//! Repair pass - merge-only reconciliation of partial records
//!
//! Walks the stored titles that still have empty/zero fields, re-fetches
//! each, and copies over only the values that are currently missing. A
//! populated field is never overwritten, so a transient extraction
//! regression on a re-fetch cannot damage good data. The pass is idempotent
//! and safe to re-run at any time.

use crate::config::Config;
use crate::extract::extract_title;
use crate::fetch::Fetch;
use crate::store::{SqliteStore, Store};
use crate::Result;
use std::time::Duration;

/// What a repair pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Incomplete records examined
    pub examined: u64,

    /// Records where at least one missing field was filled
    pub patched: u64,

    /// Records skipped because re-fetching failed
    pub failed: u64,
}

/// Re-fetches up to `max_items` incomplete titles in chunks of `batch_size`
/// and merges freshly extracted values into their missing fields
pub async fn repair<F: Fetch>(
    config: &Config,
    store: &mut SqliteStore,
    fetcher: &F,
    batch_size: usize,
    max_items: usize,
) -> Result<RepairOutcome> {
    let mut candidates = store.find_incomplete()?;
    candidates.truncate(max_items);

    tracing::info!(
        "Repair: {} incomplete records, visiting {} in chunks of {}",
        store.count_incomplete()?,
        candidates.len(),
        batch_size
    );

    let mut outcome = RepairOutcome::default();

    for chunk in candidates.chunks(batch_size) {
        for slug in chunk {
            let Some(mut stored) = store.get_title(slug)? else {
                continue;
            };
            outcome.examined += 1;

            let url = config.site.title_url(slug);
            let fresh = match fetcher.load(&url).await {
                Ok(doc) => extract_title(&doc, slug),
                Err(e) => {
                    tracing::warn!("Repair fetch for {} failed: {}", slug, e);
                    outcome.failed += 1;
                    continue;
                }
            };

            if stored.merge_missing(&fresh) {
                store.upsert_title(&stored)?;
                outcome.patched += 1;
                tracing::info!(
                    "Repaired {}: {} fields still missing",
                    slug,
                    stored.missing_fields().len()
                );
            } else {
                tracing::debug!("No new data for {}", slug);
            }

            tokio::time::sleep(Duration::from_millis(config.crawler.request_delay_ms)).await;
        }

        tracing::debug!(
            "Repair progress: {} examined, {} patched",
            outcome.examined,
            outcome.patched
        );
    }

    tracing::info!(
        "Repair finished: {} examined, {} patched, {} failed",
        outcome.examined,
        outcome.patched,
        outcome.failed
    );
    Ok(outcome)
}
