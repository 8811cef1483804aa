use crate::pipeline::ListingFilter;
use crate::store::{ListingStore, StoreError};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedListing {
    pub id: i64,
    pub address: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub examined: usize,
    pub removed: Vec<RemovedListing>,
}

impl CleanupReport {
    pub fn remaining(&self) -> usize {
        self.examined - self.removed.len()
    }
}

/// Re-runs the listing filter over everything stored and deletes what no
/// longer passes, so tightened rules apply without re-scraping.
///
/// With `dry_run` the offenders are reported but left in place.
pub fn cleanup(
    store: &mut ListingStore,
    filter: &ListingFilter,
    dry_run: bool,
) -> Result<CleanupReport, StoreError> {
    let listings = store.listings()?;
    let examined = listings.len();
    info!("Analyzing {} stored listings...", examined);

    let removed: Vec<RemovedListing> = listings
        .iter()
        .filter_map(|stored| {
            let fields = stored.property.zone_fields();
            let verdict = filter.accepts_with_title_fallback(&fields);
            if verdict.is_accepted() {
                return None;
            }
            let address = fields.zone_address().unwrap_or_default().to_string();
            info!("❌ Removing ID {}: {} ({})", stored.id, address, verdict);
            Some(RemovedListing {
                id: stored.id,
                address,
                reason: verdict.reason(),
            })
        })
        .collect();

    if !dry_run && !removed.is_empty() {
        let ids: Vec<i64> = removed.iter().map(|r| r.id).collect();
        store.remove(&ids)?;
    }

    let report = CleanupReport { examined, removed };
    info!(
        "Examined: {}, removed: {}, remaining: {}",
        report.examined,
        report.removed.len(),
        report.remaining()
    );
    Ok(report)
}
