//! Per-page "scaled offer" rollups over one fetch batch.

use std::collections::BTreeMap;

use crate::ads::{AdRecord, PageAggregate};

/// Groups `ads` by `page_name`, counting records and summing impressions.
///
/// Pages are ordered by `active_ad_count` descending; ties are broken by
/// `page_name` ascending so the output is deterministic for a given batch.
#[must_use]
pub fn aggregate_pages(ads: &[AdRecord]) -> Vec<PageAggregate> {
    let mut by_page: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    for ad in ads {
        let entry = by_page.entry(ad.page_name.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(ad.impressions);
    }

    let mut pages: Vec<PageAggregate> = by_page
        .into_iter()
        .map(|(page_name, (active_ad_count, summed_impressions))| PageAggregate {
            page_name: page_name.to_string(),
            active_ad_count,
            summed_impressions,
        })
        .collect();

    // BTreeMap iteration already yields page_name ascending; a stable sort
    // keeps that order among equal counts.
    pages.sort_by(|a, b| b.active_ad_count.cmp(&a.active_ad_count));
    pages
}
