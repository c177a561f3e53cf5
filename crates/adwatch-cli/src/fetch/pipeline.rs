//! The fetch walk: page requests, per-item classification, and store writes.
//!
//! Pages are requested strictly one after another. Each page is drained into
//! the classifier, and every accepted record is upserted, before the next
//! request is sent. A transport or decode failure ends the walk but keeps what
//! was already accepted; store failures are recorded per record.

use std::collections::HashMap;

use adwatch_archive::{classify_item, next_page_url, ArchiveClient, ArchiveError, Classification};
use adwatch_core::{aggregate_pages, AdRecord, Country, FilterConfig, PageAggregate};
use adwatch_db::DbError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Upper bound on continuation cursors followed in one run.
pub(crate) const MAX_PAGES: usize = 200;

/// Where and how to reach the archive.
#[derive(Debug, Clone)]
pub(crate) struct ArchiveEndpoint {
    pub url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl ArchiveEndpoint {
    pub(crate) fn from_app_config(config: &adwatch_core::AppConfig) -> Self {
        Self {
            url: config.archive_url.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Inputs of one fetch run.
#[derive(Debug, Clone)]
pub(crate) struct FetchRequest {
    pub token: Option<String>,
    pub country: Country,
    pub filters: FilterConfig,
    pub max_results: usize,
}

/// Snapshot handed to the progress callback after each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FetchProgress {
    pub pages: usize,
    pub accepted: usize,
    pub max_results: usize,
}

impl FetchProgress {
    /// `accepted / max_results`, clamped to `1.0`.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn fraction(&self) -> f64 {
        if self.max_results == 0 {
            return 1.0;
        }
        (self.accepted as f64 / self.max_results as f64).min(1.0)
    }
}

/// Counts of items left out of the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RejectionCounts {
    /// Ordinary filtering: too recent, no keyword, no call to action.
    pub filtered: usize,
    /// Items that could not be read: malformed or without a usable start time.
    pub unreadable: usize,
}

/// Everything a fetch run produced, including partial results.
#[derive(Debug)]
pub(crate) struct FetchReport {
    /// Accepted records, one per ad id, impressions descending.
    pub ads: Vec<AdRecord>,
    pub pages: Vec<PageAggregate>,
    pub pages_fetched: usize,
    pub rejections: RejectionCounts,
    /// Ad id and the error for each record the store refused.
    pub store_failures: Vec<(String, DbError)>,
    /// The failure that ended the walk early, if any.
    pub aborted: Option<ArchiveError>,
}

impl FetchReport {
    pub(crate) fn is_complete(&self) -> bool {
        self.aborted.is_none() && self.store_failures.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum FetchError {
    #[error("no archive access token configured; pass --token or set ADWATCH_ACCESS_TOKEN")]
    MissingCredential,

    #[error("failed to build archive client: {0}")]
    Client(#[from] ArchiveError),
}

/// Runs one fetch against the archive at `endpoint`, writing accepted records
/// to `pool`.
///
/// `now` is the observation time used for `days_active` and `fetch_date`.
/// `on_progress` is called after every page and has no effect on the walk.
///
/// # Errors
///
/// Returns [`FetchError::MissingCredential`] before any request when no
/// non-blank token is supplied, and [`FetchError::Client`] if the HTTP client
/// cannot be built. Failures during the walk are reported in
/// [`FetchReport::aborted`] and [`FetchReport::store_failures`].
pub(crate) async fn run_fetch_pipeline<F>(
    pool: &SqlitePool,
    endpoint: &ArchiveEndpoint,
    request: &FetchRequest,
    now: DateTime<Utc>,
    mut on_progress: F,
) -> Result<FetchReport, FetchError>
where
    F: FnMut(FetchProgress),
{
    let token = request
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(FetchError::MissingCredential)?;

    let client = ArchiveClient::with_base_url(
        token,
        endpoint.timeout_secs,
        &endpoint.user_agent,
        &endpoint.url,
    )?;

    let mut ads: Vec<AdRecord> = Vec::new();
    // Batch position of each accepted id; a repeat replaces the earlier entry.
    let mut batch_index: HashMap<String, usize> = HashMap::new();
    let mut rejections = RejectionCounts::default();
    let mut store_failures: Vec<(String, DbError)> = Vec::new();
    let mut aborted: Option<ArchiveError> = None;
    let mut pages_fetched: usize = 0;

    let mut next_url =
        (request.max_results > 0).then(|| client.first_page_url(&request.country));

    while let Some(url) = next_url.take() {
        if pages_fetched >= MAX_PAGES {
            tracing::warn!(max_pages = MAX_PAGES, "page limit reached; stopping walk");
            aborted = Some(ArchiveError::PaginationLimit {
                max_pages: MAX_PAGES,
            });
            break;
        }

        let page = match client.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(
                    page = pages_fetched + 1,
                    accepted = ads.len(),
                    error = %e,
                    "archive page request failed; keeping partial results"
                );
                aborted = Some(e);
                break;
            }
        };
        pages_fetched += 1;

        for item in &page.data {
            if ads.len() >= request.max_results {
                break;
            }
            match classify_item(item, &request.filters, now) {
                Classification::Accepted(record) => {
                    if let Err(e) = adwatch_db::upsert_ad(pool, &record).await {
                        tracing::error!(ad_id = %record.id, error = %e, "failed to store ad");
                        store_failures.push((record.id.clone(), e));
                    }
                    if let Some(&index) = batch_index.get(&record.id) {
                        tracing::debug!(ad_id = %record.id, "ad seen again; replacing batch entry");
                        ads[index] = record;
                    } else {
                        batch_index.insert(record.id.clone(), ads.len());
                        ads.push(record);
                    }
                }
                Classification::Rejected(reason) => {
                    let ad_id = item.get("id").and_then(|v| v.as_str()).unwrap_or("?");
                    if reason.is_reportable() {
                        tracing::warn!(ad_id, %reason, "skipping unreadable archive item");
                        rejections.unreadable += 1;
                    } else {
                        tracing::debug!(ad_id, %reason, "ad filtered out");
                        rejections.filtered += 1;
                    }
                }
            }
        }

        let progress = FetchProgress {
            pages: pages_fetched,
            accepted: ads.len(),
            max_results: request.max_results,
        };
        tracing::info!(
            page = pages_fetched,
            items = page.data.len(),
            accepted = progress.accepted,
            progress = progress.fraction(),
            "archive page processed"
        );
        on_progress(progress);

        if ads.len() >= request.max_results {
            break;
        }

        match next_page_url(&page) {
            Ok(next) => next_url = next,
            Err(e) => {
                tracing::error!(error = %e, "unusable continuation cursor; stopping walk");
                aborted = Some(e);
            }
        }
    }

    ads.sort_by(|a, b| b.impressions.cmp(&a.impressions));
    let pages = aggregate_pages(&ads);

    tracing::info!(
        pages_fetched,
        accepted = ads.len(),
        filtered = rejections.filtered,
        unreadable = rejections.unreadable,
        store_failures = store_failures.len(),
        aborted = aborted.is_some(),
        "fetch finished"
    );

    Ok(FetchReport {
        ads,
        pages,
        pages_fetched,
        rejections,
        store_failures,
        aborted,
    })
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
