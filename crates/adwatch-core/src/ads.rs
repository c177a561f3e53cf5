use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A classified ad accepted by a fetch run.
///
/// One record exists per ad identity; a later fetch of the same `id`
/// replaces the stored row rather than adding a second one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRecord {
    /// Upstream-assigned identity; primary key of the record store.
    pub id: String,
    pub page_name: String,
    /// All creative body strings joined with a single space.
    pub body_text: String,
    pub snapshot_url: String,
    /// Delivery start as reported upstream, normalised to UTC.
    pub start_time: DateTime<Utc>,
    /// Whole days between `start_time` and the observation time of the run.
    pub days_active: i64,
    /// Lower bound of the upstream impressions range; `0` when absent or unparsable.
    pub impressions: u64,
    /// Lower bound of the upstream spend range, unit untouched; `"N/A"` when absent.
    pub spend: String,
    /// `impressions` met the run's winner threshold.
    pub is_winner: bool,
    /// Date of the fetch run that produced this record.
    pub fetch_date: NaiveDate,
}

/// Per-page rollup over one fetch batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageAggregate {
    pub page_name: String,
    pub active_ad_count: usize,
    pub summed_impressions: u64,
}

/// One stored observation of a page, used for trend display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryPoint {
    pub fetch_date: NaiveDate,
    pub days_active: i64,
}
