//! Archive API response types.
//!
//! A search response is `{"data": [...], "paging": {"next": "..."}}`. Items
//! are kept as raw JSON in [`ArchivePage`] and decoded one at a time into
//! [`RawAd`], so a single malformed item cannot fail the whole page.

use serde::Deserialize;

/// One page of an archive search.
#[derive(Debug, Deserialize)]
pub struct ArchivePage {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

/// Paging block of a search response. Only `next` drives the walk.
#[derive(Debug, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

/// A single archive item as requested through [`crate::ARCHIVE_FIELDS`].
///
/// The range fields stay untyped: upstream sends `lower_bound` as a string
/// (`"1,000"`) and occasionally as a number, and an unexpected shape must
/// degrade to a default instead of rejecting the item.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAd {
    pub id: String,
    #[serde(default)]
    pub page_name: Option<String>,
    #[serde(default)]
    pub ad_creative_bodies: Option<Vec<String>>,
    #[serde(default)]
    pub ad_snapshot_url: Option<String>,
    #[serde(default)]
    pub ad_delivery_start_time: Option<String>,
    #[serde(default)]
    pub impressions: Option<serde_json::Value>,
    #[serde(default)]
    pub spend: Option<serde_json::Value>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Error envelope: `{"error": {"message": "...", "type": "...", "code": 190}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}
