//! Cursor handling for archive searches.
//!
//! Each response may carry `paging.next`, a complete URL for the following
//! page with every request parameter (credential included) already encoded.
//! The walk follows it verbatim; a missing or empty `next` ends the walk.

use reqwest::Url;

use crate::error::ArchiveError;
use crate::types::ArchivePage;

/// Returns the continuation URL of `page`, or `None` on the last page.
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidUrl`] if `paging.next` is present but is not
/// an absolute URL. The reported URL has its query string removed.
pub fn next_page_url(page: &ArchivePage) -> Result<Option<Url>, ArchiveError> {
    let Some(raw) = page
        .paging
        .as_ref()
        .and_then(|p| p.next.as_deref())
        .map(str::trim)
        .filter(|next| !next.is_empty())
    else {
        return Ok(None);
    };

    Url::parse(raw)
        .map(Some)
        .map_err(|e| ArchiveError::InvalidUrl {
            url: strip_query(raw).to_string(),
            reason: e.to_string(),
        })
}

/// Drops everything from the first `?` so credentials never reach logs.
pub(crate) fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
