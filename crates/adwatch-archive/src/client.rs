//! HTTP client for the ads-archive search endpoint.
//!
//! Wraps `reqwest` with the archive's fixed search parameters, the per-request
//! deadline, and its `{"error": {...}}` envelope, which is surfaced as
//! [`ArchiveError::Api`] whatever the HTTP status.

use std::time::Duration;

use adwatch_core::config::DEFAULT_ARCHIVE_URL;
use adwatch_core::Country;
use reqwest::{Client, Url};

use crate::error::ArchiveError;
use crate::pagination::strip_query;
use crate::types::{ArchivePage, ErrorEnvelope};

/// Items requested per page.
pub const PAGE_SIZE: u32 = 100;

/// Fields requested for every archive item.
pub const ARCHIVE_FIELDS: &str = "id,page_name,ad_creative_bodies,ad_snapshot_url,\
ad_delivery_start_time,impressions,spend,currency";

/// Client for the archive search endpoint.
///
/// Use [`ArchiveClient::new`] for production or [`ArchiveClient::with_base_url`]
/// to point at a mock server in tests.
pub struct ArchiveClient {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl ArchiveClient {
    /// Creates a client pointed at the production archive endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ArchiveError> {
        Self::with_base_url(access_token, timeout_secs, user_agent, DEFAULT_ARCHIVE_URL)
    }

    /// Creates a client with a custom endpoint URL.
    ///
    /// `timeout_secs` bounds each page request end to end.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ArchiveError::InvalidUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ArchiveError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| ArchiveError::InvalidUrl {
            url: strip_query(base_url).to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url,
        })
    }

    /// Builds the URL of the first search page: active ads of any type in
    /// `country`, empty search terms, [`ARCHIVE_FIELDS`], [`PAGE_SIZE`] items.
    #[must_use]
    pub fn first_page_url(&self, country: &Country) -> Url {
        let countries = serde_json::json!([country.as_param()]).to_string();
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("ad_active_status", "ACTIVE")
            .append_pair("ad_type", "ALL")
            .append_pair("search_terms", "")
            .append_pair("ad_reached_countries", &countries)
            .append_pair("fields", ARCHIVE_FIELDS)
            .append_pair("limit", &PAGE_SIZE.to_string());
        url
    }

    /// Fetches and decodes one search page.
    ///
    /// `url` is either [`Self::first_page_url`] or a continuation returned by
    /// [`crate::next_page_url`]. No retry is attempted.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::Http`] on network failure or timeout.
    /// - [`ArchiveError::Api`] if the body is the archive's error envelope.
    /// - [`ArchiveError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`ArchiveError::Deserialize`] if a 2xx body is not a search page.
    pub async fn fetch_page(&self, url: &Url) -> Result<ArchivePage, ArchiveError> {
        let endpoint = strip_query(url.as_str()).to_owned();
        tracing::debug!(%endpoint, "requesting archive page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ArchiveError::Http(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ArchiveError::Http(e.without_url()))?;

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            tracing::warn!(
                status = status.as_u16(),
                code = ?envelope.error.code,
                "archive returned an error envelope"
            );
            return Err(ArchiveError::Api {
                code: envelope.error.code,
                message: envelope
                    .error
                    .message
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        if !status.is_success() {
            return Err(ArchiveError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint,
            });
        }

        serde_json::from_str::<ArchivePage>(&body).map_err(|e| ArchiveError::Deserialize {
            context: format!("archive page from {endpoint}"),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
