//! Classification of archive items into [`AdRecord`]s.
//!
//! Predicates run in a fixed order and stop at the first failure: start time,
//! longevity, infoproduct keywords, call-to-action text. Impressions and spend
//! never reject an item; unreadable values fall back to `0` and `"N/A"`.

use adwatch_core::{matches_cta, matches_infoproduct, AdRecord, FilterConfig};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::types::RawAd;

const SECONDS_PER_DAY: i64 = 86_400;

/// Outcome of classifying one archive item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted(AdRecord),
    Rejected(Rejection),
}

/// Why an item was left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The item is not an object with a string `id`.
    Malformed(String),
    MissingStartTime,
    InvalidStartTime(String),
    TooRecent { days_active: i64, min_days: i64 },
    NotInfoproduct,
    MissingCta,
}

impl Rejection {
    /// Undecodable items and start-time failures are reported to the
    /// operator; the rest are ordinary filtering.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::Malformed(_) | Self::MissingStartTime | Self::InvalidStartTime(_)
        )
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(reason) => write!(f, "malformed item: {reason}"),
            Self::MissingStartTime => f.write_str("missing delivery start time"),
            Self::InvalidStartTime(raw) => write!(f, "unparsable delivery start time \"{raw}\""),
            Self::TooRecent {
                days_active,
                min_days,
            } => write!(f, "active {days_active} days, below minimum of {min_days}"),
            Self::NotInfoproduct => f.write_str("no infoproduct keyword in creative text"),
            Self::MissingCta => f.write_str("call-to-action text not found"),
        }
    }
}

/// Decodes a raw page item and classifies it.
#[must_use]
pub fn classify_item(
    item: &serde_json::Value,
    config: &FilterConfig,
    now: DateTime<Utc>,
) -> Classification {
    match serde_json::from_value::<RawAd>(item.clone()) {
        Ok(raw) => classify(&raw, config, now),
        Err(e) => Classification::Rejected(Rejection::Malformed(e.to_string())),
    }
}

/// Classifies one decoded item against `config` as observed at `now`.
#[must_use]
pub fn classify(raw: &RawAd, config: &FilterConfig, now: DateTime<Utc>) -> Classification {
    let Some(start_raw) = raw
        .ad_delivery_start_time
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return Classification::Rejected(Rejection::MissingStartTime);
    };
    let Some(start_time) = parse_start_time(start_raw) else {
        return Classification::Rejected(Rejection::InvalidStartTime(start_raw.to_string()));
    };

    let days_active = whole_days_between(start_time, now);
    if days_active < config.min_days {
        return Classification::Rejected(Rejection::TooRecent {
            days_active,
            min_days: config.min_days,
        });
    }

    let body_text = raw
        .ad_creative_bodies
        .as_deref()
        .unwrap_or_default()
        .join(" ");

    if !matches_infoproduct(&body_text, config) {
        return Classification::Rejected(Rejection::NotInfoproduct);
    }
    if !matches_cta(&body_text, &config.cta_filter) {
        return Classification::Rejected(Rejection::MissingCta);
    }

    let impressions = parse_lower_bound(raw.impressions.as_ref());
    let spend = lower_bound_text(raw.spend.as_ref()).unwrap_or_else(|| "N/A".to_string());

    Classification::Accepted(AdRecord {
        id: raw.id.clone(),
        page_name: raw.page_name.clone().unwrap_or_default(),
        body_text,
        snapshot_url: raw.ad_snapshot_url.clone().unwrap_or_default(),
        start_time,
        days_active,
        impressions,
        spend,
        is_winner: impressions >= config.winner_threshold,
        fetch_date: now.date_naive(),
    })
}

/// Parses the upstream delivery start time.
///
/// Accepts RFC 3339, the archive's `2024-03-01T08:00:00+0000` form, naive
/// date-times (taken as UTC), and bare `YYYY-MM-DD` dates (midnight UTC).
#[must_use]
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whole days from `start` to `now`, rounded toward negative infinity.
#[must_use]
pub fn whole_days_between(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Lower bound of an upstream range as a count, with thousands separators
/// stripped. Absent, negative, or unparsable values yield `0`.
#[must_use]
pub fn parse_lower_bound(range: Option<&serde_json::Value>) -> u64 {
    lower_bound_text(range)
        .map(|text| {
            text.chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect::<String>()
        })
        .and_then(|digits| digits.parse::<u64>().ok())
        .unwrap_or(0)
}

fn lower_bound_text(range: Option<&serde_json::Value>) -> Option<String> {
    match range?.get("lower_bound")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
