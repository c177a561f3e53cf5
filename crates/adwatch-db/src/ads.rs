//! Database operations for `ad_records`, the keyed store of classified ads.

use adwatch_core::{AdRecord, HistoryPoint};
use chrono::{NaiveDate, SecondsFormat};
use sqlx::SqlitePool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `ad_records` table.
///
/// `impressions` is stored as stringified integer text; use
/// [`AdRow::impressions_count`] to read it as a number.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AdRow {
    pub id: String,
    pub page_name: String,
    pub body_text: String,
    pub snapshot_url: String,
    /// RFC 3339, UTC.
    pub start_time: String,
    pub days_active: i64,
    pub impressions: String,
    pub spend: String,
    pub fetch_date: NaiveDate,
}

impl AdRow {
    #[must_use]
    pub fn impressions_count(&self) -> u64 {
        self.impressions.parse().unwrap_or(0)
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    fetch_date: NaiveDate,
    days_active: i64,
}

// ---------------------------------------------------------------------------
// ad_records operations
// ---------------------------------------------------------------------------

/// Writes `record` keyed by its `id`, replacing any existing row for that id.
///
/// The stored `fetch_date` is the record's own, so re-upserting the same
/// record leaves the row unchanged.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_ad(pool: &SqlitePool, record: &AdRecord) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO ad_records \
             (id, page_name, body_text, snapshot_url, start_time, \
              days_active, impressions, spend, fetch_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
         ON CONFLICT (id) DO UPDATE SET \
             page_name    = excluded.page_name, \
             body_text    = excluded.body_text, \
             snapshot_url = excluded.snapshot_url, \
             start_time   = excluded.start_time, \
             days_active  = excluded.days_active, \
             impressions  = excluded.impressions, \
             spend        = excluded.spend, \
             fetch_date   = excluded.fetch_date",
    )
    .bind(&record.id)
    .bind(&record.page_name)
    .bind(&record.body_text)
    .bind(&record.snapshot_url)
    .bind(record.start_time.to_rfc3339_opts(SecondsFormat::Secs, true))
    .bind(record.days_active)
    .bind(record.impressions.to_string())
    .bind(&record.spend)
    .bind(record.fetch_date)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches the stored row for one ad id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_ad(pool: &SqlitePool, id: &str) -> Result<Option<AdRow>, DbError> {
    let row = sqlx::query_as::<_, AdRow>(
        "SELECT id, page_name, body_text, snapshot_url, start_time, \
                days_active, impressions, spend, fetch_date \
         FROM ad_records WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Lists every page name present in the store, alphabetically.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_distinct_pages(pool: &SqlitePool) -> Result<Vec<String>, DbError> {
    let pages = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT page_name FROM ad_records ORDER BY page_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(pages)
}

/// Returns the `(fetch_date, days_active)` observations stored for
/// `page_name`, ordered by `fetch_date` ascending (ad id breaks ties).
///
/// An unknown page yields an empty vector, not an error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_page_history(
    pool: &SqlitePool,
    page_name: &str,
) -> Result<Vec<HistoryPoint>, DbError> {
    let rows = sqlx::query_as::<_, HistoryRow>(
        "SELECT fetch_date, days_active FROM ad_records \
         WHERE page_name = ?1 \
         ORDER BY fetch_date ASC, id ASC",
    )
    .bind(page_name)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| HistoryPoint {
            fetch_date: r.fetch_date,
            days_active: r.days_active,
        })
        .collect())
}
