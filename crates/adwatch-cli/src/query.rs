//! Read-only store queries: `pages`, `history`, and `show`.

use crate::fetch::truncate;

/// List every page name ever stored.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_pages(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    let pages = adwatch_db::list_distinct_pages(pool).await?;

    if pages.is_empty() {
        println!("no pages stored yet; run `fetch` first");
        return Ok(());
    }

    for page in &pages {
        println!("{page}");
    }
    Ok(())
}

/// Print the stored `(fetch_date, days_active)` history of one page, oldest
/// first.
///
/// A page with no rows prints a notice rather than failing.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_history(pool: &sqlx::SqlitePool, page_name: &str) -> anyhow::Result<()> {
    let history = adwatch_db::list_page_history(pool, page_name).await?;

    if history.is_empty() {
        println!("no historical data for page '{page_name}'");
        return Ok(());
    }

    println!("Page: {page_name}");
    println!();
    println!("{:<12}{:>12}", "FETCHED", "DAYS ACTIVE");
    for point in &history {
        println!(
            "{:<12}{:>12}",
            point.fetch_date.format("%Y-%m-%d"),
            point.days_active
        );
    }
    Ok(())
}

/// Print one stored ad.
///
/// # Errors
///
/// Returns an error if the ad is not stored or the database query fails.
pub(crate) async fn run_show(pool: &sqlx::SqlitePool, ad_id: &str) -> anyhow::Result<()> {
    let ad = adwatch_db::get_ad(pool, ad_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("ad '{ad_id}' not found; run `fetch` first"))?;

    println!("Ad:          {}", ad.id);
    println!("Page:        {}", ad.page_name);
    println!("Started:     {}", ad.start_time);
    println!("Days active: {}", ad.days_active);
    println!("Impressions: {}", ad.impressions_count());
    println!("Spend:       {}", ad.spend);
    println!("Fetched:     {}", ad.fetch_date.format("%Y-%m-%d"));
    println!("Snapshot:    {}", ad.snapshot_url);
    println!();
    println!("{}", truncate(&ad.body_text, 500));
    Ok(())
}
