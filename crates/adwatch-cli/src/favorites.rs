//! The `favorites` command: ad ids saved for follow-up.

use clap::Subcommand;

use crate::fetch::truncate;

/// Sub-commands available under `favorites`.
#[derive(Debug, Subcommand)]
pub enum FavoritesCommands {
    /// Save an ad id
    Add {
        /// Ad id to save
        ad_id: String,
    },
    /// List saved ad ids
    List,
}

/// Add `ad_id` to the saved favorites.
///
/// Ids not yet in the store are saved anyway, with a warning.
///
/// # Errors
///
/// Returns an error if the id is blank or a database operation fails.
pub(crate) async fn run_favorites_add(pool: &sqlx::SqlitePool, ad_id: &str) -> anyhow::Result<()> {
    let ad_id = ad_id.trim();
    if ad_id.is_empty() {
        anyhow::bail!("ad id must not be blank");
    }

    let favorites = adwatch_db::load_favorites(pool).await?;
    if favorites.contains(ad_id) {
        println!("ad {ad_id} is already a favorite");
        return Ok(());
    }

    if adwatch_db::get_ad(pool, ad_id).await?.is_none() {
        tracing::warn!(ad_id, "saving a favorite that is not in the store");
    }

    let favorites = favorites.with(ad_id);
    adwatch_db::save_favorites(pool, &favorites).await?;
    println!("saved ad {ad_id} ({} favorites)", favorites.len());
    Ok(())
}

/// List saved favorites with their page name when the ad is stored.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub(crate) async fn run_favorites_list(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    let favorites = adwatch_db::load_favorites(pool).await?;

    if favorites.is_empty() {
        println!("no favorites saved; use `favorites add <AD_ID>`");
        return Ok(());
    }

    println!("{:<20}{:<30}SNAPSHOT", "ID", "PAGE");
    for ad_id in favorites.ids() {
        let ad = adwatch_db::get_ad(pool, ad_id).await?;
        println!("{}", favorite_row(ad_id, ad.as_ref()));
    }
    Ok(())
}

/// One table row; ads missing from the store show `-` for page and snapshot.
fn favorite_row(ad_id: &str, ad: Option<&adwatch_db::AdRow>) -> String {
    match ad {
        Some(ad) => format!(
            "{:<20}{:<30}{}",
            ad.id,
            truncate(&ad.page_name, 26),
            ad.snapshot_url
        ),
        None => format!("{ad_id:<20}{:<30}-", "-"),
    }
}
