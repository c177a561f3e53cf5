//! The `fetch` command: walk the archive, store accepted ads, print the batch.

mod pipeline;

use adwatch_core::{AdRecord, Country, FilterConfig, PageAggregate};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use pipeline::{run_fetch_pipeline, ArchiveEndpoint, FetchReport, FetchRequest};

/// Arguments of `fetch`.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Archive access token (defaults to `ADWATCH_ACCESS_TOKEN`)
    #[arg(long)]
    pub token: Option<String>,

    /// Country code the ads reached, or ALL
    #[arg(long, default_value = "ES", value_parser = Country::parse)]
    pub country: Country,

    /// Minimum whole days an ad must have been running
    #[arg(long, default_value_t = 10)]
    pub min_days: i64,

    /// Stop after this many accepted ads
    #[arg(long, default_value_t = 500)]
    pub max_results: usize,

    /// Accept ads whether or not their copy reads as an infoproduct
    #[arg(long)]
    pub no_infoproduct_filter: bool,

    /// Only accept ads whose copy contains this call to action
    #[arg(long, default_value = "")]
    pub cta: String,
}

impl FetchArgs {
    fn into_request(self, fallback_token: Option<&str>) -> FetchRequest {
        FetchRequest {
            token: self.token.or_else(|| fallback_token.map(str::to_owned)),
            country: self.country,
            filters: FilterConfig {
                min_days: self.min_days,
                filter_infoproducts: !self.no_infoproduct_filter,
                cta_filter: self.cta,
                ..FilterConfig::default()
            },
            max_results: self.max_results,
        }
    }
}

/// Run a fetch and print the accepted batch and the scaled-offer table.
///
/// Partial results are printed before a failed walk is reported.
///
/// # Errors
///
/// Returns an error if no token is available, the client cannot be built,
/// the walk was aborted, or any accepted ad could not be stored.
pub(crate) async fn run_fetch(
    pool: &sqlx::SqlitePool,
    config: &adwatch_core::AppConfig,
    args: FetchArgs,
) -> anyhow::Result<()> {
    let request = args.into_request(config.access_token.as_deref());
    let endpoint = ArchiveEndpoint::from_app_config(config);

    let bar = ProgressBar::new(u64::try_from(request.max_results).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ads ({msg})")?
            .progress_chars("=> "),
    );

    let report = run_fetch_pipeline(pool, &endpoint, &request, chrono::Utc::now(), |p| {
        bar.set_position(u64::try_from(p.accepted).unwrap_or(u64::MAX));
        bar.set_message(format!("page {}", p.pages));
    })
    .await;
    bar.finish_and_clear();
    let report = report?;

    print_ads(&report.ads);
    println!();
    print_pages(&report.pages);
    println!();
    println!(
        "{} ads accepted over {} pages; {} filtered out, {} unreadable",
        report.ads.len(),
        report.pages_fetched,
        report.rejections.filtered,
        report.rejections.unreadable
    );

    finish(report)
}

fn finish(report: FetchReport) -> anyhow::Result<()> {
    if report.is_complete() {
        return Ok(());
    }
    for (ad_id, err) in &report.store_failures {
        eprintln!("error: failed to store ad {ad_id}: {err}");
    }
    if let Some(err) = report.aborted {
        anyhow::bail!(
            "fetch stopped early after {} pages; {} ads kept: {err}",
            report.pages_fetched,
            report.ads.len()
        );
    }
    anyhow::bail!("{} ads could not be stored", report.store_failures.len())
}

fn print_ads(ads: &[AdRecord]) {
    if ads.is_empty() {
        println!("no ads matched the filters");
        return;
    }

    println!(
        "{:<20}{:<30}{:>6}{:>13}{:>12}  {:<4}SNAPSHOT",
        "ID", "PAGE", "DAYS", "IMPRESSIONS", "SPEND", "WIN"
    );
    for ad in ads {
        println!(
            "{:<20}{:<30}{:>6}{:>13}{:>12}  {:<4}{}",
            ad.id,
            truncate(&ad.page_name, 26),
            ad.days_active,
            ad.impressions,
            ad.spend,
            if ad.is_winner { "yes" } else { "" },
            ad.snapshot_url
        );
    }
}

fn print_pages(pages: &[PageAggregate]) {
    if pages.is_empty() {
        return;
    }

    println!("{:<40}{:>8}{:>15}", "PAGE", "ACTIVE", "IMPRESSIONS");
    for page in pages {
        println!(
            "{:<40}{:>8}{:>15}",
            truncate(&page.page_name, 36),
            page.active_ad_count,
            page.summed_impressions
        );
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
