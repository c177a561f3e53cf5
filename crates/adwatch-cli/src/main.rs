mod analyze;
mod favorites;
mod fetch;
mod query;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use favorites::FavoritesCommands;
use fetch::FetchArgs;

#[derive(Debug, Parser)]
#[command(name = "adwatch")]
#[command(about = "Track long-running infoproduct ads in the public ads archive")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch active ads, store the ones that pass the filters, and print them
    Fetch(FetchArgs),
    /// List every page name in the store
    Pages,
    /// Show the stored days-active history of a page
    History {
        /// Page name, matched exactly
        page_name: String,
    },
    /// Show one stored ad
    Show {
        /// Ad id
        ad_id: String,
    },
    /// Manage ads saved for follow-up
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommands,
    },
    /// Check ad copy for infoproduct keywords and a call to action
    Analyze {
        /// The copy to analyze
        text: String,
        /// Call-to-action text to look for
        #[arg(long)]
        cta: Option<String>,
    },
    /// Database management
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database is reachable
    Ping,
}

impl Commands {
    /// Every command except `analyze` reads the environment config and opens
    /// the store.
    fn needs_store(&self) -> bool {
        !matches!(self, Self::Analyze { .. })
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("adwatch: no command given; see `adwatch --help`");
        return Ok(());
    };

    if !command.needs_store() {
        if let Commands::Analyze { text, cta } = &command {
            analyze::run_analyze(text, cta.as_deref());
        }
        return Ok(());
    }

    let config = adwatch_core::load_app_config()?;
    init_tracing(&config.log_level);

    let pool_config = adwatch_db::PoolConfig::from_app_config(&config);
    let pool = adwatch_db::connect_pool(&config.database_url, pool_config).await?;

    if let Commands::Db {
        command: DbCommands::Migrate,
    } = &command
    {
        let applied = adwatch_db::run_migrations(&pool).await?;
        println!("applied {applied} migrations");
        return Ok(());
    }

    adwatch_db::run_migrations(&pool).await?;

    match command {
        Commands::Fetch(args) => fetch::run_fetch(&pool, &config, args).await?,
        Commands::Pages => query::run_pages(&pool).await?,
        Commands::History { page_name } => query::run_history(&pool, &page_name).await?,
        Commands::Show { ad_id } => query::run_show(&pool, &ad_id).await?,
        Commands::Favorites { command } => match command {
            FavoritesCommands::Add { ad_id } => {
                favorites::run_favorites_add(&pool, &ad_id).await?;
            }
            FavoritesCommands::List => favorites::run_favorites_list(&pool).await?,
        },
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            adwatch_db::ping(&pool).await?;
            println!("database reachable");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        }
        | Commands::Analyze { .. } => {}
    }

    pool.close().await;
    Ok(())
}
