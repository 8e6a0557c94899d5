//! Finsight CLI binary.
//!
//! Provides the command-line interface for the Finsight screener.

mod logging;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use finsight::data::{EodhdClient, ResponseCache, SqliteCache};
use finsight::screener::sort::{self, DEFAULT_SORT};
use finsight::screener::{FilterCondition, Preset, ScreeningEngine, Store, parse_filters};
use finsight::{Config, RefreshSchedule, Refresher, Universe, Watchlist};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Finsight: screen equities by fundamentals and valuation", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the screening database
    Init {
        /// Load the demonstration data set
        #[arg(long)]
        sample: bool,

        /// Drop existing tables first
        #[arg(long)]
        force: bool,
    },

    /// Run a screen and print one page of results as JSON
    Screen {
        /// Conditions as `[[field, operator, value], ...]`
        #[arg(long, default_value = "")]
        filters: String,

        /// Named screen, combined with --filters
        #[arg(long)]
        preset: Option<String>,

        /// Sort key `<field>.<asc|desc>` over pe_ratio, roe, close,
        /// dividend_yield, margin_of_safety or ticker
        #[arg(long, default_value = DEFAULT_SORT)]
        sort: String,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,

        /// Page size
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Refresh prices and fundamentals from the provider
    Refresh {
        /// Refresh only these tickers (repeatable)
        #[arg(long = "ticker")]
        tickers: Vec<String>,

        /// Run even on days the market is closed
        #[arg(long)]
        force: bool,

        /// Evaluation date, defaults to today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging);

    match cli.command {
        Commands::Init { sample, force } => init_database(&config, sample, force)?,
        Commands::Screen {
            filters,
            preset,
            sort,
            page,
            limit,
        } => screen(&config, &filters, preset.as_deref(), &sort, page, limit)?,
        Commands::Refresh {
            tickers,
            force,
            date,
        } => refresh(&config, &tickers, force, date).await?,
    }

    Ok(())
}

fn open_store(path: &Path) -> Result<Store, Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Store::open(path)?;
    store.migrate()?;
    Ok(store)
}

fn init_database(
    config: &Config,
    sample: bool,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&config.database_path)?;
    if force {
        store.reset()?;
        store.migrate()?;
    }

    println!("Database: {}", config.database_path.display());

    if sample {
        if store.insert_sample_data()? {
            println!("Loaded sample data");
        } else {
            println!("Sample data skipped: fundamentals table is not empty");
        }
    }

    println!("Tickers with fundamentals: {}", store.fundamentals_count()?);
    Ok(())
}

fn screen(
    config: &Config,
    filters: &str,
    preset: Option<&str>,
    sort: &str,
    page: u32,
    limit: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut conditions: Vec<FilterCondition> = match preset {
        Some(name) => name.parse::<Preset>()?.conditions(),
        None => Vec::new(),
    };
    conditions.extend(parse_filters(filters)?);

    if !sort.is_empty() && !sort::is_whitelisted(sort) {
        let accepted: Vec<&str> = sort::keys().collect();
        warn!(
            sort,
            accepted = %accepted.join(", "),
            "unknown sort key, falling back to the default"
        );
    }

    let store = open_store(&config.database_path)?;
    let engine = ScreeningEngine::new(Arc::new(store), config.screener);
    let page = engine.screen_page(page, limit, conditions, sort)?;

    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

async fn refresh(
    config: &Config,
    tickers: &[String],
    force: bool,
    date: Option<NaiveDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.provider.api_token.is_empty() {
        return Err(format!("{} is not set", finsight::config::ENV_API_TOKEN).into());
    }

    let universe = if tickers.is_empty() {
        config.universe.watchlist()
    } else {
        Watchlist::new(tickers, &config.universe.exchange)
    };
    if universe.is_empty() {
        println!("No tickers to refresh");
        return Ok(());
    }

    if let Some(parent) = config.cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let cache = Arc::new(SqliteCache::new(&config.cache_path)?);
    let client = EodhdClient::new(&config.provider)?
        .with_cache(Arc::clone(&cache) as Arc<dyn ResponseCache>);

    let store = Arc::new(open_store(&config.database_path)?);
    let refresher = Refresher::new(Arc::new(client), store, config.valuation, config.refresh);

    let as_of = date.unwrap_or_else(|| Utc::now().date_naive());
    if !force && !RefreshSchedule::default().should_refresh(as_of) {
        println!("{as_of} is not a trading day; nothing refreshed (use --force to override)");
        return Ok(());
    }

    let pb = ProgressBar::new(universe.size() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );

    let report = refresher
        .run_with_progress(universe.as_slice(), as_of, |ticker, result| {
            if let Err(e) = result {
                pb.println(format!("  {}: {e}", ticker.symbol()));
            }
            pb.set_message(ticker.symbol().to_string());
            pb.inc(1);
        })
        .await;
    pb.finish_with_message(format!("Refreshed {} tickers", report.updated.len()));

    match cache.purge_expired() {
        Ok(purged) => info!(purged, "purged expired cache entries"),
        Err(e) => warn!(error = %e, "cache purge failed"),
    }

    println!(
        "Updated {} of {} tickers as of {as_of}",
        report.updated.len(),
        report.attempted()
    );
    for failure in &report.failed {
        println!("  failed {}: {}", failure.ticker, failure.error);
    }

    Ok(())
}
