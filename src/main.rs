//! Link-Spider main entry point
//!
//! This is the command-line interface for the Link-Spider crawler.

use clap::Parser;
use link_spider::config::{load_config_with_hash, validate_seed, Config};
use link_spider::crawler::{
    CrawlEngine, EngineSettings, HtmlAnchorExtractor, HttpFetcher, StartMode,
};
use link_spider::output::{load_statistics, print_statistics};
use link_spider::storage::SqliteStorage;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Link-Spider: a resumable site crawler
///
/// Link-Spider crawls the pages of the websites it was seeded with, records
/// every internal link between them in SQLite and picks up where it left
/// off when started again.
#[derive(Parser, Debug)]
#[command(name = "link-spider")]
#[command(version)]
#[command(about = "A resumable site crawler that records the link graph", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed URL for a new crawl (overrides the config file)
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Number of pages to fetch in this run, 0 runs until drained
    #[arg(long, value_name = "N")]
    pages: Option<usize>,

    /// Remove the existing database and start a fresh crawl
    #[arg(long, conflicts_with = "stats")]
    fresh: bool,

    /// Skip TLS certificate and hostname validation
    #[arg(long)]
    insecure: bool,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli)?;

    if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_spider=info,warn"),
            1 => EnvFilter::new("link_spider=debug,info"),
            2 => EnvFilter::new("link_spider=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line settings on top of the config file
fn apply_overrides(config: &mut Config, cli: &Cli) -> link_spider::Result<()> {
    if let Some(seed) = &cli.seed {
        validate_seed(seed)?;
        config.crawler.seed = Some(seed.clone());
    }
    if let Some(pages) = cli.pages {
        config.crawler.max_pages = pages;
    }
    if cli.insecure {
        config.tls.accept_invalid_certs = true;
    }
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> link_spider::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> link_spider::Result<()> {
    let db_path = Path::new(&config.output.database_path);

    if fresh && db_path.exists() {
        tracing::info!("Removing previous crawl data at {}", db_path.display());
        std::fs::remove_file(db_path)?;
    }

    let storage = SqliteStorage::new(db_path)?;
    let fetcher = HttpFetcher::from_config(&config)?;
    let mut engine = CrawlEngine::new(
        storage,
        fetcher,
        HtmlAnchorExtractor,
        EngineSettings::from_config(&config.crawler),
    );

    if let StartMode::Seeded { scope: None, .. } = engine.start(config.crawler.seed.as_deref())? {
        // No scope was registered, so no page exists to fetch
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping crawl");
            trigger.cancel();
        }
    });

    match engine.run_steps(config.crawler.max_pages, &cancel).await {
        Ok(outcome) => {
            tracing::info!(
                "Crawl stopped ({:?}) after {} pages, state {}",
                outcome.stop,
                outcome.steps,
                engine.state()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e)
        }
    }
}
