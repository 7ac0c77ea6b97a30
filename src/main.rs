//! Forager main entry point
//!
//! Command-line interface for the Forager crawler: crawls a site from a seed
//! URL and persists extracted pages into a SQLite document database.

use anyhow::Context;
use clap::Parser;
use forager::config::{load_config_with_hash, Config};
use forager::events::{self, CrawlEvent};
use forager::{Coordinator, SqliteSink};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

/// Forager: a polite web crawler feeding a knowledge base
///
/// Forager walks a site breadth-first from a seed URL, extracts clean prose
/// from each page, and stores the results as pending ingestion documents.
#[derive(Parser, Debug)]
#[command(name = "forager")]
#[command(version)]
#[command(about = "Crawl a site and extract clean page text", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of pages to process (overrides config)
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Path to the document database (overrides config)
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and show crawl parameters without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load configuration, falling back to built-in defaults
    let mut config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            tracing::info!("Configuration loaded from {} (hash: {})", path.display(), hash);
            config
        }
        None => {
            tracing::debug!("No config file given, using defaults");
            Config::default()
        }
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(database) = &cli.database {
        config.output.database_path = database.display().to_string();
    }

    if cli.dry_run {
        print_dry_run(&cli.seed, &config);
        return Ok(());
    }

    let sink = SqliteSink::new(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open database {}", config.output.database_path))?;

    let (events, rx) = events::channel();
    tokio::spawn(log_events(rx));

    let mut coordinator = Coordinator::new(config, sink, events)?;

    // Ctrl-C stops the crawl at the next loop iteration
    let cancel = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing current page");
            cancel.cancel();
        }
    });

    let results = coordinator.crawl(&cli.seed, cli.max_pages).await?;
    tracing::info!("Stored {} documents", results.len());

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("forager=info,warn"),
            1 => EnvFilter::new("forager=debug,info"),
            2 => EnvFilter::new("forager=trace,debug"),
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

/// Bridges crawl events onto the log
async fn log_events(mut rx: UnboundedReceiver<CrawlEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            CrawlEvent::Started {
                start_url,
                max_pages,
            } => tracing::info!("Crawl started at {} (up to {} pages)", start_url, max_pages),
            CrawlEvent::ProcessingPage {
                url,
                current,
                total,
                depth,
            } => tracing::info!("[{}/{}] Fetching {} (depth {})", current, total, url, depth),
            CrawlEvent::PageProcessed {
                url,
                content_length,
                new_links,
                ..
            } => tracing::info!(
                "Processed {} ({} chars, {} new links)",
                url,
                content_length,
                new_links
            ),
            CrawlEvent::PageSkipped { url, reason, .. } => {
                tracing::info!("Skipped {}: {}", url, reason)
            }
            CrawlEvent::PageError { url, error, .. } => {
                tracing::warn!("Page failed {}: {}", url, error)
            }
            CrawlEvent::DocumentAdded {
                url, document_id, ..
            } => tracing::debug!("Stored {} as document {}", url, document_id),
            CrawlEvent::DocumentError { url, error } => {
                tracing::warn!("Failed to store {}: {}", url, error)
            }
            CrawlEvent::Completed {
                pages_processed,
                base_url,
                max_depth_reached,
                ..
            } => tracing::info!(
                "Crawl of {} completed: {} pages, deepest level {}",
                base_url,
                pages_processed,
                max_depth_reached
            ),
            CrawlEvent::Failed { error } => tracing::error!("Crawl failed: {}", error),
        }
    }
}

/// Handles the --dry-run mode: validates config and shows what would run
fn print_dry_run(seed: &str, config: &Config) {
    println!("=== Forager Dry Run ===\n");

    println!("Seed URL: {}", seed);

    println!("\nCrawler:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Politeness delay: {}ms",
        config.crawler.politeness_delay_ms
    );
    println!(
        "  Retry budget: {} (backoff base {}ms)",
        config.crawler.max_retries_per_url, config.crawler.retry_backoff_ms
    );
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);

    println!("\nUser agent:");
    println!(
        "  {}/{} (+{}; {})",
        config.user_agent.crawler_name,
        config.user_agent.crawler_version,
        config.user_agent.contact_url,
        config.user_agent.contact_email
    );

    println!("\nRelays ({}):", config.proxy.endpoints.len());
    for endpoint in &config.proxy.endpoints {
        println!("  - {}", endpoint);
    }
    if config.proxy.endpoints.is_empty() {
        println!("  (none: all fetches direct)");
    }

    println!("\nExtraction:");
    println!(
        "  Min content length: {}",
        config.extraction.min_content_length
    );
    println!(
        "  Min distinct-line ratio: {}",
        config.extraction.min_distinct_line_ratio
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}
