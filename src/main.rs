//! Smolder command-line entry point
//!
//! A thin operational front over the engine: one-off scrapes and crawls
//! against the same orchestrator the service embeds.

use anyhow::Context;
use clap::{Parser, Subcommand};
use smolder::auth::{Account, InMemoryAuthService};
use smolder::config::{load_config_with_hash, ServiceConfig};
use smolder::crawler::{CrawlerOptions, ScrapeOptions, SearchOptions};
use smolder::{HttpFetcher, JobStatus, Orchestrator, PREVIEW_TOKEN};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Smolder: a web scrape-and-crawl engine
#[derive(Parser, Debug)]
#[command(name = "smolder")]
#[command(about = "Scrape or crawl the web, extracting markdown and metadata", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// API key presented to the engine (defaults to the preview tier)
    #[arg(long)]
    api_key: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a single page and print its extracted result
    Scrape {
        url: String,

        /// Wait bound in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Crawl from a root URL and print results when the job settles
    Crawl {
        url: String,

        /// Maximum pages to fetch
        #[arg(long)]
        limit: Option<usize>,

        /// Job deadline in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Run a search query and print the fetched result pages
    Search {
        query: String,

        /// Maximum result pages to fetch
        #[arg(long)]
        limit: Option<usize>,

        /// Aggregation bound in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            tracing::info!("configuration loaded (hash: {})", hash);
            config
        }
        None => ServiceConfig::default(),
    };

    let engine = build_engine(&config)?;
    let credential = cli.api_key.as_deref().unwrap_or(PREVIEW_TOKEN);

    match cli.command {
        Command::Scrape { url, timeout_ms } => {
            let options = ScrapeOptions { timeout_ms };
            let page = engine.scrape(Some(credential), &url, &options).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Command::Crawl {
            url,
            limit,
            timeout_ms,
        } => {
            let options = CrawlerOptions {
                limit,
                timeout_ms,
                ..Default::default()
            };
            // The CLI drives its own crawl, so preview capability suffices.
            let id = engine
                .create_preview_crawl(Some(credential), &url, &options)
                .await?;
            tracing::info!(job_id = %id, "crawl started");

            let view = loop {
                let view = engine.job_status(Some(credential), &id.to_string()).await?;
                if view.status != JobStatus::Active {
                    break view;
                }
                tokio::time::sleep(Duration::from_millis(250)).await;
            };

            tracing::info!(status = %view.status, pages = view.pages.len(), "crawl settled");
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Search {
            query,
            limit,
            timeout_ms,
        } => {
            let options = SearchOptions { limit, timeout_ms };
            // Without a configured provider the engine reports the gap
            // itself; the CLI just surfaces it.
            let pages = engine.search(Some(credential), &query, &options).await?;
            println!("{}", serde_json::to_string_pretty(&pages)?);
        }
    }

    Ok(())
}

fn build_engine(config: &ServiceConfig) -> anyhow::Result<Orchestrator> {
    let mut auth = InMemoryAuthService::new();
    for entry in &config.auth.keys {
        auth.insert_hashed(
            entry.key_hash.clone(),
            Account {
                tier: entry.tier.clone(),
                credits: entry.credits,
            },
        );
    }

    let fetcher = HttpFetcher::new(
        &config.user_agent,
        Duration::from_millis(config.crawler.fetch_timeout_ms),
    )
    .context("building HTTP client")?;

    Ok(Orchestrator::new(
        config.clone(),
        Arc::new(auth),
        Arc::new(fetcher),
    ))
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("smolder=info,warn"),
            1 => EnvFilter::new("smolder=debug,info"),
            2 => EnvFilter::new("smolder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
