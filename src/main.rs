//! # VnExpress Scraper
//!
//! Discovers news articles on [VnExpress](https://vnexpress.net) and extracts
//! them into structured records: title, body, summary, author, category,
//! publish date, lead image and tags.
//!
//! ## Usage
//!
//! ```sh
//! vnexpress_scraper scrape -c the-thao -l 20 -o ./out/the-thao.json
//! vnexpress_scraper categories
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: read the category listing (and its second page when
//!    short) and collect valid, unique article URLs
//! 2. **Fetching**: download each article in order, parse every field through
//!    ordered selector fallbacks, pause politely between requests
//! 3. **Output**: write the batch as JSON or print a summary
//!
//! Storage, deduplication across runs and scheduling are left to whoever
//! consumes the JSON.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::{Cli, Command};
use config::Settings;
use fetch::HttpFetcher;
use outputs::json;
use scrapers::crawl::Crawler;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = match Settings::load(args.config.as_deref()).await {
        Ok(settings) => settings,
        Err(e) => {
            error!(config = ?args.config, error = %e, "Failed to load settings");
            return Err(e.into());
        }
    };

    info!(
        base_url = %settings.base_url,
        categories = settings.categories.len(),
        "Settings loaded"
    );

    match args.command {
        Command::Categories => {
            println!("Available categories:");
            println!("{}", "-".repeat(30));
            for category in settings.categories.iter() {
                println!("{:15} - {}", category.slug, category.name);
            }
            Ok(())
        }
        Command::Scrape {
            category,
            limit,
            output,
            timeout_secs,
        } => scrape(settings, category, limit as usize, output, timeout_secs).await,
    }
}

async fn scrape(
    settings: Settings,
    category: Option<String>,
    limit: usize,
    output: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!(category = category.as_deref().unwrap_or("all"), limit, "Starting scrape");

    // Fail on an unwritable output path before spending time on the crawl.
    if let Some(parent) = output
        .as_deref()
        .and_then(|p| std::path::Path::new(p).parent())
        .and_then(|p| p.to_str())
        .filter(|p| !p.is_empty())
    {
        if let Err(e) = utils::ensure_writable_dir(parent).await {
            error!(path = %parent, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing with the articles collected so far");
            on_ctrl_c.cancel();
        }
    });

    let fetcher = HttpFetcher::new(&settings.user_agent)?;
    let mut crawler = Crawler::new(fetcher, settings).with_cancellation(cancel);
    if let Some(secs) = timeout_secs {
        crawler = crawler.with_deadline(Duration::from_secs(secs));
    }
    debug!(base_url = %crawler.settings().base_url, "Crawler ready");

    let report = crawler.run(category.as_deref(), limit).await;

    match output {
        Some(path) => {
            if let Err(e) = json::write_articles(&report.articles, &path).await {
                error!(%path, error = %e, "Failed to write JSON export");
                return Err(e);
            }
            println!("Saved {} articles to {}", report.articles.len(), path);
        }
        None => {
            for article in &report.articles {
                let date = article
                    .published_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("[{}] {} | {} | {}", article.category, date, article.title, article.url);
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        requested = report.requested,
        discovered = report.discovered,
        scraped = report.articles.len(),
        skipped = report.skipped(),
        cancelled = report.cancelled,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    println!("Scraped {} articles", report.articles.len());

    Ok(())
}
