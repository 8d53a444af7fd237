//! Command-line interface definitions.
//!
//! All options can be given as flags; the settings file path can also come
//! from the environment.

use clap::{Parser, Subcommand};

/// Command-line arguments for the VnExpress scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape 20 sports articles and export them
/// vnexpress_scraper scrape -c the-thao -l 20 -o ./out/the-thao.json
///
/// # Homepage, custom settings
/// vnexpress_scraper --config ./scraper.yaml scrape -l 5
///
/// # List the known sections
/// vnexpress_scraper categories
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a settings YAML file
    #[arg(long, global = true, env = "SCRAPER_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crawl a category (or the homepage) and extract articles
    Scrape {
        /// Category slug, e.g. `the-thao`; homepage when omitted
        #[arg(short, long)]
        category: Option<String>,

        /// Number of articles to scrape
        #[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u64).range(1..=100))]
        limit: u64,

        /// Write the batch to this JSON file instead of printing it
        #[arg(short, long)]
        output: Option<String>,

        /// Abort the crawl after this many seconds, keeping what was collected
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// List available categories
    Categories,
}
