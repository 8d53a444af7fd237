//! Data models produced by the scraper.
//!
//! - [`ArticleRecord`]: one parsed article page
//! - [`CrawlReport`]: the batch produced by one crawl, plus bookkeeping
//!
//! Records are immutable once built. Deduplication, upserts and soft deletes
//! belong to whatever store consumes them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A structured article extracted from a single page.
///
/// `url` is the identity key. Every other field is best effort: missing
/// markup yields an empty string, an empty list or `None`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Absolute URL of the article page.
    pub url: String,
    pub title: String,
    /// Body text, one paragraph per line.
    pub content: String,
    /// Lead paragraph shown under the headline.
    pub summary: String,
    pub author: String,
    /// Display name of the section, `"Khác"` when unknown.
    pub category: String,
    /// Calendar date as printed on the page; no time or zone.
    pub published_date: Option<NaiveDate>,
    /// Absolute URL of the lead image, empty if none.
    pub image_url: String,
    /// Tag labels in page order, without duplicates.
    pub tags: Vec<String>,
}

/// Outcome of one crawl.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    /// Slug that was requested, if any.
    pub category: Option<String>,
    /// Number of articles asked for.
    pub requested: usize,
    /// Number of candidate URLs found by discovery.
    pub discovered: usize,
    /// Successfully parsed articles, in discovery order.
    pub articles: Vec<ArticleRecord>,
    /// True if the crawl stopped early because of cancellation or its deadline.
    pub cancelled: bool,
}

impl CrawlReport {
    /// Candidates that were discovered but did not turn into a record.
    pub fn skipped(&self) -> usize {
        self.discovered.saturating_sub(self.articles.len())
    }

    /// Whether discovery found fewer links than requested.
    pub fn is_short(&self) -> bool {
        self.discovered < self.requested
    }
}
