//! VnExpress scraping pipeline.
//!
//! A crawl runs in two phases, like every news source scraper:
//!
//! 1. **Discovery** ([`links`]): read a listing page and collect article URLs
//! 2. **Fetching** ([`article`]): download each URL and parse it into an
//!    [`ArticleRecord`](crate::models::ArticleRecord)
//!
//! [`crawl::Crawler`] drives both phases. Field parsing is split into
//! [`selectors`] (ordered selector fallbacks), [`fields`] (one extractor per
//! article field) and [`dates`] (Vietnamese date strings).
//!
//! Failures never abort a crawl: a listing that cannot be fetched yields no
//! links, an article that cannot be fetched is logged and skipped.

pub mod article;
pub mod crawl;
pub mod dates;
pub mod fields;
pub mod links;
pub mod selectors;
