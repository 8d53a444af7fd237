//! Crawl orchestration: discover links, then fetch each article in turn.
//!
//! Fetches are strictly sequential so the per-article politeness delay
//! actually bounds the request rate against the origin. A crawl can be stopped
//! early through a [`CancellationToken`] or an overall deadline; whatever was
//! collected up to that point is returned.

use crate::config::Settings;
use crate::fetch::Fetcher;
use crate::models::CrawlReport;
use crate::scrapers::article::fetch_article;
use crate::scrapers::links::discover;
use crate::utils::until_cancelled;
use futures::stream::{self, StreamExt};
use std::future::ready;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Runs discovery and article fetching for one category request.
#[derive(Debug)]
pub struct Crawler<F> {
    fetcher: F,
    settings: Settings,
    cancel: CancellationToken,
    deadline: Option<Duration>,
}

impl<F: Fetcher> Crawler<F> {
    /// Crawler with no deadline and a token nobody else holds.
    pub fn new(fetcher: F, settings: Settings) -> Self {
        Self {
            fetcher,
            settings,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Stop the crawl when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Stop the crawl once `limit` has elapsed since [`run`](Self::run) started.
    pub fn with_deadline(mut self, limit: Duration) -> Self {
        self.deadline = Some(limit);
        self
    }

    /// Settings the crawl runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Crawl up to `limit` articles from `category` (homepage when `None`).
    ///
    /// Failed candidates are dropped, so the batch may be smaller than
    /// `limit`; the report carries the discovered count so callers can tell a
    /// short listing from failed fetches. Nothing is retried.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, category: Option<&str>, limit: usize) -> CrawlReport {
        let t0 = Instant::now();
        let stop = self.cancel.child_token();
        let timer = self.deadline.map(|budget| {
            let stop = stop.clone();
            tokio::spawn(async move {
                sleep_until(t0 + budget).await;
                info!(?budget, "Crawl deadline reached");
                stop.cancel();
            })
        });

        let report = self.collect(&stop, category, limit).await;
        if let Some(timer) = timer {
            timer.abort();
        }

        info!(
            discovered = report.discovered,
            scraped = report.articles.len(),
            skipped = report.skipped(),
            cancelled = report.cancelled,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Crawl finished"
        );
        report
    }

    async fn collect(&self, stop: &CancellationToken, category: Option<&str>, limit: usize) -> CrawlReport {
        let mut report = CrawlReport {
            category: category.map(str::to_string),
            requested: limit,
            ..CrawlReport::default()
        };

        let discovered = until_cancelled(stop, discover(&self.fetcher, &self.settings, category, limit)).await;
        let Some(urls) = discovered else {
            warn!("Crawl stopped during discovery");
            report.cancelled = true;
            return report;
        };
        report.discovered = urls.len();
        if report.is_short() {
            info!(discovered = urls.len(), requested = limit, "Fewer links than requested");
        }

        let total = urls.len();
        report.articles = stream::iter(urls.iter().enumerate())
            .take_while(|(i, _)| {
                let stopped = stop.is_cancelled();
                if stopped {
                    warn!(index = i + 1, total, "Crawl stopped; abandoning remaining candidates");
                }
                ready(!stopped)
            })
            .then(|(i, url)| async move {
                debug!(index = i + 1, total, %url, "Fetching article");
                fetch_article(&self.fetcher, &self.settings, url, stop).await
            })
            .filter_map(ready)
            .collect()
            .await;
        report.cancelled = stop.is_cancelled();
        report
    }
}
