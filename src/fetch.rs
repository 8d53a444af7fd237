//! The page-fetch capability.
//!
//! The pipeline only needs "GET this URL within this deadline and give me the
//! HTML". [`Fetcher`] captures that so discovery and article parsing can run
//! against the real site ([`HttpFetcher`]) or an in-memory stub in tests.

use crate::error::{ScrapeError, ScrapeResult};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Fetch a page's HTML within a deadline.
///
/// Implementations must treat a timeout like any other failure and return an
/// error rather than blocking past `timeout`.
pub trait Fetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> ScrapeResult<String>;
}

/// [`Fetcher`] backed by a shared `reqwest` client with a browser-like User-Agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client that sends `user_agent` with every request.
    pub fn new(user_agent: &str) -> ScrapeResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ScrapeError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self), fields(timeout_secs = timeout.as_secs()))]
    async fn fetch(&self, url: &str, timeout: Duration) -> ScrapeResult<String> {
        let secs = timeout.as_secs();
        let t0 = Instant::now();

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ScrapeError::from_reqwest(url, secs, e));

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "GET failed");
                return Err(e);
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, secs, e))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "GET succeeded"
        );
        Ok(body)
    }
}
