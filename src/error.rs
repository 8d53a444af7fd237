//! Error taxonomy for the scraping pipeline.
//!
//! Nothing in the crawl itself is fatal: transport and parse failures are
//! caught where they happen and turned into an empty listing or a skipped
//! article. The variants exist so those call sites can log *what* went wrong,
//! and so configuration/output problems can bubble up to `main`.

use thiserror::Error;

/// Everything that can go wrong while fetching, parsing or configuring.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Connection failure, TLS error, body decode error or client-side timeout.
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The origin answered with a non-2xx status.
    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request did not complete within its deadline.
    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// URL is malformed or not an article on the target site.
    #[error("invalid article url: {0}")]
    InvalidUrl(String),

    /// A CSS selector failed to parse.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    /// Settings file could not be read or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Wrap a reqwest error, folding its timeout flavour into [`ScrapeError::Timeout`].
    pub fn from_reqwest(url: &str, secs: u64, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_string(),
                secs,
            }
        } else if let Some(status) = source.status() {
            ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            ScrapeError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }

    /// Whether this failure came from talking to the origin (as opposed to local config/IO).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScrapeError::Transport { .. } | ScrapeError::Status { .. } | ScrapeError::Timeout { .. }
        )
    }
}

/// Convenience alias used across the crate.
pub type ScrapeResult<T> = Result<T, ScrapeError>;
