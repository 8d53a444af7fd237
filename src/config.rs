//! Runtime settings and the category table.
//!
//! Everything the scraper needs to know about the target site lives here:
//! base origin, request deadlines, the politeness delay bounds, the pagination
//! URL template and the ordered slug → display-name table. All fields have
//! defaults matching VnExpress, so the YAML file is optional and may override
//! any subset of them.
//!
//! ```yaml
//! base_url: https://vnexpress.net
//! listing_timeout_secs: 10
//! article_timeout_secs: 15
//! delay_min_ms: 1000
//! delay_max_ms: 3000
//! pagination_template: "{slug}-p{page}"
//! categories:
//!   - { slug: the-thao, name: Thể thao }
//! ```

use crate::error::{ScrapeError, ScrapeResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("thoi-su", "Thời sự"),
    ("goc-nhin", "Góc nhìn"),
    ("the-gioi", "Thế giới"),
    ("kinh-doanh", "Kinh doanh"),
    ("bat-dong-san", "Bất động sản"),
    ("khoa-hoc", "Khoa học"),
    ("giai-tri", "Giải trí"),
    ("the-thao", "Thể thao"),
    ("phap-luat", "Pháp luật"),
    ("giao-duc", "Giáo dục"),
    ("suc-khoe", "Sức khỏe"),
    ("doi-song", "Đời sống"),
    ("du-lich", "Du lịch"),
    ("so-hoa", "Số hóa"),
    ("xe", "Xe"),
    ("oto", "Ô tô"),
];

/// One section of the site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    /// URL path segment, e.g. `the-thao`.
    pub slug: String,
    /// Human readable name, e.g. `Thể thao`.
    pub name: String,
}

/// Ordered slug → display name mapping.
///
/// Used both to build listing URLs and to resolve a category name from an
/// article URL. Order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CategoryTable(Vec<Category>);

impl CategoryTable {
    /// The VnExpress sections.
    pub fn vnexpress() -> Self {
        Self(
            DEFAULT_CATEGORIES
                .iter()
                .map(|(slug, name)| Category {
                    slug: slug.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        )
    }

    /// Display name for `slug`, if the table knows it.
    pub fn name_of(&self, slug: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|c| c.slug == slug)
            .map(|c| c.name.as_str())
    }

    /// Whether `slug` is a known section.
    pub fn contains(&self, slug: &str) -> bool {
        self.name_of(slug).is_some()
    }

    /// Sections in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Display name of the first known slug appearing as a directory segment of `url`.
    ///
    /// Only segments followed by another segment count, so
    /// `/the-thao/foo-1.html` matches but a slug-looking article filename does not.
    pub fn resolve_from_url(&self, url: &str) -> Option<&str> {
        let parsed = Url::parse(url).ok()?;
        let segments: Vec<&str> = parsed.path_segments()?.collect();
        let dirs = segments.split_last().map(|(_, dirs)| dirs).unwrap_or(&[]);
        self.0
            .iter()
            .find(|c| dirs.iter().any(|seg| *seg == c.slug))
            .map(|c| c.name.as_str())
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::vnexpress()
    }
}

/// Scraper settings, loadable from YAML.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Origin of the site; relative links resolve against it.
    pub base_url: Url,
    /// Browser-like User-Agent sent with every request.
    pub user_agent: String,
    /// Deadline for homepage / category listing requests.
    pub listing_timeout_secs: u64,
    /// Deadline for article requests (article pages are heavier).
    pub article_timeout_secs: u64,
    /// Lower bound of the politeness delay after each article.
    pub delay_min_ms: u64,
    /// Upper bound of the politeness delay after each article.
    pub delay_max_ms: u64,
    /// Path of page N of a category, relative to `base_url`.
    /// `{slug}` and `{page}` are substituted.
    pub pagination_template: String,
    pub categories: CategoryTable,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Literal origin, always parses.
            base_url: Url::parse("https://vnexpress.net").expect("static base url"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            listing_timeout_secs: 10,
            article_timeout_secs: 15,
            delay_min_ms: 1000,
            delay_max_ms: 3000,
            pagination_template: "{slug}-p{page}".to_string(),
            categories: CategoryTable::vnexpress(),
        }
    }
}

impl Settings {
    /// Load settings from an optional YAML file, falling back to defaults.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> ScrapeResult<Self> {
        let settings = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).await?;
                info!(path, "Loaded settings file");
                Self::from_yaml(&raw)?
            }
            None => {
                debug!("No settings file given; using defaults");
                Self::default()
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parse and validate settings from a YAML document.
    pub fn from_yaml(raw: &str) -> ScrapeResult<Self> {
        let settings: Settings = serde_yaml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> ScrapeResult<()> {
        if self.domain().is_none() {
            return Err(ScrapeError::Config(format!(
                "base_url `{}` has no host",
                self.base_url
            )));
        }
        if self.delay_min_ms > self.delay_max_ms {
            return Err(ScrapeError::Config(format!(
                "delay_min_ms ({}) is greater than delay_max_ms ({})",
                self.delay_min_ms, self.delay_max_ms
            )));
        }
        if !self.pagination_template.contains("{slug}") {
            return Err(ScrapeError::Config(
                "pagination_template must contain `{slug}`".to_string(),
            ));
        }
        if self.listing_timeout_secs == 0 || self.article_timeout_secs == 0 {
            return Err(ScrapeError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Host name article URLs must belong to.
    pub fn domain(&self) -> Option<&str> {
        self.base_url.host_str()
    }

    /// URL of a listing page.
    ///
    /// Page 1 of a known category is `{base}/{slug}`, later pages follow
    /// `pagination_template`. Unknown or absent categories map to the site
    /// root and have no further pages (`None`).
    pub fn listing_url(&self, category: Option<&str>, page: u32) -> Option<String> {
        match category.filter(|slug| self.categories.contains(slug)) {
            Some(slug) if page <= 1 => self.base_url.join(slug).ok().map(String::from),
            Some(slug) => {
                let path = self
                    .pagination_template
                    .replace("{slug}", slug)
                    .replace("{page}", &page.to_string());
                self.base_url.join(&path).ok().map(String::from)
            }
            None if page <= 1 => Some(self.base_url.to_string()),
            None => None,
        }
    }

    /// Deadline for listing page requests.
    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    /// Deadline for article page requests.
    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }

    /// Politeness delay bounds as an inclusive `(min, max)` pair.
    pub fn delay_bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.delay_min_ms),
            Duration::from_millis(self.delay_max_ms),
        )
    }

    /// Variant without the politeness delay, for tests.
    #[cfg(test)]
    pub fn without_delay() -> Self {
        Self {
            delay_min_ms: 0,
            delay_max_ms: 0,
            ..Self::default()
        }
    }
}
