//! Article link discovery on listing pages.
//!
//! A listing page (homepage or category index) is scanned with a cascade of
//! container selectors, most structured first, and then with every anchor on
//! the page as a last resort. Only URLs on the target domain whose path ends
//! in `-<digits>.html` are kept. A category that comes up short falls back to
//! its second page.

use crate::config::Settings;
use crate::error::ScrapeResult;
use crate::fetch::Fetcher;
use crate::scrapers::selectors::SelectorCascade;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

static ARTICLE_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"-\d+\.html$").expect("static regex"));

static CONTAINERS: Lazy<SelectorCascade> = Lazy::new(|| {
    SelectorCascade::text(&[
        "article.item-news",
        ".item-news",
        ".title-news",
        ".item-news-common",
        ".box-category-item",
        ".list-news-subfolder .item-news",
    ])
    .expect("static selector list")
});

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// Whether `url` is an article page on `domain` (or one of its subdomains).
pub fn is_valid_article_url(url: &str, domain: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let on_domain = parsed
        .host_str()
        .is_some_and(|host| host == domain || host.strip_suffix(domain).is_some_and(|sub| sub.ends_with('.')));

    matches!(parsed.scheme(), "http" | "https") && on_domain && ARTICLE_PATH.is_match(parsed.path())
}

/// Ordered, duplicate-free, bounded set of article URLs.
#[derive(Debug)]
pub struct LinkSet {
    urls: Vec<String>,
    seen: HashSet<String>,
    limit: usize,
}

impl LinkSet {
    pub fn new(limit: usize) -> Self {
        Self {
            urls: Vec::with_capacity(limit.min(128)),
            seen: HashSet::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_full(&self) -> bool {
        self.urls.len() >= self.limit
    }

    /// Add `url` unless the set is full or already holds it.
    pub fn insert(&mut self, url: String) -> bool {
        if self.is_full() || self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

/// Resolve `href` against the site origin, drop the fragment and validate.
fn candidate(href: &str, base: &Url, domain: &str) -> Option<String> {
    let mut url = base.join(href.trim()).ok()?;
    url.set_fragment(None);
    let url = String::from(url);
    if is_valid_article_url(&url, domain) {
        Some(url)
    } else {
        debug!(href, "Ignoring non-article link");
        None
    }
}

fn first_href(container: ElementRef<'_>) -> Option<&str> {
    if container.value().name() == "a" {
        if let Some(href) = container.value().attr("href") {
            return Some(href);
        }
    }
    container
        .select(&ANCHOR)
        .find_map(|anchor| anchor.value().attr("href"))
}

/// Collect article links from one listing page into `links`.
///
/// Each container selector is scanned in document order, taking the first
/// link of every container; the scan of a selector stops once `links` is
/// full. If containers do not fill the set, every anchor on the page is tried.
pub fn harvest(html: &str, base: &Url, domain: &str, links: &mut LinkSet) {
    let document = Html::parse_document(html);

    for group in CONTAINERS.groups(&document) {
        for container in group {
            if links.is_full() {
                return;
            }
            if let Some(url) = first_href(container).and_then(|href| candidate(href, base, domain)) {
                links.insert(url);
            }
        }
    }

    for anchor in document.select(&ANCHOR) {
        if links.is_full() {
            return;
        }
        if let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| candidate(href, base, domain))
        {
            links.insert(url);
        }
    }
}

async fn harvest_page<F: Fetcher>(
    fetcher: &F,
    settings: &Settings,
    listing_url: &str,
    domain: &str,
    links: &mut LinkSet,
) -> ScrapeResult<usize> {
    let html = fetcher.fetch(listing_url, settings.listing_timeout()).await?;
    let before = links.len();
    harvest(&html, &settings.base_url, domain, links);
    Ok(links.len() - before)
}

/// Discover up to `limit` article URLs for `category` (or the homepage).
///
/// Never fails: a listing that cannot be fetched contributes nothing and the
/// links gathered so far are returned.
#[instrument(level = "info", skip(fetcher, settings))]
pub async fn discover<F: Fetcher>(
    fetcher: &F,
    settings: &Settings,
    category: Option<&str>,
    limit: usize,
) -> Vec<String> {
    let mut links = LinkSet::new(limit);
    let Some(domain) = settings.domain() else {
        warn!(base_url = %settings.base_url, "Base URL has no host; nothing to discover");
        return Vec::new();
    };
    if limit == 0 {
        return Vec::new();
    }

    let known = category.filter(|slug| settings.categories.contains(slug));
    if category.is_some() && known.is_none() {
        warn!(?category, "Unknown category; falling back to the homepage");
    }

    let Some(first_page) = settings.listing_url(known, 1) else {
        return Vec::new();
    };
    match harvest_page(fetcher, settings, &first_page, domain, &mut links).await {
        Ok(added) => info!(url = %first_page, added, "Harvested listing page"),
        Err(e) => warn!(url = %first_page, error = %e, "Listing fetch failed"),
    }

    if known.is_some() && !links.is_full() {
        if let Some(next_page) = settings.listing_url(known, 2) {
            info!(found = links.len(), limit, url = %next_page, "Short of limit; trying next page");
            match harvest_page(fetcher, settings, &next_page, domain, &mut links).await {
                Ok(added) => info!(url = %next_page, added, "Harvested listing page"),
                Err(e) => warn!(url = %next_page, error = %e, "Listing fetch failed"),
            }
        }
    }

    info!(count = links.len(), limit, "Discovered article links");
    links.into_vec()
}
