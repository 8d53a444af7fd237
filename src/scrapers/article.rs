//! Single-article fetching and parsing.

use crate::config::Settings;
use crate::error::ScrapeError;
use crate::fetch::Fetcher;
use crate::models::ArticleRecord;
use crate::scrapers::fields::{
    extract_author, extract_category, extract_content, extract_image_url, extract_published_date,
    extract_summary, extract_tags, extract_title,
};
use crate::scrapers::links::is_valid_article_url;
use crate::utils::{truncate_for_log, until_cancelled};
use rand::{rng, Rng};
use scraper::Html;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Build an [`ArticleRecord`] from an article page's HTML.
pub fn parse_article(url: &str, html: &str, settings: &Settings) -> ArticleRecord {
    let document = Html::parse_document(html);
    ArticleRecord {
        url: url.to_string(),
        title: extract_title(&document),
        content: extract_content(&document),
        summary: extract_summary(&document),
        author: extract_author(&document),
        category: extract_category(url, &document, &settings.categories),
        published_date: extract_published_date(&document),
        image_url: extract_image_url(&document, &settings.base_url),
        tags: extract_tags(&document),
    }
}

/// Uniformly random delay within the configured bounds.
pub fn politeness_delay(settings: &Settings) -> Duration {
    let (min, max) = settings.delay_bounds();
    if max <= min {
        return min;
    }
    let ms = rng().random_range(min.as_millis() as u64..=max.as_millis() as u64);
    Duration::from_millis(ms)
}

/// Fetch and parse one article.
///
/// Returns `None` (after logging why) for URLs that are not articles on the
/// configured site and for pages that cannot be fetched. After a successful
/// parse, sleeps for the politeness delay so consecutive calls are spaced out.
///
/// `stop` aborts an in-flight fetch (no record) and cuts the delay short
/// (record kept).
#[instrument(level = "info", skip(fetcher, settings, stop))]
pub async fn fetch_article<F: Fetcher>(
    fetcher: &F,
    settings: &Settings,
    url: &str,
    stop: &CancellationToken,
) -> Option<ArticleRecord> {
    let Some(domain) = settings.domain() else {
        warn!(base_url = %settings.base_url, "Base URL has no host; skipping article");
        return None;
    };
    if !is_valid_article_url(url, domain) {
        warn!(error = %ScrapeError::InvalidUrl(url.to_string()), "Refusing to fetch");
        return None;
    }

    let html = match until_cancelled(stop, fetcher.fetch(url, settings.article_timeout())).await {
        Some(Ok(html)) => html,
        Some(Err(e)) => {
            warn!(error = %e, transport = e.is_transport(), "Article fetch failed; skipping");
            return None;
        }
        None => {
            info!("Stopped before the article arrived");
            return None;
        }
    };

    let article = parse_article(url, &html, settings);
    if article.title.is_empty() && article.content.is_empty() {
        warn!(bytes = html.len(), "No title or body matched; markup may have changed");
    }
    info!(
        title = %truncate_for_log(&article.title, 80),
        content_bytes = article.content.len(),
        tags = article.tags.len(),
        "Parsed article"
    );

    let delay = politeness_delay(settings);
    debug!(?delay, "Politeness delay");
    if until_cancelled(stop, sleep(delay)).await.is_none() {
        debug!("Politeness delay cut short");
    }

    Some(article)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use chrono::NaiveDate;
    use url::Url;

    fn go() -> CancellationToken {
        CancellationToken::new()
    }

    const PAGE: &str = r#"
        <html><body>
          <span class="date">Thứ hai, 15/3/2024, 08:00 (GMT+7)</span>
          <h1 class="title-detail">Tiêu đề</h1>
          <p class="description">Tóm tắt</p>
          <article class="fck_detail"><p class="Normal">Nội dung</p></article>
          <div class="tags"><a>a</a></div>
        </body></html>
    "#;

    #[test]
    fn test_parse_article_assembles_all_fields() {
        let settings = Settings::without_delay();
        let article = parse_article("https://vnexpress.net/the-thao/tieu-de-1.html", PAGE, &settings);
        assert_eq!(article.title, "Tiêu đề");
        assert_eq!(article.summary, "Tóm tắt");
        assert_eq!(article.content, "Nội dung");
        assert_eq!(article.category, "Thể thao");
        assert_eq!(article.published_date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(article.author, "");
        assert_eq!(article.image_url, "");
        assert_eq!(article.tags, vec!["a"]);
    }

    #[test]
    fn test_politeness_delay_within_bounds() {
        let settings = Settings {
            delay_min_ms: 10,
            delay_max_ms: 20,
            ..Settings::default()
        };
        for _ in 0..50 {
            let d = politeness_delay(&settings);
            assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(20));
        }
        assert_eq!(politeness_delay(&Settings::without_delay()), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_fetch_article_success() {
        let url = "https://vnexpress.net/tieu-de-1.html";
        let fetcher = StaticFetcher::new().with_page(url, PAGE);
        let article = fetch_article(&fetcher, &Settings::without_delay(), url, &go())
            .await
            .unwrap();
        assert_eq!(article.url, url);
        assert_eq!(article.title, "Tiêu đề");
    }

    #[tokio::test]
    async fn test_fetch_article_rejects_invalid_url_without_fetching() {
        let url = "https://other.com/tieu-de-1.html";
        let fetcher = StaticFetcher::new().with_page(url, PAGE);
        let settings = Settings::without_delay();

        assert!(fetch_article(&fetcher, &settings, url, &go()).await.is_none());
        assert!(fetch_article(&fetcher, &settings, "https://vnexpress.net/the-thao", &go())
            .await
            .is_none());
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_skip() {
        let fetcher = StaticFetcher::new();
        let article = fetch_article(
            &fetcher,
            &Settings::without_delay(),
            "https://vnexpress.net/mat-tich-404.html",
            &go(),
        )
        .await;
        assert!(article.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_applied_after_parse() {
        let url = "https://vnexpress.net/tieu-de-1.html";
        let fetcher = StaticFetcher::new().with_page(url, PAGE);
        let settings = Settings {
            delay_min_ms: 1000,
            delay_max_ms: 3000,
            ..Settings::default()
        };

        let t0 = tokio::time::Instant::now();
        assert!(fetch_article(&fetcher, &settings, url, &go()).await.is_some());
        let elapsed = t0.elapsed();
        assert!(elapsed >= Duration::from_millis(1000) && elapsed <= Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn test_host_less_base_url_is_skip() {
        let url = "https://vnexpress.net/tieu-de-1.html";
        let fetcher = StaticFetcher::new().with_page(url, PAGE);
        let settings = Settings {
            base_url: Url::parse("mailto:toasoan@vnexpress.net").unwrap(),
            ..Settings::without_delay()
        };

        assert!(fetch_article(&fetcher, &settings, url, &go()).await.is_none());
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_stopped_before_fetch_yields_nothing() {
        let url = "https://vnexpress.net/tieu-de-1.html";
        let fetcher = StaticFetcher::new().with_page(url, PAGE);
        let stop = CancellationToken::new();
        stop.cancel();

        assert!(fetch_article(&fetcher, &Settings::without_delay(), url, &stop).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_delay_keeps_article() {
        let url = "https://vnexpress.net/tieu-de-1.html";
        let fetcher = StaticFetcher::new().with_page(url, PAGE);
        let settings = Settings {
            delay_min_ms: 1000,
            delay_max_ms: 1000,
            ..Settings::default()
        };
        let stop = CancellationToken::new();
        let trigger = stop.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(400)).await;
            trigger.cancel();
        });

        let t0 = tokio::time::Instant::now();
        let article = fetch_article(&fetcher, &settings, url, &stop).await;

        assert_eq!(article.map(|a| a.title).as_deref(), Some("Tiêu đề"));
        let elapsed = t0.elapsed();
        assert!(elapsed >= Duration::from_millis(400) && elapsed < Duration::from_millis(1000));
    }
}
