//! JSON export of scraped articles.
//!
//! The file is a pretty-printed array of [`ArticleRecord`]s with non-ASCII text
//! kept as-is, ready for a store that upserts by `url`:
//!
//! ```text
//! [
//!   { "url": "https://vnexpress.net/...-4721234.html", "title": "...", ... }
//! ]
//! ```

use crate::models::ArticleRecord;
use crate::utils::ensure_writable_dir;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write `articles` to `path`, creating the parent directory if needed.
#[instrument(level = "info", skip_all, fields(%path, count = articles.len()))]
pub async fn write_articles(articles: &[ArticleRecord], path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(articles)?;

    if let Some(parent) = Path::new(path).parent().and_then(Path::to_str) {
        if !parent.is_empty() {
            ensure_writable_dir(parent).await?;
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str) -> ArticleRecord {
        ArticleRecord {
            url: url.to_string(),
            title: "Giá vàng tăng".to_string(),
            content: String::new(),
            summary: String::new(),
            author: String::new(),
            category: "Kinh doanh".to_string(),
            published_date: None,
            image_url: String::new(),
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_write_articles_creates_dirs_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/articles.json");
        let path = path.to_str().unwrap();

        let batch = vec![
            article("https://vnexpress.net/a-1.html"),
            article("https://vnexpress.net/b-2.html"),
        ];
        write_articles(&batch, path).await.unwrap();

        let raw = tokio::fs::read_to_string(path).await.unwrap();
        assert!(raw.contains("Giá vàng tăng"));
        let parsed: Vec<ArticleRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, batch);
    }

    #[tokio::test]
    async fn test_write_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        let path = path.to_str().unwrap();

        write_articles(&[], path).await.unwrap();

        let raw = tokio::fs::read_to_string(path).await.unwrap();
        assert_eq!(raw.trim(), "[]");
    }
}
