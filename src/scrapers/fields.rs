//! Per-field extractors for VnExpress article pages.
//!
//! Each field has its own [`SelectorCascade`] listing the template variants
//! seen on the site, newest first. Every extractor is total: a page with none
//! of the expected markup gives empty strings, an empty tag list and no date.

use crate::config::CategoryTable;
use crate::scrapers::dates::parse_vietnamese_date;
use crate::scrapers::selectors::{collapse_whitespace, element_text, Extract, SelectorCascade};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Category label when neither the URL nor the breadcrumb names a section.
pub const FALLBACK_CATEGORY: &str = "Khác";

/// Image attributes in preference order; lazy-loaded images keep the real URL in `data-src`.
const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-original"];

/// Elements whose text never belongs in the article body.
const NOISE_TAGS: &[&str] = &["script", "style", "noscript", "iframe"];
const NOISE_CLASSES: &[&str] = &["VCSortableInPreviewMode", "box_embed_video", "banner-ads"];

// Selector lists are literals; a parse failure is a programming error.
fn cascade(built: crate::error::ScrapeResult<SelectorCascade>) -> SelectorCascade {
    built.expect("static selector list")
}

static TITLE: Lazy<SelectorCascade> = Lazy::new(|| {
    cascade(SelectorCascade::text(&[
        "h1.title-detail",
        "h1.title_news_detail",
        "h1.title-news",
        "h1",
        ".title-detail",
        ".title_news_detail",
    ]))
});

static CONTENT: Lazy<SelectorCascade> = Lazy::new(|| {
    cascade(SelectorCascade::text(&[
        ".fck_detail",
        ".Normal",
        "article .content-detail",
        ".content_detail",
        ".article-content",
    ]))
});

static SUMMARY: Lazy<SelectorCascade> = Lazy::new(|| {
    cascade(SelectorCascade::text(&[
        ".description",
        ".sapo",
        ".Lead",
        "p.description",
        ".article-summary",
    ]))
});

static AUTHOR: Lazy<SelectorCascade> = Lazy::new(|| {
    cascade(
        SelectorCascade::text(&[".author", ".article-author", ".byline", ".writer"])
            .and_then(|c| c.then(r#"p.Normal[style*="text-align:right"] strong"#, Extract::Text)),
    )
});

static DATE: Lazy<SelectorCascade> = Lazy::new(|| {
    cascade(SelectorCascade::text(&[
        ".date",
        ".time",
        ".publish-time",
        ".article-date",
    ]))
});

static DATE_META: Lazy<SelectorCascade> = Lazy::new(|| {
    cascade(SelectorCascade::attr(
        &[
            r#"meta[itemprop="datePublished"]"#,
            r#"meta[name="pubdate"]"#,
            r#"meta[property="article:published_time"]"#,
        ],
        &["content"],
    ))
});

static IMAGE: Lazy<SelectorCascade> = Lazy::new(|| {
    cascade(
        SelectorCascade::attr(
            &[
                ".fig-picture img",
                ".photo img",
                "article img",
                ".content-detail img",
            ],
            IMAGE_ATTRS,
        )
        .and_then(|c| c.then(r#"meta[property="og:image"]"#, Extract::Attr(&["content"]))),
    )
});

static TAGS: Lazy<SelectorCascade> = Lazy::new(|| {
    cascade(SelectorCascade::text(&[
        ".tags a",
        ".article-tags a",
        ".tag-list a",
    ]))
});

static BREADCRUMB: Lazy<Selector> = Lazy::new(|| Selector::parse(".breadcrumb").expect("static selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("static selector"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("static selector"));

/// Headline with whitespace runs collapsed, empty if no heading matched.
pub fn extract_title(document: &Html) -> String {
    TITLE.first(document).unwrap_or_default()
}

/// Article body, one paragraph per line.
///
/// Scripts, styles and ad blocks inside the container are ignored. When the
/// container has `<p>` descendants their trimmed, non-empty texts are joined
/// with `\n`; otherwise the container's whole text is used.
pub fn extract_content(document: &Html) -> String {
    CONTENT
        .first_with(document, |_, container| {
            let body = body_text(container);
            (!body.is_empty()).then_some(body)
        })
        .unwrap_or_default()
}

/// Lead paragraph (`sapo`), empty if the page has none.
pub fn extract_summary(document: &Html) -> String {
    SUMMARY.first(document).unwrap_or_default()
}

/// Byline. Falls back to the right-aligned bold signature VnExpress puts
/// under the body.
pub fn extract_author(document: &Html) -> String {
    AUTHOR.first(document).unwrap_or_default()
}

/// Section display name.
///
/// A slug in the URL path wins over the breadcrumb, which wins over
/// [`FALLBACK_CATEGORY`].
pub fn extract_category(url: &str, document: &Html, categories: &CategoryTable) -> String {
    if let Some(name) = categories.resolve_from_url(url) {
        return name.to_string();
    }

    document
        .select(&BREADCRUMB)
        .next()
        .and_then(|crumbs| crumbs.select(&LINK).nth(1))
        .map(element_text)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

/// Publish date from the visible date line.
///
/// Page metadata is consulted only when there is no date line at all; a date
/// line that does not parse gives `None`.
pub fn extract_published_date(document: &Html) -> Option<NaiveDate> {
    let raw = DATE.first(document).or_else(|| DATE_META.first(document))?;
    parse_vietnamese_date(&raw)
}

/// Absolute URL of the lead image, empty if the page has none.
pub fn extract_image_url(document: &Html, base: &Url) -> String {
    IMAGE
        .first(document)
        .map(|src| absolutize(&src, base))
        .unwrap_or_default()
}

/// Tag labels in page order, duplicates removed.
pub fn extract_tags(document: &Html) -> Vec<String> {
    TAGS.union(document)
}

/// `//host/x` → `https://host/x`, `/x` → `{origin}/x`, anything else unchanged.
pub fn absolutize(src: &str, base: &Url) -> String {
    if let Some(rest) = src.strip_prefix("//") {
        format!("https://{rest}")
    } else if src.starts_with('/') {
        format!("{}{}", base.origin().ascii_serialization(), src)
    } else {
        src.to_string()
    }
}

fn is_noise(element: &Element) -> bool {
    NOISE_TAGS.contains(&element.name()) || element.classes().any(|c| NOISE_CLASSES.contains(&c))
}

/// Text under `root` minus anything inside a noise element.
fn clean_text(root: ElementRef<'_>) -> String {
    let fragments = root.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let parent = node.parent().and_then(ElementRef::wrap)?;
        (!inside_noise(parent, root)).then_some(&**text)
    });
    collapse_whitespace(fragments)
}

/// Whether `element` or an ancestor below `root` is a noise element.
fn inside_noise(element: ElementRef<'_>, root: ElementRef<'_>) -> bool {
    std::iter::once(*element)
        .chain(element.ancestors())
        .take_while(|n| n.id() != root.id())
        .filter_map(ElementRef::wrap)
        .any(|el| is_noise(el.value()))
}

fn body_text(container: ElementRef<'_>) -> String {
    let paragraphs: Vec<String> = container
        .select(&PARAGRAPH)
        .filter(|p| !inside_noise(*p, container))
        .map(clean_text)
        .filter(|text| !text.is_empty())
        .collect();

    if paragraphs.is_empty() {
        clean_text(container)
    } else {
        paragraphs.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
        <html>
        <head>
          <meta itemprop="datePublished" content="2024-03-14T09:00:00+07:00">
          <meta property="og:image" content="https://cdn.example/og.jpg">
        </head>
        <body>
          <ul class="breadcrumb">
            <li><a href="/">Trang chủ</a></li>
            <li><a href="/bong-da">Bóng đá</a></li>
          </ul>
          <span class="date">Thứ sáu, 15/3/2024, 10:05 (GMT+7)</span>
          <h1 class="title-detail">  Việt Nam thắng   Indonesia </h1>
          <p class="description">Đội tuyển giành ba điểm.</p>
          <article class="fck_detail">
            <p class="Normal">Đoạn một.</p>
            <script>var ad = "không lấy";</script>
            <p class="Normal">   </p>
            <div class="VCSortableInPreviewMode"><p>Quảng cáo</p></div>
            <p class="Normal">Đoạn <b>hai</b>.</p>
            <figure class="fig-picture"><img src="/images/a.jpg"></figure>
            <p class="Normal" style="text-align:right;"><strong>Minh An</strong></p>
          </article>
          <div class="tags"><a>bóng đá</a><a>Indonesia</a><a>bóng đá</a></div>
        </body>
        </html>
    "#;

    fn base() -> Url {
        Url::parse("https://vnexpress.net").unwrap()
    }

    #[test]
    fn test_title_summary_author() {
        let doc = Html::parse_document(ARTICLE);
        assert_eq!(extract_title(&doc), "Việt Nam thắng Indonesia");
        assert_eq!(extract_summary(&doc), "Đội tuyển giành ba điểm.");
        assert_eq!(extract_author(&doc), "Minh An");
    }

    #[test]
    fn test_content_joins_paragraphs_and_drops_noise() {
        let doc = Html::parse_document(ARTICLE);
        let content = extract_content(&doc);
        assert_eq!(content, "Đoạn một.\nĐoạn hai.\nMinh An");
        assert!(!content.contains("Quảng cáo"));
        assert!(!content.contains("var ad"));
    }

    #[test]
    fn test_content_without_paragraphs_uses_container_text() {
        let doc = Html::parse_document(
            r#"<div class="fck_detail">Chỉ có <i>văn bản</i><style>.x{}</style></div>"#,
        );
        assert_eq!(extract_content(&doc), "Chỉ có văn bản");
    }

    #[test]
    fn test_category_url_beats_breadcrumb() {
        let doc = Html::parse_document(ARTICLE);
        let table = CategoryTable::vnexpress();
        assert_eq!(
            extract_category("https://vnexpress.net/the-thao/viet-nam-4721234.html", &doc, &table),
            "Thể thao"
        );
        assert_eq!(
            extract_category("https://vnexpress.net/viet-nam-4721234.html", &doc, &table),
            "Bóng đá"
        );
    }

    #[test]
    fn test_category_fallback() {
        let doc = Html::parse_document("<html><body><p>x</p></body></html>");
        let table = CategoryTable::vnexpress();
        assert_eq!(
            extract_category("https://vnexpress.net/abc-1.html", &doc, &table),
            FALLBACK_CATEGORY
        );
    }

    #[test]
    fn test_published_date_prefers_visible_line() {
        let doc = Html::parse_document(ARTICLE);
        assert_eq!(extract_published_date(&doc), NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_published_date_falls_back_to_meta() {
        let doc = Html::parse_document(
            r#"<html><head><meta itemprop="datePublished" content="2024-03-14T09:00:00+07:00"></head>
               <body><h1>Tin</h1></body></html>"#,
        );
        assert_eq!(extract_published_date(&doc), NaiveDate::from_ymd_opt(2024, 3, 14));
    }

    #[test]
    fn test_unparseable_date_line_is_none() {
        let doc = Html::parse_document(
            r#"<html><head><meta itemprop="datePublished" content="2024-03-14T09:00:00+07:00"></head>
               <body><span class="date">hôm qua</span></body></html>"#,
        );
        assert_eq!(extract_published_date(&doc), None);
    }

    #[test]
    fn test_nested_noise_inside_paragraph_is_dropped() {
        let doc = Html::parse_document(
            r#"<div class="fck_detail"><p>Trước <span class="banner-ads">QC <b>mua</b></span>sau</p></div>"#,
        );
        assert_eq!(extract_content(&doc), "Trước sau");
    }

    #[test]
    fn test_image_url_root_relative() {
        let doc = Html::parse_document(ARTICLE);
        assert_eq!(
            extract_image_url(&doc, &base()),
            "https://vnexpress.net/images/a.jpg"
        );
    }

    #[test]
    fn test_absolutize() {
        let base = base();
        assert_eq!(absolutize("//i1.vnecdn.net/a.jpg", &base), "https://i1.vnecdn.net/a.jpg");
        assert_eq!(absolutize("/a.jpg", &base), "https://vnexpress.net/a.jpg");
        assert_eq!(absolutize("https://x/a.jpg", &base), "https://x/a.jpg");
    }

    #[test]
    fn test_tags_deduplicated() {
        let doc = Html::parse_document(ARTICLE);
        assert_eq!(extract_tags(&doc), vec!["bóng đá", "Indonesia"]);
    }

    #[test]
    fn test_empty_page_yields_defaults() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert_eq!(extract_title(&doc), "");
        assert_eq!(extract_content(&doc), "");
        assert_eq!(extract_summary(&doc), "");
        assert_eq!(extract_author(&doc), "");
        assert_eq!(extract_published_date(&doc), None);
        assert_eq!(extract_image_url(&doc, &base()), "");
        assert!(extract_tags(&doc).is_empty());
    }
}
