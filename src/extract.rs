//! Article content extraction with retry-once semantics.
//!
//! Given one article URL, [`HtmlExtractor`] downloads the page and pulls
//! authors, body text, keywords, a summary, and the publish date out of its
//! HTML (meta tags, `<time>` elements, JSON-LD, and paragraph text, in that
//! order of preference). News sites and their CDNs flake constantly, so the
//! [`RetryOnce`] decorator repeats a failed extraction exactly once with an
//! identical call before the pipeline gives up on that URL.
//!
//! The trait seam ([`ExtractContent`]) keeps the extractor swappable and lets
//! the pipeline be tested without touching the network.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::Once;
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::models::ArticleContent;

static META_AUTHOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="author"], meta[property="article:author"]"#).unwrap()
});
static META_KEYWORDS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="keywords"]"#).unwrap());
static META_DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="description"], meta[property="og:description"]"#).unwrap()
});
static META_PUBLISHED: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="article:published_time"], meta[name="date"]"#).unwrap()
});
static TIME_DATETIME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").unwrap());
static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static ARTICLE_PARAS: Lazy<Selector> = Lazy::new(|| Selector::parse("article p").unwrap());
static ALL_PARAS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

static WARMUP: Once = Once::new();

/// One-time, process-wide warmup of the extraction machinery.
///
/// Forces the lazily compiled selectors so the first extraction task does
/// not pay the compilation cost mid-batch. Idempotent; the orchestrator
/// calls it once before extraction starts.
pub fn init() {
    WARMUP.call_once(|| {
        for selector in [
            &META_AUTHOR,
            &META_KEYWORDS,
            &META_DESCRIPTION,
            &META_PUBLISHED,
            &TIME_DATETIME,
            &JSON_LD,
            &ARTICLE_PARAS,
            &ALL_PARAS,
        ] {
            Lazy::force(selector);
        }
        debug!("Content extraction selectors compiled");
    });
}

/// Async content extraction for one article URL.
pub trait ExtractContent {
    /// Fetch the article behind `url` and extract its content.
    async fn extract(&self, url: &str) -> Result<ArticleContent, ExtractionError>;
}

/// Extractor backed by an HTTP client and HTML metadata parsing.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    client: reqwest::Client,
}

impl HtmlExtractor {
    pub fn new(client: reqwest::Client) -> Self {
        HtmlExtractor { client }
    }
}

impl ExtractContent for HtmlExtractor {
    async fn extract(&self, url: &str) -> Result<ArticleContent, ExtractionError> {
        let html = self.client.get(url).send().await?.text().await?;
        debug!(%url, bytes = html.len(), "Fetched article page");
        parse_article(url, &html)
    }
}

/// Decorator that retries a failed extraction exactly once.
///
/// The second call is identical to the first; there is no backoff and no
/// third attempt. The bound matters: article pages fail transiently often
/// enough that one repeat recovers real data, while anything more just
/// stalls the batch on dead links.
#[derive(Debug, Clone)]
pub struct RetryOnce<T> {
    inner: T,
}

impl<T> RetryOnce<T>
where
    T: ExtractContent,
{
    pub fn new(inner: T) -> Self {
        RetryOnce { inner }
    }
}

impl<T> ExtractContent for RetryOnce<T>
where
    T: ExtractContent,
{
    async fn extract(&self, url: &str) -> Result<ArticleContent, ExtractionError> {
        match self.inner.extract(url).await {
            Ok(content) => Ok(content),
            Err(first) => {
                warn!(%url, error = %first, "Extraction failed; retrying once");
                self.inner.extract(url).await
            }
        }
    }
}

/// Extract structured content from an already-fetched HTML document.
///
/// A page with no paragraph text at all is unusable and fails; every other
/// field degrades to an empty value when absent.
pub(crate) fn parse_article(url: &str, html: &str) -> Result<ArticleContent, ExtractionError> {
    let document = Html::parse_document(html);

    let body = paragraph_text(&document);
    if body.is_empty() {
        return Err(ExtractionError::Content(format!(
            "no paragraph text in page at {url}"
        )));
    }

    let publish_date = raw_publish_date(&document)
        .map(|raw| format_publish_date(&raw))
        .unwrap_or_default();

    Ok(ArticleContent {
        url: url.to_string(),
        authors: split_names(&meta_content(&document, &META_AUTHOR)),
        keywords: split_list(&meta_content(&document, &META_KEYWORDS)),
        summary: meta_content(&document, &META_DESCRIPTION),
        publish_date,
        body,
    })
}

/// First matching meta tag's `content`, or empty.
fn meta_content(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .find_map(|el| el.value().attr("content"))
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Split an author byline on commas and the word "and".
fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a comma-separated keyword list.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect()
}

/// Locate a raw publish timestamp: meta tags, then `<time datetime>`, then
/// JSON-LD `datePublished`.
fn raw_publish_date(document: &Html) -> Option<String> {
    if let Some(content) = document
        .select(&META_PUBLISHED)
        .find_map(|el| el.value().attr("content"))
    {
        return Some(content.to_string());
    }

    if let Some(datetime) = document
        .select(&TIME_DATETIME)
        .find_map(|el| el.value().attr("datetime"))
    {
        return Some(datetime.to_string());
    }

    for script in document.select(&JSON_LD) {
        let text = script.text().collect::<String>();
        if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
            if let Some(date) = json_ld_date(&value) {
                return Some(date);
            }
        }
    }

    None
}

/// Pull `datePublished` out of a JSON-LD value, descending into arrays and
/// `@graph` containers.
fn json_ld_date(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(json_ld_date),
        Value::Object(map) => {
            if let Some(date) = map.get("datePublished").and_then(Value::as_str) {
                return Some(date.to_string());
            }
            map.get("@graph").and_then(json_ld_date)
        }
        _ => None,
    }
}

/// Normalize a raw timestamp to `YYYY-MM-DD`, or empty when unparseable.
pub(crate) fn format_publish_date(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(raw) {
        return datetime.date_naive().format("%Y-%m-%d").to_string();
    }

    // Timestamps that are not strict RFC 3339 usually still lead with the date.
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    String::new()
}

/// Article paragraph text, preferring paragraphs scoped to an `<article>`
/// element and falling back to all paragraphs on the page.
fn paragraph_text(document: &Html) -> String {
    let scoped = collect_paragraphs(document, &ARTICLE_PARAS);
    if !scoped.is_empty() {
        return scoped;
    }
    collect_paragraphs(document, &ALL_PARAS)
}

fn collect_paragraphs(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .map(|p| {
            p.text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
