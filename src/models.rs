//! Data models for search results, extracted articles, and output rows.
//!
//! This module defines the core data structures flowing through the pipeline:
//! - [`SearchHit`]: One article entry from a GDELT search response
//! - [`ArticleContent`]: Full content extracted from a single article URL
//! - [`CorpusRow`]: The merged, CSV-ready output row
//!
//! A run produces exactly one [`CorpusRow`] per [`SearchHit`]. When content
//! extraction fails for a URL, its row keeps the search metadata and carries
//! empty content fields; rows are never dropped.

use serde::Serialize;

/// One article entry as returned by the GDELT Doc API search.
///
/// Field values are carried verbatim from the API response. `seendate` keeps
/// the API's own timestamp format and is not reparsed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Article URL, the join key for content extraction.
    pub url: String,
    /// Article headline.
    pub title: String,
    /// Timestamp GDELT first saw the article, in the API's raw format.
    pub seendate: String,
    /// Publishing domain, e.g. `reuters.com`.
    pub domain: String,
    /// Article language as reported by the API.
    pub language: String,
    /// Source country as reported by the API.
    pub sourcecountry: String,
}

/// Full content extracted from one article URL.
///
/// Every field defaults to empty rather than absent: a failed or partial
/// extraction still yields a schema-complete value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleContent {
    /// The URL the content was extracted from.
    pub url: String,
    /// Author names, possibly empty.
    pub authors: Vec<String>,
    /// Keywords/tags, possibly empty.
    pub keywords: Vec<String>,
    /// Article summary or description, possibly empty.
    pub summary: String,
    /// Publish date formatted `YYYY-MM-DD`, or empty when unknown.
    pub publish_date: String,
    /// Article body text, possibly empty.
    pub body: String,
}

impl ArticleContent {
    /// An all-empty record for a URL whose extraction was unavailable.
    pub fn unavailable(url: &str) -> Self {
        ArticleContent {
            url: url.to_string(),
            ..Default::default()
        }
    }
}

/// One row of the final corpus: search metadata joined with extracted content.
///
/// Serialized headers keep the column names of the original corpus format
/// (`autores`, `fecha`, `cuerpo`) so existing downstream consumers keep
/// working. Authors and keywords are semicolon-joined within their cells.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CorpusRow {
    pub url: String,
    pub title: String,
    pub seendate: String,
    pub domain: String,
    pub language: String,
    pub sourcecountry: String,
    #[serde(rename = "autores")]
    pub authors: String,
    pub keywords: String,
    pub summary: String,
    #[serde(rename = "fecha")]
    pub publish_date: String,
    #[serde(rename = "cuerpo")]
    pub body: String,
}

impl CorpusRow {
    /// Merge a search hit with the content extracted for the same URL.
    ///
    /// The two sides are joined positionally by the pipeline; the hit's `url`
    /// wins so the row always points at the URL the search returned.
    pub fn merge(hit: SearchHit, content: ArticleContent) -> Self {
        CorpusRow {
            url: hit.url,
            title: hit.title,
            seendate: hit.seendate,
            domain: hit.domain,
            language: hit.language,
            sourcecountry: hit.sourcecountry,
            authors: content.authors.join(";"),
            keywords: content.keywords.join(";"),
            summary: content.summary,
            publish_date: content.publish_date,
            body: content.body,
        }
    }
}
