//! Error taxonomy for the search and extraction stages.
//!
//! Per-item failures (one search entry, one article URL) are caught by the
//! callers and degraded to sentinel/empty values; they never abort a batch.
//! Only the search request exhausting all fallback tiers halts a run, since
//! without a result set there is nothing to extract.

use thiserror::Error;

/// A failure of one fallback tier of the search fetch.
#[derive(Debug, Error)]
pub enum SearchFetchError {
    /// The HTTP request itself failed (connection, timeout, TLS, ...).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not decodable as the expected JSON shape.
    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A search result entry missing one of its required fields.
///
/// The entry is skipped; the rest of the batch still normalizes.
#[derive(Debug, Error)]
#[error("search result entry {index} is missing required field `{field}`")]
pub struct MalformedArticle {
    /// Position of the entry in the API's `articles` array.
    pub index: usize,
    /// Name of the first missing field.
    pub field: &'static str,
}

/// A failure to extract content from one article URL.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Fetching the article page failed.
    #[error("article fetch failure: {0}")]
    Http(#[from] reqwest::Error),

    /// The page was fetched but yielded no usable content.
    #[error("no usable content: {0}")]
    Content(String),
}
