//! GDELT Doc API client: request URL construction, fault-tolerant fetching,
//! and normalization of the `articles` payload into [`SearchHit`] rows.
//!
//! The API intermittently serves HTML error pages and JSON littered with
//! stray backslash escapes, so a single strict GET-and-decode loses whole
//! batches of otherwise valid results. [`fetch`] therefore walks an ordered
//! list of fallback tiers and only reports the search unavailable once every
//! tier has produced a typed failure.

use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{MalformedArticle, SearchFetchError};
use crate::models::SearchHit;
use crate::utils::truncate_for_log;

/// Base endpoint of the GDELT Doc 2.0 API.
pub const DOC_API_BASE: &str = "https://api.gdeltproject.org/api/v2/doc/doc?";

/// Query parameters for one search request.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// API result mode; the article list mode is the only one used here.
    pub mode: String,
    /// Response format requested from the API.
    pub format: String,
    /// Record cap for the result set.
    pub max_records: u32,
    /// Window start, `YYYYMMDDHHMMSS`.
    pub start: String,
    /// Window end, `YYYYMMDDHHMMSS`.
    pub end: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            mode: "artlist".to_string(),
            format: "json".to_string(),
            max_records: 250,
            start: "20200101000000".to_string(),
            end: "20220131235959".to_string(),
        }
    }
}

/// Raw search response payload.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

/// One entry of the `articles` array, before validation.
///
/// Every field is optional at this stage; [`normalize`] decides which
/// entries are usable.
#[derive(Debug, Default, Deserialize)]
pub struct RawArticle {
    pub url: Option<String>,
    pub title: Option<String>,
    pub seendate: Option<String>,
    pub domain: Option<String>,
    pub language: Option<String>,
    pub sourcecountry: Option<String>,
}

/// Compose the full request URL for a search query.
///
/// Spaces in the query are replaced with `%20` only; the API parses its
/// query parameter leniently and full percent-encoding of reserved
/// characters is not required (quotes and parentheses pass through as-is).
/// The translation flag is fixed.
pub fn build_url(query: &str, params: &SearchParams) -> String {
    let query = query.replace(' ', "%20");
    format!(
        "{DOC_API_BASE}query={query}&mode={}&format={}&maxrecords={}&startdatetime={}&enddatetime={}&trans=googtrans",
        params.mode, params.format, params.max_records, params.start, params.end
    )
}

/// Fetch and decode a search response, falling back through three tiers.
///
/// 1. Plain GET with strict JSON decoding.
/// 2. GET raw bytes, strip literal backslashes, decode.
/// 3. Fresh one-shot GET, strip backslashes, lossy UTF-8 decode, then parse.
///
/// Each tier failure is logged with its typed error; exhausting all tiers
/// yields `None` rather than an error, and the caller decides whether a
/// missing result set is fatal.
#[instrument(level = "info", skip_all)]
pub async fn fetch(client: &reqwest::Client, url: &str) -> Option<SearchResponse> {
    match fetch_strict(client, url).await {
        Ok(response) => return Some(response),
        Err(e) => warn!(tier = 1, error = %e, "Strict fetch failed; retrying with backslash stripping"),
    }

    match fetch_stripped(client, url).await {
        Ok(response) => return Some(response),
        Err(e) => warn!(tier = 2, error = %e, "Stripped fetch failed; retrying with lossy decoding"),
    }

    match fetch_lossy(url).await {
        Ok(response) => Some(response),
        Err(e) => {
            error!(tier = 3, error = %e, "All fetch tiers exhausted; search result unavailable");
            None
        }
    }
}

/// Tier 1: straight GET and strict JSON decode.
async fn fetch_strict(
    client: &reqwest::Client,
    url: &str,
) -> Result<SearchResponse, SearchFetchError> {
    let body = client.get(url).send().await?.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Tier 2: GET raw bytes and strip stray backslash escapes before decoding.
async fn fetch_stripped(
    client: &reqwest::Client,
    url: &str,
) -> Result<SearchResponse, SearchFetchError> {
    let bytes = client.get(url).send().await?.bytes().await?;
    let cleaned = strip_backslashes(&bytes);
    match serde_json::from_slice(&cleaned) {
        Ok(response) => Ok(response),
        Err(e) => {
            debug!(
                payload = %truncate_for_log(&String::from_utf8_lossy(&cleaned), 200),
                "Undecodable search payload"
            );
            Err(e.into())
        }
    }
}

/// Tier 3: fresh one-shot request (no shared client state), stripped and
/// decoded permissively.
async fn fetch_lossy(url: &str) -> Result<SearchResponse, SearchFetchError> {
    let bytes = reqwest::get(url).await?.bytes().await?;
    let cleaned = strip_backslashes(&bytes);
    decode_payload(&String::from_utf8_lossy(&cleaned))
}

fn decode_payload(text: &str) -> Result<SearchResponse, SearchFetchError> {
    match serde_json::from_str(text) {
        Ok(response) => Ok(response),
        Err(e) => {
            debug!(payload = %truncate_for_log(text, 200), "Undecodable search payload");
            Err(e.into())
        }
    }
}

/// Remove every literal backslash byte from a payload.
///
/// The API sometimes emits unescaped `\` characters inside string values,
/// which breaks JSON decoding outright; the affected values contain no
/// legitimate escapes, so dropping the byte recovers the batch.
fn strip_backslashes(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().copied().filter(|b| *b != b'\\').collect()
}

/// Convert a search response into ordered [`SearchHit`] rows.
///
/// Entries missing any of the six required fields are skipped with a
/// warning; one bad entry never aborts the batch. Order is preserved from
/// the API response.
#[instrument(level = "info", skip_all)]
pub fn normalize(response: SearchResponse) -> Vec<SearchHit> {
    let mut hits = Vec::with_capacity(response.articles.len());

    for (index, raw) in response.articles.into_iter().enumerate() {
        match hit_from_raw(index, raw) {
            Ok(hit) => hits.push(hit),
            Err(e) => warn!(error = %e, "Skipping malformed search result entry"),
        }
    }

    info!(count = hits.len(), "Normalized search results");
    hits
}

fn hit_from_raw(index: usize, raw: RawArticle) -> Result<SearchHit, MalformedArticle> {
    fn require(
        value: Option<String>,
        index: usize,
        field: &'static str,
    ) -> Result<String, MalformedArticle> {
        value.ok_or(MalformedArticle { index, field })
    }

    Ok(SearchHit {
        url: require(raw.url, index, "url")?,
        title: require(raw.title, index, "title")?,
        seendate: require(raw.seendate, index, "seendate")?,
        domain: require(raw.domain, index, "domain")?,
        language: require(raw.language, index, "language")?,
        sourcecountry: require(raw.sourcecountry, index, "sourcecountry")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str) -> String {
        format!(
            r#"{{"url":"{url}","title":"t","seendate":"20210101T000000Z","domain":"d.com","language":"English","sourcecountry":"US"}}"#
        )
    }

    #[test]
    fn build_url_lays_out_all_parameters() {
        let params = SearchParams {
            max_records: 50,
            start: "20210101000000".to_string(),
            end: "20211231235959".to_string(),
            ..Default::default()
        };
        let url = build_url("(\"Acme\" OR \"Acme Co\") AND (\"fraud\")", &params);

        assert!(url.starts_with("https://api.gdeltproject.org/api/v2/doc/doc?query="));
        assert!(url.contains("query=(\"Acme\"%20OR%20\"Acme%20Co\")%20AND%20(\"fraud\")"));
        assert!(url.contains("&mode=artlist"));
        assert!(url.contains("&format=json"));
        assert!(url.contains("&maxrecords=50"));
        assert!(url.contains("&startdatetime=20210101000000"));
        assert!(url.contains("&enddatetime=20211231235959"));
        assert!(url.ends_with("&trans=googtrans"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn normalize_preserves_count_and_order() {
        let json = format!(
            r#"{{"articles":[{},{},{}]}}"#,
            entry("https://a.com/1"),
            entry("https://b.com/2"),
            entry("https://c.com/3")
        );
        let response: SearchResponse = serde_json::from_str(&json).unwrap();
        let hits = normalize(response);

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].url, "https://a.com/1");
        assert_eq!(hits[1].url, "https://b.com/2");
        assert_eq!(hits[2].url, "https://c.com/3");
        assert_eq!(hits[0].title, "t");
        assert_eq!(hits[0].seendate, "20210101T000000Z");
        assert_eq!(hits[0].domain, "d.com");
        assert_eq!(hits[0].language, "English");
        assert_eq!(hits[0].sourcecountry, "US");
    }

    #[test]
    fn normalize_skips_entries_missing_required_fields() {
        let json = format!(
            r#"{{"articles":[{},{{"title":"no url"}},{}]}}"#,
            entry("https://a.com/1"),
            entry("https://c.com/3")
        );
        let response: SearchResponse = serde_json::from_str(&json).unwrap();
        let hits = normalize(response);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://a.com/1");
        assert_eq!(hits[1].url, "https://c.com/3");
    }

    #[test]
    fn normalize_empty_articles_yields_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"articles":[]}"#).unwrap();
        assert!(normalize(response).is_empty());
    }

    #[test]
    fn response_without_articles_key_defaults_to_empty() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.articles.is_empty());
    }

    #[test]
    fn malformed_article_error_names_the_field() {
        let raw = RawArticle {
            url: Some("https://a.com".to_string()),
            title: Some("t".to_string()),
            ..Default::default()
        };
        let err = hit_from_raw(4, raw).unwrap_err();
        assert_eq!(err.index, 4);
        assert_eq!(err.field, "seendate");
    }

    #[test]
    fn backslash_stripping_recovers_broken_payloads() {
        // A stray `\y` escape makes the payload invalid JSON outright.
        let broken = format!(r#"{{"articles":[{}]}}"#, entry(r"https://a.com/x\y"));
        assert!(serde_json::from_str::<SearchResponse>(&broken).is_err());

        let cleaned = strip_backslashes(broken.as_bytes());
        let response: SearchResponse =
            serde_json::from_str(&String::from_utf8_lossy(&cleaned)).unwrap();
        let hits = normalize(response);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://a.com/xy");
    }
}
