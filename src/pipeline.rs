//! Pipeline orchestration: query → search → normalize → extract → merge.
//!
//! The search fetch is a hard ordering barrier: extraction targets are not
//! known until the result set is normalized. Extraction itself is an
//! embarrassingly parallel batch over the URL list, run with bounded,
//! order-preserving concurrency so the result collection stays index-aligned
//! with the normalized hits.

use futures::stream::{self, StreamExt};
use std::error::Error;
use tracing::{info, instrument, warn};

use crate::extract::{self, ExtractContent};
use crate::gdelt::{self, SearchParams};
use crate::models::{ArticleContent, CorpusRow};
use crate::query;
use crate::sanitize;

/// Everything one corpus run needs.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Entity or topic name to search for.
    pub name: String,
    /// Positive term groups, AND-combined; alternatives within a group OR.
    pub positives: Vec<Vec<String>>,
    /// Terms to exclude, applied only when `apply_excludes` is set.
    pub negatives: Vec<String>,
    /// Whether to append the exclusion terms to the query (off by default).
    pub apply_excludes: bool,
    /// Search API parameters (date window, record cap, ...).
    pub search: SearchParams,
    /// Number of concurrent extraction tasks.
    pub concurrency: usize,
}

/// Default extraction concurrency: twice the available cores, since tasks
/// spend most of their time blocked on network I/O.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        * 2
}

/// Run the full pipeline and return one [`CorpusRow`] per search result.
///
/// A search request that fails every fallback tier halts the run with an
/// error, since there are no URLs to extract. Per-URL extraction failures
/// never do: their rows keep the search metadata with empty content fields.
#[instrument(level = "info", skip_all, fields(name = %params.name))]
pub async fn run<E: ExtractContent>(
    client: &reqwest::Client,
    extractor: &E,
    params: &RunParams,
) -> Result<Vec<CorpusRow>, Box<dyn Error>> {
    let query = query::build(
        &params.name,
        &params.positives,
        &params.negatives,
        params.apply_excludes,
    );
    info!(%query, "Built search query");

    let url = gdelt::build_url(&query, &params.search);
    let Some(response) = gdelt::fetch(client, &url).await else {
        return Err("search request failed on every fallback tier; nothing to extract".into());
    };

    let hits = gdelt::normalize(response);
    if hits.is_empty() {
        info!("Search returned no usable results");
        return Ok(Vec::new());
    }

    extract::init();

    let urls: Vec<String> = hits.iter().map(|hit| hit.url.clone()).collect();
    let contents = extract_all(extractor, urls, params.concurrency).await;

    // `buffered` preserves input order, so hits and contents line up by index.
    let rows: Vec<CorpusRow> = hits
        .into_iter()
        .zip(contents)
        .map(|(hit, content)| CorpusRow::merge(hit, content))
        .collect();

    info!(rows = rows.len(), "Pipeline complete");
    Ok(rows)
}

/// Extract and sanitize every URL with bounded, order-preserving concurrency.
///
/// Returns exactly one [`ArticleContent`] per input URL, in input order. A
/// URL whose extraction fails (after the extractor's own retry) degrades to
/// an all-empty record instead of being dropped.
pub(crate) async fn extract_all<E: ExtractContent>(
    extractor: &E,
    urls: Vec<String>,
    concurrency: usize,
) -> Vec<ArticleContent> {
    stream::iter(urls)
        .map(|url| async move {
            match extractor.extract(&url).await {
                Ok(content) => sanitize::sanitize(content),
                Err(e) => {
                    warn!(%url, error = %e, "Content unavailable; emitting empty record");
                    ArticleContent::unavailable(&url)
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::models::SearchHit;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Succeeds unless the URL contains "bad"; records how often it ran.
    struct Scripted {
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new() -> Self {
            Scripted {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ExtractContent for Scripted {
        async fn extract(&self, url: &str) -> Result<ArticleContent, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("bad") {
                Err(ExtractionError::Content("unreachable".to_string()))
            } else {
                Ok(ArticleContent {
                    url: url.to_string(),
                    body: format!("body of {url};\nraw"),
                    ..Default::default()
                })
            }
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://site{i}.com/a")).collect()
    }

    #[tokio::test]
    async fn extract_all_returns_one_record_per_url_in_order() {
        let extractor = Scripted::new();
        let input = urls(7);
        let contents = extract_all(&extractor, input.clone(), 3).await;

        assert_eq!(contents.len(), 7);
        for (url, content) in input.iter().zip(&contents) {
            assert_eq!(&content.url, url);
        }
    }

    #[tokio::test]
    async fn extract_all_degrades_failures_to_empty_records() {
        let extractor = Scripted::new();
        let input = vec![
            "https://good.com/1".to_string(),
            "https://bad.com/2".to_string(),
            "https://good.com/3".to_string(),
        ];
        let contents = extract_all(&extractor, input, 2).await;

        assert_eq!(contents.len(), 3);
        assert!(!contents[0].body.is_empty());
        assert_eq!(contents[1], ArticleContent::unavailable("https://bad.com/2"));
        assert!(!contents[2].body.is_empty());
    }

    #[tokio::test]
    async fn extract_all_sanitizes_successful_extractions() {
        let extractor = Scripted::new();
        let contents = extract_all(&extractor, urls(1), 1).await;
        assert!(!contents[0].body.contains(';'));
        assert!(!contents[0].body.contains('\n'));
    }

    #[tokio::test]
    async fn extract_all_with_no_urls_runs_no_tasks() {
        let extractor = Scripted::new();
        let contents = extract_all(&extractor, Vec::new(), 4).await;
        assert!(contents.is_empty());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_failures_still_yield_full_row_set() {
        let extractor = Scripted::new();
        let input: Vec<String> = (0..5).map(|i| format!("https://bad{i}.com")).collect();

        let hits: Vec<SearchHit> = input
            .iter()
            .map(|url| SearchHit {
                url: url.clone(),
                title: "t".to_string(),
                seendate: "20210101T000000Z".to_string(),
                domain: "d".to_string(),
                language: "l".to_string(),
                sourcecountry: "c".to_string(),
            })
            .collect();

        let contents = extract_all(&extractor, input, 2).await;
        let rows: Vec<CorpusRow> = hits
            .into_iter()
            .zip(contents)
            .map(|(hit, content)| CorpusRow::merge(hit, content))
            .collect();

        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert_eq!(row.title, "t");
            assert_eq!(row.authors, "");
            assert_eq!(row.body, "");
        }
    }

    #[test]
    fn default_concurrency_is_positive() {
        assert!(default_concurrency() >= 2);
    }
}
