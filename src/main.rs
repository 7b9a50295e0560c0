//! # GDELT Corpus
//!
//! A news-corpus downloader built on the GDELT Doc 2.0 API. Given an entity
//! or topic name, it builds a robust boolean search query, fetches matching
//! article metadata, resolves every result URL into full article content,
//! and writes one CSV row per search result.
//!
//! ## Usage
//!
//! ```sh
//! gdelt_corpus "Acme Corp International Holdings" -i fraud -o ./data
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Query building**: clean the entity name, amplify it into an OR-group
//!    of truncations, append positive/negative term groups
//! 2. **Search**: fetch the result list with tiered fallback parsing
//! 3. **Extraction**: download and parse every article concurrently (bounded,
//!    order-preserving), with one retry per URL
//! 4. **Output**: sanitize free text and write the merged CSV
//!
//! Extraction failures degrade individual rows to empty content fields; the
//! output always contains exactly one row per search result.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod extract;
mod gdelt;
mod models;
mod outputs;
mod pipeline;
mod query;
mod sanitize;
mod utils;

use cli::Cli;
use extract::{HtmlExtractor, RetryOnce};
use pipeline::RunParams;

/// Some outlets serve bot-detection pages to unknown clients; a browser
/// user agent keeps extraction working against them.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4324.150 Safari/537.36";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("gdelt_corpus starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // Early check: fail before downloading anything if we cannot write.
    if let Err(e) = utils::ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .user_agent(BROWSER_USER_AGENT)
        .build()?;
    let extractor = RetryOnce::new(HtmlExtractor::new(client.clone()));

    let params = RunParams {
        name: args.name.clone(),
        positives: args.positive_groups(),
        negatives: args.exclude.clone(),
        apply_excludes: args.apply_excludes,
        search: gdelt::SearchParams {
            max_records: args.max_records,
            start: args.start.clone(),
            end: args.end.clone(),
            ..Default::default()
        },
        concurrency: args.concurrency.unwrap_or_else(pipeline::default_concurrency),
    };

    let rows = pipeline::run(&client, &extractor, &params).await?;

    let extracted = rows.iter().filter(|row| !row.body.is_empty()).count();
    info!(
        total = rows.len(),
        extracted,
        empty = rows.len() - extracted,
        "Assembled corpus rows"
    );

    let output_path = format!(
        "{}/{}_{}-{}.csv",
        args.output_dir.trim_end_matches('/'),
        utils::slugify(&args.name),
        args.start,
        args.end
    );
    outputs::csv::write_rows(&rows, &output_path)?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        rows = rows.len(),
        path = %output_path,
        "Execution complete"
    );

    Ok(())
}
