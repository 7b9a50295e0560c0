//! Command-line interface definitions.
//!
//! All pipeline knobs live here: the entity name, positive/negative term
//! lists, the search date window, and the hardening options (HTTP timeout,
//! extraction concurrency).

use chrono::NaiveDateTime;
use clap::Parser;

/// Download a corpus of news articles matching an entity or topic query.
///
/// # Examples
///
/// ```sh
/// # Basic search over the default date window
/// gdelt_corpus "Acme Corp International Holdings"
///
/// # Narrow with positive groups and a custom window
/// gdelt_corpus "Acme Corp" -i "fraud,scandal" -i "court" \
///     --start 20210101000000 --end 20211231235959
///
/// # Exclusion terms are only applied with the explicit toggle
/// gdelt_corpus "Acme Corp" -x sports --apply-excludes
/// ```
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Entity or topic name to search for
    pub name: String,

    /// Positive term group: comma-separated alternatives matched via OR.
    /// Repeat the flag for additional groups, which combine via AND.
    #[arg(short = 'i', long = "include")]
    pub include: Vec<String>,

    /// Term to exclude from results; repeatable
    #[arg(short = 'x', long = "exclude")]
    pub exclude: Vec<String>,

    /// Append exclusion terms to the search query. Off by default; the
    /// terms are computed either way but historic corpus builds never
    /// applied them.
    #[arg(long)]
    pub apply_excludes: bool,

    /// Search window start, YYYYMMDDHHMMSS
    #[arg(long, value_parser = parse_datetime, default_value = "20200101000000")]
    pub start: String,

    /// Search window end, YYYYMMDDHHMMSS
    #[arg(long, value_parser = parse_datetime, default_value = "20220131235959")]
    pub end: String,

    /// Maximum number of records to request from the search API
    #[arg(long, default_value_t = 250)]
    pub max_records: u32,

    /// Output directory for the corpus CSV
    #[arg(short, long, default_value = "./data")]
    pub output_dir: String,

    /// HTTP timeout in seconds for search and article requests
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Concurrent extraction tasks; defaults to twice the available cores
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl Cli {
    /// Split each repeated `--include` flag into its comma-separated
    /// alternatives, dropping empty fragments and empty groups.
    pub fn positive_groups(&self) -> Vec<Vec<String>> {
        self.include
            .iter()
            .map(|group| {
                group
                    .split(',')
                    .map(str::trim)
                    .filter(|alt| !alt.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<String>>()
            })
            .filter(|group| !group.is_empty())
            .collect()
    }
}

/// Validate a `YYYYMMDDHHMMSS` timestamp, passing the raw string through.
fn parse_datetime(raw: &str) -> Result<String, String> {
    NaiveDateTime::parse_from_str(raw, "%Y%m%d%H%M%S")
        .map(|_| raw.to_string())
        .map_err(|e| format!("expected YYYYMMDDHHMMSS: {e}"))
}
