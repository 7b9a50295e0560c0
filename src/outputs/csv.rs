//! CSV output for corpus rows.
//!
//! Rows are accumulated in memory by the pipeline and serialized here in one
//! pass, headers first. Authors and keywords arrive already semicolon-joined
//! inside their cells; the sanitizer guarantees free-text fields contain no
//! newlines or semicolons of their own.

use std::error::Error;
use tracing::{info, instrument};

use crate::models::CorpusRow;

/// Write the corpus rows to `path` as CSV with a header line.
///
/// An empty row set writes nothing and is not an error; a search that
/// returned no articles simply produces no file.
#[instrument(level = "info", skip(rows), fields(count = rows.len(), path = %path))]
pub fn write_rows(rows: &[CorpusRow], path: &str) -> Result<(), Box<dyn Error>> {
    if rows.is_empty() {
        info!("No rows to write; skipping CSV output");
        return Ok(());
    }

    let mut writer = csv::WriterBuilder::new().has_headers(true).from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("Wrote corpus CSV");
    Ok(())
}
