//! Output module for crawl results and diagnostics
//!
//! This module handles:
//! - Writing results as a stream of compact JSON objects, each followed by a
//!   blank line
//! - Emitting structured warnings on stderr
//! - Computing and printing crawl statistics

pub mod stats;

pub use stats::{print_statistics, write_statistics, CrawlStatistics};

use crate::crawler::VisitResult;
use crate::WalkerError;
use std::io::Write;

/// Writes each result as one compact JSON object followed by a blank line
///
/// # Arguments
///
/// * `writer` - Destination, usually stdout
/// * `results` - Records in the order they should appear
///
/// # Returns
///
/// * `Ok(())` - All records were written and the writer flushed
/// * `Err(WalkerError)` - Serialization or I/O failed
pub fn write_results<W: Write>(writer: &mut W, results: &[VisitResult]) -> Result<(), WalkerError> {
    for result in results {
        serde_json::to_writer(&mut *writer, result)?;
        writer.write_all(b"\n\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Renders a warning as a one-line JSON object
pub fn warning_line(message: &str) -> String {
    serde_json::json!({ "_warning": message }).to_string()
}

/// Logs a warning and writes it to stderr as `{"_warning": ...}`
pub fn emit_warning(message: &str) {
    tracing::warn!("{}", message);
    eprintln!("{}", warning_line(message));
}
