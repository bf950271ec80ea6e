//! Statistics computed from crawl results
//!
//! This module summarizes a finished crawl and renders the summary for
//! humans. The summary goes to stderr so stdout stays machine-readable.

use crate::crawler::VisitResult;
use crate::state::VisitState;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Total number of pages visited
    pub total_pages: u64,

    /// Count of pages by terminal state
    pub pages_by_state: HashMap<VisitState, u64>,

    /// Count of pages at each depth
    pub pages_by_depth: BTreeMap<u32, u64>,

    /// Total number of cleaned links found across all pages
    pub total_links: u64,

    /// Count of failed pages by error message
    pub error_summary: HashMap<String, u64>,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Builds statistics from crawl results
    ///
    /// # Arguments
    ///
    /// * `results` - The records returned by the crawl
    /// * `elapsed` - How long the crawl took
    pub fn from_results(results: &[VisitResult], elapsed: Duration) -> Self {
        let mut stats = CrawlStatistics {
            elapsed,
            ..CrawlStatistics::default()
        };

        for result in results {
            stats.total_pages += 1;
            *stats.pages_by_state.entry(result.state()).or_insert(0) += 1;
            *stats.pages_by_depth.entry(result.depth).or_insert(0) += 1;
            stats.total_links += result.links.len() as u64;

            if let Some(error) = &result.error {
                *stats.error_summary.entry(error.clone()).or_insert(0) += 1;
            }
        }

        stats
    }

    pub fn count(&self, state: VisitState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }
}

/// Writes statistics in a formatted manner
///
/// # Arguments
///
/// * `writer` - Destination of the report
/// * `stats` - The statistics to display
pub fn write_statistics<W: Write>(writer: &mut W, stats: &CrawlStatistics) -> io::Result<()> {
    writeln!(writer, "=== Crawl Statistics ===\n")?;

    writeln!(writer, "Overview:")?;
    writeln!(writer, "  Total pages visited: {}", stats.total_pages)?;
    writeln!(writer, "  Total links found: {}", stats.total_links)?;
    writeln!(writer, "  Elapsed: {:.1}s", stats.elapsed.as_secs_f64())?;
    writeln!(writer)?;

    writeln!(writer, "Pages by Depth:")?;
    for (depth, count) in &stats.pages_by_depth {
        writeln!(writer, "  {}: {}", depth, count)?;
    }
    writeln!(writer)?;

    if !stats.error_summary.is_empty() {
        writeln!(writer, "Error Summary:")?;
        let mut error_counts: Vec<_> = stats.error_summary.iter().collect();
        error_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (error, count) in error_counts {
            writeln!(writer, "  {}: {}", error, count)?;
        }
        writeln!(writer)?;
    }

    let extracted = stats.count(VisitState::Extracted);
    let success_rate = if stats.total_pages > 0 {
        (extracted as f64 / stats.total_pages as f64) * 100.0
    } else {
        0.0
    };

    writeln!(
        writer,
        "Success Rate: {:.1}% ({} / {} pages extracted)",
        success_rate, extracted, stats.total_pages
    )
}

/// Prints statistics to stderr
pub fn print_statistics(stats: &CrawlStatistics) {
    let stderr = io::stderr();
    if let Err(e) = write_statistics(&mut stderr.lock(), stats) {
        tracing::warn!("Failed to print statistics: {}", e);
    }
}
