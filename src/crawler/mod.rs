//! Crawler module for browser-driven page visiting
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier with domain scoping and page caps
//! - In-page automation (wait, scroll, click, custom script)
//! - Text, link and table extraction
//! - Overall crawl coordination over one browser session

mod automator;
mod coordinator;
mod extractor;
mod frontier;
mod result;

pub use automator::PageAutomator;
pub use coordinator::Crawler;
pub use extractor::{clean_links, ContentExtractor};
pub use frontier::{Frontier, FrontierEntry};
pub use result::{Link, PageContent, VisitResult};

use crate::browser::ChromeEngine;
use crate::config::Config;
use crate::WalkerError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl with Chromium
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and start URL
/// 2. Launch Chromium with an incognito context
/// 3. Visit pages breadth-first in concurrent batches
/// 4. Close the browser
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `start_url` - Seed URL; also defines the crawl's domain
/// * `cancel` - Token that stops the crawl early when cancelled
///
/// # Returns
///
/// * `Ok(Vec<VisitResult>)` - One record per visited page
/// * `Err(WalkerError)` - Invalid configuration or browser launch failure
pub async fn crawl(
    config: Config,
    start_url: &str,
    cancel: CancellationToken,
) -> Result<Vec<VisitResult>, WalkerError> {
    crate::config::validate_start_url(start_url)?;

    let crawler = Crawler::new(config, ChromeEngine::new())?;
    crawler.scrape_with_cancel(start_url, cancel).await
}
