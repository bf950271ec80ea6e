//! Pagewalker main entry point
//!
//! This is the command-line interface for the Pagewalker browser crawler.

use anyhow::Context;
use clap::Parser;
use pagewalker::browser::ChromeEngine;
use pagewalker::config::{load_config, validate, validate_start_url, Config};
use pagewalker::output::{print_statistics, write_results, CrawlStatistics};
use pagewalker::Crawler;
use std::path::PathBuf;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Pagewalker: a breadth-first crawler driven by a headless browser
///
/// Pagewalker opens pages in Chromium, optionally scrolls, clicks and runs a
/// custom script on each, and prints the visible text and links of every
/// page as JSON. The crawl stays on the start URL's domain.
#[derive(Parser, Debug)]
#[command(name = "pagewalker")]
#[command(version)]
#[command(about = "A breadth-first headless browser crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth to follow (0 = start page only)
    #[arg(long)]
    depth: Option<u32>,

    /// Maximum number of pages to visit
    #[arg(long)]
    max_pages: Option<usize>,

    /// Pause after each successful page (milliseconds)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Maximum pages open at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Number of pages scheduled per batch
    #[arg(long)]
    concurrent_batch: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Navigation timeout (milliseconds)
    #[arg(long)]
    goto_timeout_ms: Option<u64>,

    /// Wait-selector timeout (milliseconds)
    #[arg(long)]
    wait_timeout_ms: Option<u64>,

    /// Settle time after each click (milliseconds)
    #[arg(long)]
    post_click_wait_ms: Option<u64>,

    /// User agent string
    #[arg(long)]
    user_agent: Option<String>,

    /// Viewport width
    #[arg(long = "vw")]
    viewport_width: Option<u32>,

    /// Viewport height
    #[arg(long = "vh")]
    viewport_height: Option<u32>,

    /// Path to the Chrome/Chromium executable
    #[arg(long, value_name = "PATH")]
    chrome_executable: Option<PathBuf>,

    /// CSS selector to wait for before automation
    #[arg(long, value_name = "SELECTOR")]
    wait_selector: Option<String>,

    /// CSS selector to click (repeatable, clicked in order)
    #[arg(long = "click-selector", value_name = "SELECTOR")]
    click_selectors: Vec<String>,

    /// Number of scroll attempts
    #[arg(long)]
    scrolls: Option<u32>,

    /// Pause between scroll attempts (milliseconds)
    #[arg(long)]
    scroll_wait_ms: Option<u64>,

    /// Keep scrolling until the page stops growing
    #[arg(long)]
    scroll_until_end: bool,

    /// JavaScript to run on every page after automation
    #[arg(long, value_name = "CODE")]
    eval_js: Option<String>,

    /// File containing JavaScript to run on every page (--eval-js wins)
    #[arg(long, value_name = "FILE")]
    eval_js_file: Option<PathBuf>,

    /// Include visible tables in each result
    #[arg(long)]
    tables: bool,

    /// Print crawl statistics to stderr when done
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies explicitly given flags on top of a loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        let crawl = &mut config.crawl;
        if let Some(depth) = self.depth {
            crawl.depth = depth;
        }
        if let Some(max_pages) = self.max_pages {
            crawl.max_pages = max_pages;
        }
        if let Some(delay_ms) = self.delay_ms {
            crawl.delay_ms = delay_ms;
        }
        if let Some(concurrency) = self.concurrency {
            crawl.concurrency = concurrency;
        }
        if let Some(batch_size) = self.concurrent_batch {
            crawl.batch_size = batch_size;
        }

        let timeouts = &mut config.timeouts;
        if let Some(goto_ms) = self.goto_timeout_ms {
            timeouts.goto_ms = goto_ms;
        }
        if let Some(wait_ms) = self.wait_timeout_ms {
            timeouts.wait_ms = wait_ms;
        }
        if let Some(post_click_ms) = self.post_click_wait_ms {
            timeouts.post_click_ms = post_click_ms;
        }

        let browser = &mut config.browser;
        if self.headful {
            browser.headless = false;
        }
        if let Some(user_agent) = &self.user_agent {
            browser.user_agent = Some(user_agent.clone());
        }
        if let Some(width) = self.viewport_width {
            browser.viewport_width = width;
        }
        if let Some(height) = self.viewport_height {
            browser.viewport_height = height;
        }
        if let Some(path) = &self.chrome_executable {
            browser.executable = Some(path.clone());
        }

        let automation = &mut config.automation;
        if let Some(selector) = &self.wait_selector {
            automation.wait_selector = Some(selector.clone());
        }
        if !self.click_selectors.is_empty() {
            automation.click_selectors = self.click_selectors.clone();
        }
        if let Some(scrolls) = self.scrolls {
            automation.scrolls = scrolls;
        }
        if let Some(scroll_wait_ms) = self.scroll_wait_ms {
            automation.scroll_wait_ms = scroll_wait_ms;
        }
        if self.scroll_until_end {
            automation.scroll_until_end = true;
        }
        if let Some(code) = &self.eval_js {
            automation.script = Some(code.clone());
        }
        if let Some(path) = &self.eval_js_file {
            automation.script_file = Some(path.clone());
        }

        if self.tables {
            config.extraction.include_tables = true;
        }
    }

    /// Builds the effective configuration: defaults, then file, then flags
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                load_config(path)
                    .with_context(|| format!("Failed to load configuration {}", path.display()))?
            }
            None => Config::default(),
        };

        self.apply_overrides(&mut config);
        validate(&config).context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    validate_start_url(&cli.url).context("Invalid start URL")?;
    let config = cli.resolve_config()?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping crawl");
            interrupt.cancel();
        }
    });

    let crawler = Crawler::new(config, ChromeEngine::new()).context("Invalid configuration")?;

    let started = Instant::now();
    let results = crawler
        .scrape_with_cancel(&cli.url, cancel)
        .await
        .context("Crawl failed")?;

    let stdout = std::io::stdout();
    write_results(&mut stdout.lock(), &results).context("Failed to write results")?;

    if cli.stats {
        print_statistics(&CrawlStatistics::from_results(&results, started.elapsed()));
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout is reserved for results.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagewalker=info,warn"),
            1 => EnvFilter::new("pagewalker=debug,info"),
            2 => EnvFilter::new("pagewalker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
