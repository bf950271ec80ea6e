//! Browser capability layer
//!
//! The crawler talks to a browser only through the traits in this module:
//! an engine launches one session per crawl, a session hands out pages, and a
//! page exposes the handful of primitives automation and extraction need.
//! `chrome` implements them over chromiumoxide; tests implement them over
//! in-memory fixtures.

mod chrome;

pub use chrome::{ChromeEngine, ChromePage, ChromeSession};

use crate::config::BrowserConfig;
use crate::{BrowserError, BrowserResult};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Launches browser sessions
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    type Session: BrowserSession;

    /// Starts one browser with one browsing context, configured for the crawl
    async fn launch(&self, config: &BrowserConfig) -> BrowserResult<Self::Session>;
}

/// A running browser plus the context shared by all pages of a crawl
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Page: PageHandle;

    /// Opens a blank page inside the session's context
    async fn new_page(&self) -> BrowserResult<Self::Page>;

    /// Releases the context, then the browser
    async fn close(self) -> BrowserResult<()>;
}

/// One open page (tab)
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigates and waits until the DOM has been parsed
    async fn goto(&self, url: &str, timeout: Duration) -> BrowserResult<()>;

    /// Waits until `selector` matches an element
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Clicks the first element matching `selector`
    ///
    /// Returns `Ok(false)` if nothing matched.
    async fn click(&self, selector: &str) -> BrowserResult<bool>;

    async fn wait_for_dom_content_loaded(&self, timeout: Duration) -> BrowserResult<()>;

    /// Waits until no new network activity has been seen for a short while
    async fn wait_for_network_idle(&self, timeout: Duration) -> BrowserResult<()>;

    /// Evaluates a script in the page and returns its JSON value, if any
    ///
    /// Promises are awaited.
    async fn evaluate(&self, script: &str) -> BrowserResult<Option<serde_json::Value>>;

    /// URL of the document currently loaded, after redirects
    async fn current_url(&self) -> BrowserResult<Option<String>>;

    async fn close(self) -> BrowserResult<()>;
}

/// Runs a browser operation with an explicit deadline
///
/// Returns `BrowserError::Timeout` naming the operation when the deadline
/// passes first.
pub async fn with_timeout<F, T>(operation: &str, timeout: Duration, future: F) -> BrowserResult<T>
where
    F: Future<Output = BrowserResult<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(BrowserError::Timeout {
            operation: operation.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
