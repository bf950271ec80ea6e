//! Content extraction from a loaded page
//!
//! Extraction waits (best-effort) for the page to settle, then collects the
//! visible text, the cleaned link list and, when enabled, visible tables.

use crate::browser::PageHandle;
use crate::config::Config;
use crate::crawler::{Link, PageContent};
use crate::scripts::{PageScripts, RawLink};
use crate::url::{absolutize, normalize_url};
use crate::BrowserResult;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on the network-idle wait before extraction
const NETWORK_IDLE_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Link targets that never lead to a crawlable page
const SKIPPED_HREF_PREFIXES: [&str; 4] = ["#", "javascript:", "mailto:", "tel:"];

pub struct ContentExtractor {
    config: Arc<Config>,
}

impl ContentExtractor {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Extracts text, links and optional tables from a page
    ///
    /// Relative links are resolved against the page's current URL, which
    /// reflects redirects; `requested_url` is the fallback when the page
    /// cannot report one.
    ///
    /// # Returns
    ///
    /// * `Ok(PageContent)` - Text and links were extracted
    /// * `Err(BrowserError)` - Text or link extraction failed
    pub async fn extract_content<P: PageHandle>(
        &self,
        page: &P,
        requested_url: &str,
    ) -> BrowserResult<PageContent> {
        if let Err(e) = page
            .wait_for_dom_content_loaded(self.config.timeouts.goto())
            .await
        {
            tracing::debug!("DOM content wait for {}: {}", requested_url, e);
        }
        if let Err(e) = page.wait_for_network_idle(NETWORK_IDLE_TIMEOUT).await {
            tracing::debug!("Network idle wait for {}: {}", requested_url, e);
        }

        let text = page.extract_text().await?;
        let raw_links = page.extract_links().await?;

        let base_url = match page.current_url().await {
            Ok(Some(url)) if !url.is_empty() => url,
            _ => requested_url.to_string(),
        };
        let links = clean_links(raw_links, &base_url);

        let tables = if self.config.extraction.include_tables {
            match page.extract_tables().await {
                Ok(tables) => Some(tables),
                Err(e) => {
                    tracing::warn!("Table extraction failed for {}: {}", requested_url, e);
                    None
                }
            }
        } else {
            None
        };

        Ok(PageContent {
            text,
            links,
            tables,
        })
    }
}

/// Turns raw anchors into absolute, normalized, deduplicated links
///
/// Empty hrefs and fragment, `javascript:`, `mailto:` and `tel:` targets are
/// dropped. Links are deduplicated by normalized href in first-seen order; a
/// later duplicate only contributes its text when the kept entry has none.
///
/// # Examples
///
/// ```
/// use pagewalker::crawler::clean_links;
/// use pagewalker::scripts::RawLink;
///
/// let raw = vec![
///     RawLink { href: Some("/docs".into()), text: Some(String::new()) },
///     RawLink { href: Some("/docs/".into()), text: Some("Docs".into()) },
/// ];
/// let links = clean_links(raw, "https://example.com/");
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].href, "https://example.com/docs");
/// assert_eq!(links[0].text, "Docs");
/// ```
pub fn clean_links(raw: impl IntoIterator<Item = RawLink>, base_url: &str) -> Vec<Link> {
    let mut links: Vec<Link> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for raw_link in raw {
        let href = raw_link.href.as_deref().unwrap_or_default().trim();
        if href.is_empty() || is_skipped_href(href) {
            continue;
        }

        let normalized = normalize_url(&absolutize(base_url, href));
        let text = raw_link.text.unwrap_or_default();

        match index.get(&normalized) {
            Some(&slot) => {
                if links[slot].text.is_empty() && !text.is_empty() {
                    links[slot].text = text;
                }
            }
            None => {
                index.insert(normalized.clone(), links.len());
                links.push(Link::new(normalized, text));
            }
        }
    }

    links
}

fn is_skipped_href(href: &str) -> bool {
    let lowered = href.to_ascii_lowercase();
    SKIPPED_HREF_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
}
