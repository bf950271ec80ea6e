//! In-page automation run between navigation and extraction
//!
//! Every step is best-effort: a missing selector, a failed scroll or a broken
//! custom script is logged and the visit carries on to extraction.

use crate::browser::PageHandle;
use crate::config::Config;
use crate::output::emit_warning;
use crate::scripts::{wrap_custom_script, PageScripts, ScrollParams};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Runs the configured wait, scroll, click and script steps on a page
pub struct PageAutomator {
    config: Arc<Config>,
    custom_script: OnceCell<Option<String>>,
}

impl PageAutomator {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            custom_script: OnceCell::new(),
        }
    }

    /// Applies all automation steps, in order, to a loaded page
    ///
    /// 1. Wait for the wait selector, if any
    /// 2. Scroll, if scrolling was requested
    /// 3. Click each click selector, pausing after each
    /// 4. Evaluate the custom script, if any
    pub async fn run_page_automation<P: PageHandle>(&self, page: &P) {
        let automation = &self.config.automation;

        if let Some(selector) = &automation.wait_selector {
            if let Err(e) = page
                .wait_for_selector(selector, self.config.timeouts.wait())
                .await
            {
                tracing::debug!("Gave up waiting for '{}': {}", selector, e);
            }
        }

        if automation.wants_scroll() {
            let params = ScrollParams::from_config(automation);
            if let Err(e) = page.scroll(&params).await {
                tracing::warn!("Scrolling failed: {}", e);
            }
        }

        for selector in &automation.click_selectors {
            self.click_and_settle(page, selector).await;
        }

        if let Some(source) = self.custom_script().await {
            if let Err(e) = page.evaluate(&wrap_custom_script(source)).await {
                emit_warning(&format!("eval_js failed: {}", e));
            }
        }
    }

    /// Clicks one selector and waits for the page to settle
    ///
    /// After a click the wait ends at network idle or the post-click timeout;
    /// when nothing was clicked the full post-click pause is taken instead.
    async fn click_and_settle<P: PageHandle>(&self, page: &P, selector: &str) {
        let post_click = self.config.timeouts.post_click();

        match page.click(selector).await {
            Ok(true) => {
                if let Err(e) = page.wait_for_network_idle(post_click).await {
                    tracing::debug!("No network idle after clicking '{}': {}", selector, e);
                }
            }
            Ok(false) => {
                tracing::debug!("Click selector '{}' matched nothing", selector);
                tokio::time::sleep(post_click).await;
            }
            Err(e) => {
                tracing::debug!("Click on '{}' failed: {}", selector, e);
                tokio::time::sleep(post_click).await;
            }
        }
    }

    /// Source of the custom script: inline text first, then the script file
    ///
    /// The file is read on first use and cached for the life of this
    /// automator, which the crawler creates afresh for every crawl. An
    /// unreadable file is reported once as a warning and treated as no script.
    async fn custom_script(&self) -> Option<&str> {
        self.custom_script
            .get_or_init(|| async {
                let automation = &self.config.automation;

                if let Some(inline) = automation.script.as_ref() {
                    if !inline.trim().is_empty() {
                        return Some(inline.clone());
                    }
                }

                let path = automation.script_file.as_ref()?;
                match tokio::fs::read_to_string(path).await {
                    Ok(source) if !source.trim().is_empty() => Some(source),
                    Ok(_) => None,
                    Err(e) => {
                        emit_warning(&format!(
                            "eval_js failed: cannot read {}: {}",
                            path.display(),
                            e
                        ));
                        None
                    }
                }
            })
            .await
            .as_deref()
    }
}
