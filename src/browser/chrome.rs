//! Chromium implementation of the browser traits, over chromiumoxide

use super::{with_timeout, BrowserEngine, BrowserSession, PageHandle};
use crate::config::BrowserConfig;
use crate::{BrowserError, BrowserResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeLaunchConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Environment variable overriding the browser executable
const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

/// Interval between readiness probes
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Quiet period after which the network counts as idle
const NETWORK_QUIET_MS: u64 = 500;

/// Extra time allowed for the idle probe's own round trip
const PROBE_MARGIN: Duration = Duration::from_secs(1);

/// How long a closing session waits for the CDP handler task to finish
const HANDLER_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

const DOM_PARSED_SCRIPT: &str =
    "document.readyState !== 'loading' && location.href !== 'about:blank'";

/// Launches headless (or headed) Chromium with one incognito context per session
#[derive(Debug, Clone, Default)]
pub struct ChromeEngine;

impl ChromeEngine {
    pub fn new() -> Self {
        Self
    }

    fn launch_config(config: &BrowserConfig) -> BrowserResult<ChromeLaunchConfig> {
        let mut builder = ChromeLaunchConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Viewport::default()
            })
            .arg(format!("--user-agent={}", config.user_agent()))
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--mute-audio");

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(path) = resolve_executable(config) {
            tracing::debug!("Using browser executable {}", path.display());
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(BrowserError::Launch)
    }
}

/// Picks the executable: explicit configuration first, then `CHROMIUM_PATH`
///
/// Returns `None` to let chromiumoxide search the usual install locations.
fn resolve_executable(config: &BrowserConfig) -> Option<PathBuf> {
    if let Some(path) = &config.executable {
        return Some(path.clone());
    }

    let path = PathBuf::from(std::env::var(CHROMIUM_PATH_ENV).ok()?);
    if path.exists() {
        Some(path)
    } else {
        tracing::warn!(
            "{} points to a missing file: {}",
            CHROMIUM_PATH_ENV,
            path.display()
        );
        None
    }
}

#[async_trait]
impl BrowserEngine for ChromeEngine {
    type Session = ChromeSession;

    async fn launch(&self, config: &BrowserConfig) -> BrowserResult<ChromeSession> {
        let launch_config = Self::launch_config(config)?;

        let (mut browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler error: {}", e);
                }
            }
            tracing::debug!("Browser handler task completed");
        });

        let context = match browser.execute(CreateBrowserContextParams::default()).await {
            Ok(response) => response.result.browser_context_id,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    tracing::debug!("Closing browser after failed launch: {}", close_err);
                }
                handler_task.abort();
                return Err(BrowserError::Launch(format!(
                    "failed to create browsing context: {}",
                    e
                )));
            }
        };

        tracing::info!(
            "Browser launched ({}, viewport {}x{})",
            if config.headless { "headless" } else { "headed" },
            config.viewport_width,
            config.viewport_height
        );

        Ok(ChromeSession {
            browser,
            context,
            handler_task,
        })
    }
}

/// A launched Chromium process and the incognito context its pages share
pub struct ChromeSession {
    browser: Browser,
    context: BrowserContextId,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Page = ChromePage;

    async fn new_page(&self) -> BrowserResult<ChromePage> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(self.context.clone())
            .build()
            .map_err(BrowserError::Page)?;

        let page = self
            .browser
            .new_page(params)
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))?;

        Ok(ChromePage { page })
    }

    async fn close(mut self) -> BrowserResult<()> {
        let dispose = DisposeBrowserContextParams::new(self.context.clone());
        if let Err(e) = self.browser.execute(dispose).await {
            tracing::debug!("Failed to dispose browsing context: {}", e);
        }

        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Page(format!("failed to close browser: {}", e)));

        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for browser exit: {}", e);
        }
        join_handler(self.handler_task, HANDLER_JOIN_TIMEOUT).await;

        closed
    }
}

/// Waits for the CDP handler task to end, aborting it after `timeout`
///
/// Returns true if the task finished on its own.
async fn join_handler(mut handle: JoinHandle<()>, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::debug!("Browser handler task failed: {}", e);
            true
        }
        Err(_) => {
            tracing::debug!("Browser handler still running after {:?}, aborting", timeout);
            handle.abort();
            false
        }
    }
}

/// One Chromium tab
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    /// Polls a boolean expression until it evaluates to true
    ///
    /// Evaluation errors are expected while a navigation swaps documents and
    /// only end the wait through the caller's timeout.
    async fn poll_until(&self, expression: &str) -> BrowserResult<()> {
        loop {
            match self.page.evaluate(expression).await {
                Ok(result) => {
                    if result.value().and_then(|v| v.as_bool()) == Some(true) {
                        return Ok(());
                    }
                }
                Err(e) => tracing::trace!("Readiness probe failed: {}", e),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Resolves `{ ok: true }` once the resource count has been stable for the
/// quiet period and the document has finished loading
fn network_idle_script(timeout_ms: u64) -> String {
    format!(
        r#"(async () => {{
            const timeoutMs = {timeout_ms};
            const quietMs = {quiet_ms};
            const interval = 100;
            const start = Date.now();
            const count = () => {{
                try {{ return performance.getEntriesByType('resource').length; }} catch (_) {{ return 0; }}
            }};
            let lastCount = count();
            let stableMs = 0;
            while (Date.now() - start < timeoutMs) {{
                await new Promise(r => setTimeout(r, interval));
                const current = count();
                if (document.readyState === 'complete' && current === lastCount) {{
                    stableMs += interval;
                    if (stableMs >= quietMs) {{
                        return {{ ok: true }};
                    }}
                }} else {{
                    stableMs = 0;
                }}
                lastCount = current;
            }}
            return {{ ok: false }};
        }})()"#,
        timeout_ms = timeout_ms,
        quiet_ms = NETWORK_QUIET_MS
    )
}

#[async_trait]
impl PageHandle for ChromePage {
    async fn goto(&self, url: &str, timeout: Duration) -> BrowserResult<()> {
        with_timeout("Navigation", timeout, async {
            let response = self
                .page
                .execute(NavigateParams::new(url))
                .await
                .map_err(|e| BrowserError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

            if let Some(error_text) = response.result.error_text.as_ref() {
                if !error_text.is_empty() {
                    return Err(BrowserError::Navigation {
                        url: url.to_string(),
                        message: error_text.clone(),
                    });
                }
            }

            self.poll_until(DOM_PARSED_SCRIPT).await
        })
        .await
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        with_timeout("Wait for selector", timeout, async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return Ok(());
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await
    }

    async fn click(&self, selector: &str) -> BrowserResult<bool> {
        let element = match self.page.find_element(selector).await {
            Ok(element) => element,
            Err(_) => return Ok(false),
        };

        element
            .click()
            .await
            .map_err(|e| BrowserError::Page(format!("click on '{}' failed: {}", selector, e)))?;

        Ok(true)
    }

    async fn wait_for_dom_content_loaded(&self, timeout: Duration) -> BrowserResult<()> {
        with_timeout(
            "DOM content loaded",
            timeout,
            self.poll_until("document.readyState !== 'loading'"),
        )
        .await
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> BrowserResult<()> {
        let timeout_ms = timeout.as_millis() as u64;
        let script = network_idle_script(timeout_ms);

        let idle = with_timeout("Network idle", timeout + PROBE_MARGIN, async {
            let value = self.evaluate(&script).await?;
            Ok(value
                .as_ref()
                .and_then(|v| v.get("ok"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false))
        })
        .await?;

        if idle {
            Ok(())
        } else {
            Err(BrowserError::Timeout {
                operation: "Network idle".to_string(),
                timeout_ms,
            })
        }
    }

    async fn evaluate(&self, script: &str) -> BrowserResult<Option<serde_json::Value>> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;

        Ok(result.value().cloned())
    }

    async fn current_url(&self) -> BrowserResult<Option<String>> {
        self.page
            .url()
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))
    }

    async fn close(self) -> BrowserResult<()> {
        self.page
            .close()
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))
    }
}
