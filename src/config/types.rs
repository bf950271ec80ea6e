use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Pagewalker/0.1)";

/// Main configuration structure for Pagewalker
///
/// Built once (from defaults, a TOML file, and command-line flags) and then
/// shared read-only by every component.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub timeouts: TimeoutConfig,
    pub browser: BrowserConfig,
    pub automation: AutomationConfig,
    pub extraction: ExtractionConfig,
}

/// Crawl bounds and scheduling
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CrawlConfig {
    /// Maximum link depth from the seed (0 = seed page only)
    pub depth: u32,

    /// Safety cap on the number of pages visited
    pub max_pages: usize,

    /// Maximum number of pages open at once
    pub concurrency: usize,

    /// Number of visits scheduled before the frontier is expanded
    pub batch_size: usize,

    /// Pause after each successful visit (milliseconds)
    pub delay_ms: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            depth: 0,
            max_pages: 50,
            concurrency: 5,
            batch_size: 10,
            delay_ms: 500,
        }
    }
}

impl CrawlConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Navigation and waiting timeouts, all in milliseconds
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TimeoutConfig {
    pub goto_ms: u64,
    pub wait_ms: u64,
    pub post_click_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            goto_ms: 30_000,
            wait_ms: 15_000,
            post_click_ms: 2_000,
        }
    }
}

impl TimeoutConfig {
    pub fn goto(&self) -> Duration {
        Duration::from_millis(self.goto_ms)
    }

    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    pub fn post_click(&self) -> Duration {
        Duration::from_millis(self.post_click_ms)
    }
}

/// Browser presentation
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,

    /// User agent override
    pub user_agent: Option<String>,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Explicit Chrome/Chromium executable; auto-detected when unset
    pub executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: None,
            viewport_width: 1366,
            viewport_height: 900,
            executable: None,
        }
    }
}

impl BrowserConfig {
    /// Returns the configured user agent, or the crate default
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// In-page automation run before extraction
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AutomationConfig {
    /// Selector to wait for before anything else
    pub wait_selector: Option<String>,

    /// Selectors clicked in order
    pub click_selectors: Vec<String>,

    /// Number of scroll attempts (0 = unbounded when `scroll_until_end` is set)
    pub scrolls: u32,

    /// Pause between scroll attempts (milliseconds)
    pub scroll_wait_ms: u64,

    /// Stop scrolling once the page height stops growing
    pub scroll_until_end: bool,

    /// Inline script source; takes precedence over `script_file`
    pub script: Option<String>,

    /// Path to a script file
    pub script_file: Option<PathBuf>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            wait_selector: None,
            click_selectors: Vec::new(),
            scrolls: 0,
            scroll_wait_ms: 1_000,
            scroll_until_end: false,
            script: None,
            script_file: None,
        }
    }
}

impl AutomationConfig {
    /// Returns true if any scrolling was requested
    pub fn wants_scroll(&self) -> bool {
        self.scrolls > 0 || self.scroll_until_end
    }
}

/// Extraction toggles
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Attach visible tables to each result
    pub include_tables: bool,
}
