//! Page-side scripts and their typed wrappers
//!
//! The JavaScript sources are bundled at compile time. `PageScripts` runs them
//! through `PageHandle::evaluate` and decodes the returned JSON, so any page
//! implementation gets scrolling and extraction for free.

use crate::browser::PageHandle;
use crate::config::AutomationConfig;
use crate::{BrowserError, BrowserResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Collects visible text blocks, deduplicated by their first 200 characters
pub const EXTRACT_TEXT_SCRIPT: &str = include_str!("js/extract_text.js");

/// Collects `{href, text}` for every visible anchor with an `href`
pub const EXTRACT_LINKS_SCRIPT: &str = include_str!("js/extract_links.js");

/// Collects `{headers, rows}` for every visible table with content
pub const EXTRACT_TABLES_SCRIPT: &str = include_str!("js/extract_tables.js");

const SCROLL_TEMPLATE: &str = include_str!("js/scroll.js");

/// Stand-in for "no limit" when scrolling until the page stops growing
const UNBOUNDED_SCROLL_TRIES: u32 = 999_999;

/// Parameters of the scroll routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollParams {
    /// Number of scroll attempts; 0 means unbounded
    pub tries: u32,
    pub wait_ms: u64,
    /// Stop early once the document height is unchanged three times in a row
    pub until_stable: bool,
}

impl ScrollParams {
    pub fn from_config(automation: &AutomationConfig) -> Self {
        Self {
            tries: automation.scrolls,
            wait_ms: automation.scroll_wait_ms,
            until_stable: automation.scroll_until_end,
        }
    }

    /// Renders the scroll routine with these parameters filled in
    pub fn script(&self) -> String {
        let tries = if self.tries == 0 {
            UNBOUNDED_SCROLL_TRIES
        } else {
            self.tries
        };

        SCROLL_TEMPLATE
            .replace("__TRIES__", &tries.to_string())
            .replace("__WAIT_MS__", &self.wait_ms.to_string())
            .replace("__UNTIL_END__", if self.until_stable { "true" } else { "false" })
    }
}

/// Wraps user code in an async function so it may use `await` and `return`
pub fn wrap_custom_script(source: &str) -> String {
    format!("(async () => {{\n{}\n}})()", source)
}

/// An anchor as reported by the page, before cleaning
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawLink {
    #[serde(default)]
    pub href: Option<String>,

    #[serde(default)]
    pub text: Option<String>,
}

/// A visible table: header rows from `<thead>`, body rows from `<tbody>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub headers: Vec<Vec<String>>,

    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Scrolling and extraction routines available on every page
#[async_trait]
pub trait PageScripts {
    async fn scroll(&self, params: &ScrollParams) -> BrowserResult<()>;

    /// Visible text, one block per line
    async fn extract_text(&self) -> BrowserResult<String>;

    async fn extract_links(&self) -> BrowserResult<Vec<RawLink>>;

    async fn extract_tables(&self) -> BrowserResult<Vec<Table>>;
}

#[async_trait]
impl<P> PageScripts for P
where
    P: PageHandle + ?Sized,
{
    async fn scroll(&self, params: &ScrollParams) -> BrowserResult<()> {
        self.evaluate(&params.script()).await.map(|_| ())
    }

    async fn extract_text(&self) -> BrowserResult<String> {
        decode(self.evaluate(EXTRACT_TEXT_SCRIPT).await?)
    }

    async fn extract_links(&self) -> BrowserResult<Vec<RawLink>> {
        decode(self.evaluate(EXTRACT_LINKS_SCRIPT).await?)
    }

    async fn extract_tables(&self) -> BrowserResult<Vec<Table>> {
        decode(self.evaluate(EXTRACT_TABLES_SCRIPT).await?)
    }
}

/// Decodes a script's return value, treating `undefined` and `null` as empty
fn decode<T>(value: Option<serde_json::Value>) -> BrowserResult<T>
where
    T: DeserializeOwned + Default,
{
    match value {
        None | Some(serde_json::Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|e| BrowserError::Decode(e.to_string())),
    }
}
