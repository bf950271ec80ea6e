//! Per-page crawl records

use crate::scripts::Table;
use crate::state::VisitState;
use serde::{Deserialize, Serialize};

/// A cleaned, absolute, normalized outgoing link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub text: String,
}

impl Link {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// Everything extracted from one successfully loaded page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub text: String,
    pub links: Vec<Link>,
    pub tables: Option<Vec<Table>>,
}

/// Outcome of visiting one URL
///
/// A failed visit still produces a record: `error` is set and `text` and
/// `links` are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitResult {
    /// The normalized URL that was requested
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub text: String,
    pub links: Vec<Link>,

    /// Distance from the seed URL (seed = 0)
    pub depth: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<Table>>,
}

impl VisitResult {
    /// Builds the record of a successful visit
    pub fn success(url: impl Into<String>, depth: u32, content: PageContent) -> Self {
        Self {
            url: url.into(),
            error: None,
            text: content.text,
            links: content.links,
            depth,
            tables: content.tables,
        }
    }

    /// Builds the record of a failed visit
    pub fn failure(url: impl Into<String>, depth: u32, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: Some(error.into()),
            text: String::new(),
            links: Vec::new(),
            depth,
            tables: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Terminal state this record represents
    pub fn state(&self) -> VisitState {
        if self.is_success() {
            VisitState::Extracted
        } else {
            VisitState::Failed
        }
    }
}
