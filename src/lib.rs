//! Pagewalker: a breadth-first crawler driven by a headless browser
//!
//! This crate visits pages from a seed URL under depth, page-count and
//! concurrency limits, runs configurable in-page automation (scrolling,
//! clicking, custom scripts), and extracts visible text and links. The crawl
//! stays on the seed's domain and skips binary resources.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod scripts;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Pagewalker operations
#[derive(Debug, Error)]
pub enum WalkerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised by the browser capability layer
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Page error: {0}")]
    Page(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Script error: {0}")]
    Script(String),

    #[error("Unexpected script result: {0}")]
    Decode(String),

    #[error("crawl cancelled")]
    Cancelled,
}

/// Result type alias for Pagewalker operations
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for browser operations
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, Link, VisitResult};
pub use state::VisitState;
pub use url::{absolutize, normalize_host, normalize_url, same_domain};
