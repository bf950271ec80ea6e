//! Configuration module for Pagewalker
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every field has a default, so a file only needs the keys it changes.
//!
//! # Example
//!
//! ```no_run
//! use pagewalker::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagewalker.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawl.depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AutomationConfig, BrowserConfig, Config, CrawlConfig, ExtractionConfig, TimeoutConfig,
    DEFAULT_USER_AGENT,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_start_url};
