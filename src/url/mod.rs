//! URL handling module for Pagewalker
//!
//! This module provides URL normalization for deduplication, host comparison
//! for domain scoping, relative reference resolution, and the binary-resource
//! filter applied before a link joins the frontier.
//!
//! None of these functions fail: malformed input falls back to a conservative
//! value so a bad link never aborts a crawl.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::{normalize_host, same_domain};
pub use filter::is_binary_resource;
pub use normalize::{absolutize, normalize_url};
