//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitState`: lifecycle of a single frontier entry (queued, visiting,
//!   extracted, failed)

mod visit_state;

// Re-export main types
pub use visit_state::VisitState;
