/// Visit state definitions for tracking one frontier entry through a crawl
///
/// Every dequeued URL moves `Queued -> Visiting -> (Extracted | Failed)` and
/// is terminal once its visit result is recorded.
use std::fmt;

/// Represents the current state of a URL taken from the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitState {
    /// Scheduled in the current batch, waiting for a concurrency slot
    Queued,

    /// A page is open and being navigated, automated or extracted
    Visiting,

    /// Text and links were extracted successfully
    Extracted,

    /// Navigation, extraction or page setup failed (or the crawl was cancelled)
    Failed,
}

impl VisitState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Extracted | Self::Failed)
    }

    /// Returns true if this represents a successful visit
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted)
    }

    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// A queued visit may fail without ever opening a page (cancellation, no
    /// page available), so `Queued -> Failed` is valid.
    pub fn can_transition_to(&self, next: VisitState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Visiting)
                | (Self::Queued, Self::Failed)
                | (Self::Visiting, Self::Extracted)
                | (Self::Visiting, Self::Failed)
        )
    }

    /// Returns the lowercase name of this state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Visiting => "visiting",
            Self::Extracted => "extracted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
