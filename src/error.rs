//! The error taxonomy for a harvest run.
//!
//! Only genuinely terminal conditions are errors. A category that doesn't
//! match, a pagination link that doesn't exist, or a thumbnail that fails to
//! download are all outcomes the run absorbs and logs; they never surface
//! here.

use crate::browser::BrowserError;
use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The initial results-visibility probe timed out: the portal has no
    /// results for the search phrase. Terminal for the whole run.
    #[error("no news found for search phrase {phrase:?}")]
    NoResultsFound {
        /// The phrase that produced no results.
        phrase: String,
    },

    /// The browser session failed mid-walk.
    #[error("browser session error: {0}")]
    Browser(#[from] BrowserError),

    /// Writing an output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A work-item file did not contain valid JSON.
    #[error("invalid work item: {0}")]
    WorkItem(#[from] serde_json::Error),
}
