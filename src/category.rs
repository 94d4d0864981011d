//! Optional category narrowing, applied once before the walk begins.
//!
//! The portal exposes a short list of category filters. Matching is a linear
//! case-insensitive scan over their labels; failing to match is an outcome,
//! not an error, and the run simply continues unfiltered.

use crate::browser::{BrowserError, BrowserSession, Selectors};
use tracing::{info, instrument, warn};

/// Whether a category filter was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOutcome {
    /// A matching option was found and clicked.
    Selected,
    /// No option matched; the run proceeds without a filter.
    NotMatched,
}

/// Pick the first option whose label matches `wanted`.
///
/// Labels are compared trimmed and case-insensitively, in order. The first
/// blank label is treated as an end-of-list sentinel: scanning stops there
/// without selecting.
pub fn select<'a, H>(options: &'a [(String, H)], wanted: &str) -> Option<&'a H> {
    let wanted = wanted.trim().to_lowercase();
    for (label, handle) in options {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        if label.to_lowercase() == wanted {
            return Some(handle);
        }
    }
    None
}

/// Read the portal's category options and click the one matching `wanted`.
#[instrument(level = "info", skip(session, selectors))]
pub async fn apply_category<B: BrowserSession>(
    session: &mut B,
    selectors: &Selectors,
    wanted: &str,
) -> Result<CategoryOutcome, BrowserError> {
    let handles = session.query_all(&selectors.category_option).await?;
    let mut options = Vec::with_capacity(handles.len());
    for handle in handles {
        let label = session.get_text(&handle).await?;
        options.push((label, handle));
    }

    match select(&options, wanted) {
        Some(handle) => {
            let handle = handle.clone();
            session.click(&handle).await?;
            info!(category = wanted, "Category filter applied");
            Ok(CategoryOutcome::Selected)
        }
        None => {
            warn!(category = wanted, "Category not offered; continuing unfiltered");
            Ok(CategoryOutcome::NotMatched)
        }
    }
}
