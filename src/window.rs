//! Date-window calculation for the harvest cutoff.
//!
//! A harvest run keeps every article published within a rolling window of
//! N calendar months ending now. This module turns the month count from the
//! work item into the single cutoff timestamp the walker compares rows
//! against.
//!
//! # Month Semantics
//!
//! The subtraction is calendar-aware, not `N * 30` days: going back one month
//! from March 31 lands on the last day of February. A month count of `0`
//! means "no window specified" and defaults to one month rather than an
//! unbounded harvest.

use chrono::{DateTime, Months, Utc};
use tracing::debug;

/// Compute the cutoff timestamp relative to an explicit reference time.
///
/// Pure and deterministic; the CLI path goes through [`calculate_cutoff`],
/// which pins the reference to `Utc::now()`.
///
/// # Arguments
///
/// * `now` - The reference "current time" the window ends at
/// * `months` - Window length in calendar months; `0` is treated as `1`
///
/// # Returns
///
/// The earliest publish timestamp still eligible for inclusion.
pub fn cutoff_from(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let effective_months = if months == 0 { 1 } else { months };
    // checked_sub_months clamps day-of-month overflow to the target month's
    // last day. The None case only exists at the edge of chrono's date range.
    let cutoff = now
        .checked_sub_months(Months::new(effective_months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    debug!(%now, months, effective_months, %cutoff, "Computed cutoff date");
    cutoff
}

/// Compute the cutoff for a run starting now.
pub fn calculate_cutoff(months: u32) -> DateTime<Utc> {
    cutoff_from(Utc::now(), months)
}
