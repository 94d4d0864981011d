//! # news_harvest
//!
//! Search-driven harvest of news articles from a single portal: submit a
//! search phrase, optionally narrow by category, then walk the paginated
//! results newest-first and keep every article published within a rolling
//! N-month window. Each kept row becomes an enriched record (phrase
//! occurrence count, currency-mention flag) with a deterministically named
//! thumbnail download.
//!
//! ## Architecture
//!
//! The run is a straight pipeline:
//! 1. **Probe**: one bounded visibility check; no results ends the run
//! 2. **Category**: optional linear label match, applied once
//! 3. **Cutoff**: the month count becomes a single calendar-aware timestamp
//! 4. **Walk**: the [`walker::ResultPageWalker`] state machine scans page by
//!    page, row by row, stopping at the first row older than the cutoff
//! 5. **Sinks**: the record list goes to a CSV table, thumbnails to disk
//!
//! The engine talks to the portal only through the
//! [`browser::BrowserSession`] trait; [`session::LiteSession`] is the
//! HTTP-backed implementation used by the binary.

pub mod browser;
pub mod category;
pub mod cli;
pub mod enrich;
pub mod error;
pub mod models;
pub mod outputs;
pub mod session;
pub mod walker;
pub mod window;

pub use browser::{BrowserSession, Selectors, Visibility};
pub use error::HarvestError;
pub use models::NewsRecord;
pub use walker::{ProbeOutcome, ResultPageWalker};
