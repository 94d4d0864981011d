//! The result-page walker: page-by-page, row-by-row harvest with a date
//! cutoff.
//!
//! This is the engine of the crate. The portal sorts search results newest
//! first, and the walker leans on that ordering: the first row older than the
//! cutoff is a definitive stop signal, not a skip. The rest of that page is
//! abandoned and no further page is fetched.
//!
//! # Shape
//!
//! The walk is an explicit state machine
//! (`FetchPage -> ScanRows -> Finished`) with the pagination continuation
//! carried as a 1-based [`PageToken`]. [`ResultPageWalker::next_record`]
//! is a lazy, non-restartable puller; [`ResultPageWalker::run`] drains it
//! into the final ordered record list.
//!
//! # Absorbed Failures
//!
//! Inside the walk, a row with an unreadable timestamp is skipped, a failed
//! thumbnail download is logged per record, and a missing or unclickable
//! next-page link is normal termination. Session-level failures propagate to
//! the caller's single log-and-cleanup boundary.
//!
//! A page with zero rows does not touch the stop flag: only an
//! out-of-window row can set it, so the walk advances past empty pages and
//! keeps going.

use crate::browser::{BrowserError, BrowserSession, Selectors, Visibility};
use crate::enrich::enrich;
use crate::error::HarvestError;
use crate::models::{NewsRecord, RawRow};
use crate::outputs::images::ImageSink;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::mem;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// How long each page gets to settle after a reload.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of the one-shot "are there any results at all" probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The results container became visible; the walk can start.
    Found,
    /// The container never appeared within the timeout.
    NotFound,
}

/// Check once, before the walk, whether the portal returned any results.
///
/// This is the only bounded wait in the run that is allowed to fail it:
/// [`ProbeOutcome::NotFound`] maps to [`HarvestError::NoResultsFound`] at the
/// call site. A mid-walk empty page is a different situation and handled by
/// the walker itself.
#[instrument(level = "info", skip(session, selectors))]
pub async fn probe_results<B: BrowserSession>(
    session: &mut B,
    selectors: &Selectors,
    timeout: Duration,
) -> Result<ProbeOutcome, BrowserError> {
    match session
        .wait_visible(&selectors.results_container, timeout)
        .await?
    {
        Visibility::Visible => Ok(ProbeOutcome::Found),
        Visibility::TimedOut => Ok(ProbeOutcome::NotFound),
    }
}

/// Pagination continuation: the 1-based number of the page being walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageToken(u32);

impl PageToken {
    /// The first results page.
    pub fn first() -> Self {
        PageToken(1)
    }

    /// The token for the following page.
    pub fn next(self) -> Self {
        PageToken(self.0 + 1)
    }

    /// The 1-based page number.
    pub fn number(self) -> u32 {
        self.0
    }
}

/// Per-field element handles for the current page, paired with rows by
/// index.
struct PageRows<H> {
    count: usize,
    dates: Vec<H>,
    titles: Vec<H>,
    descriptions: Vec<H>,
    images: Vec<H>,
}

enum Phase<H> {
    FetchPage(PageToken),
    ScanRows {
        page: PageToken,
        rows: PageRows<H>,
        next_row: usize,
    },
    Finished,
}

/// Drives the page-by-page, row-by-row scan of the search results.
pub struct ResultPageWalker<'a, B: BrowserSession, S: ImageSink> {
    session: &'a mut B,
    images: &'a mut S,
    selectors: &'a Selectors,
    cutoff: DateTime<Utc>,
    phrase: &'a str,
    // Set by the first out-of-window row, checked only at the page
    // boundary, untouched by empty pages.
    stop: bool,
    phase: Phase<B::Handle>,
}

impl<'a, B: BrowserSession, S: ImageSink> ResultPageWalker<'a, B, S> {
    /// Start a walk at page 1. Nothing is fetched until the first
    /// [`next_record`](Self::next_record) call.
    pub fn new(
        session: &'a mut B,
        images: &'a mut S,
        selectors: &'a Selectors,
        cutoff: DateTime<Utc>,
        phrase: &'a str,
    ) -> Self {
        ResultPageWalker {
            session,
            images,
            selectors,
            cutoff,
            phrase,
            stop: false,
            phase: Phase::FetchPage(PageToken::first()),
        }
    }

    /// Pull the next in-window record, fetching and advancing pages as
    /// needed. Returns `Ok(None)` once the walk is finished; the walk cannot
    /// be restarted afterwards.
    pub async fn next_record(&mut self) -> Result<Option<NewsRecord>, HarvestError> {
        loop {
            match mem::replace(&mut self.phase, Phase::Finished) {
                Phase::Finished => return Ok(None),
                Phase::FetchPage(page) => {
                    self.settle_page(page).await?;
                    let rows = self.read_page_rows().await?;
                    debug!(page = page.number(), rows = rows.count, "Scanning page");
                    self.phase = Phase::ScanRows {
                        page,
                        rows,
                        next_row: 0,
                    };
                }
                Phase::ScanRows {
                    page,
                    rows,
                    next_row,
                } => {
                    if next_row == rows.count {
                        if self.stop {
                            info!(page = page.number(), "Cutoff reached; walk complete");
                            return Ok(None);
                        }
                        if self.advance_to(page.next()).await? {
                            self.phase = Phase::FetchPage(page.next());
                        }
                        continue;
                    }

                    let index = next_row;
                    let Some(published_at) = self.read_timestamp(&rows.dates[index]).await? else {
                        warn!(
                            page = page.number(),
                            row = index + 1,
                            "Unreadable row timestamp; skipping row"
                        );
                        self.phase = Phase::ScanRows {
                            page,
                            rows,
                            next_row: index + 1,
                        };
                        continue;
                    };

                    if published_at < self.cutoff {
                        // Results are sorted newest first: everything after
                        // this row, on this page and beyond, is out of window.
                        debug!(
                            page = page.number(),
                            row = index + 1,
                            %published_at,
                            "Row predates cutoff"
                        );
                        self.stop = true;
                        let count = rows.count;
                        self.phase = Phase::ScanRows {
                            page,
                            rows,
                            next_row: count,
                        };
                        continue;
                    }

                    let raw = self.extract_row(&rows, index, published_at).await?;
                    let enrichment = enrich(&raw.title, &raw.description, self.phrase);
                    let record =
                        NewsRecord::from_raw(&raw, enrichment, page.number(), (index + 1) as u32);

                    if let Some(url) = &raw.image_url {
                        if let Err(e) = self.images.download(url, &record.image_name).await {
                            warn!(
                                error = %e,
                                url = %url,
                                image = %record.image_name,
                                "Thumbnail download failed; record kept"
                            );
                        }
                    }

                    self.phase = Phase::ScanRows {
                        page,
                        rows,
                        next_row: index + 1,
                    };
                    return Ok(Some(record));
                }
            }
        }
    }

    /// Drain the walk into the final ordered record list.
    #[instrument(level = "info", skip(self), fields(phrase = self.phrase, cutoff = %self.cutoff))]
    pub async fn run(mut self) -> Result<Vec<NewsRecord>, HarvestError> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        info!(count = records.len(), "Walk finished");
        Ok(records)
    }

    async fn settle_page(&mut self, page: PageToken) -> Result<(), BrowserError> {
        self.session.reload().await?;
        let visibility = self
            .session
            .wait_visible(&self.selectors.results_container, SETTLE_TIMEOUT)
            .await?;
        if visibility == Visibility::TimedOut {
            warn!(page = page.number(), "Results container slow to settle");
        }
        Ok(())
    }

    async fn read_page_rows(&mut self) -> Result<PageRows<B::Handle>, BrowserError> {
        let row_handles = self.session.query_all(&self.selectors.row).await?;
        let dates = self.session.query_all(&self.selectors.date).await?;
        let titles = self.session.query_all(&self.selectors.title).await?;
        let descriptions = self.session.query_all(&self.selectors.description).await?;
        let images = self.session.query_all(&self.selectors.image).await?;
        let count = row_handles.len().min(dates.len()).min(titles.len());
        if count < row_handles.len() {
            warn!(
                rows = row_handles.len(),
                dates = dates.len(),
                titles = titles.len(),
                "Row field selectors disagree; trailing rows dropped"
            );
        }
        Ok(PageRows {
            count,
            dates,
            titles,
            descriptions,
            images,
        })
    }

    async fn read_timestamp(
        &mut self,
        handle: &B::Handle,
    ) -> Result<Option<DateTime<Utc>>, BrowserError> {
        if let Some(attr) = self.session.get_attribute(handle, "datetime").await? {
            if let Some(ts) = parse_timestamp(&attr) {
                return Ok(Some(ts));
            }
        }
        let text = self.session.get_text(handle).await?;
        Ok(parse_timestamp(&text))
    }

    async fn extract_row(
        &mut self,
        rows: &PageRows<B::Handle>,
        index: usize,
        published_at: DateTime<Utc>,
    ) -> Result<RawRow, HarvestError> {
        let title = self.session.get_text(&rows.titles[index]).await?;
        let description = match rows.descriptions.get(index) {
            Some(handle) => self.session.get_text(handle).await?,
            None => String::new(),
        };
        let image_url = match rows.images.get(index) {
            Some(handle) => self.session.get_attribute(handle, "src").await?,
            None => None,
        };
        Ok(RawRow {
            title,
            description,
            published_at,
            image_url,
        })
    }

    /// Locate and click the pagination link for `next`. Absence of the link
    /// or a failed click both mean the results are exhausted, which ends the
    /// walk normally.
    async fn advance_to(&mut self, next: PageToken) -> Result<bool, BrowserError> {
        let wanted = next.number().to_string();
        let links = self.session.query_all(&self.selectors.page_link).await?;
        for link in links {
            let label = self.session.get_text(&link).await?;
            if label.trim() == wanted {
                return match self.session.click(&link).await {
                    Ok(()) => Ok(true),
                    Err(e) => {
                        warn!(page = next.number(), error = %e, "Page advance failed; ending walk");
                        Ok(false)
                    }
                };
            }
        }
        info!(page = next.number(), "No further pages");
        Ok(false)
    }
}

/// Parse a row timestamp in the handful of shapes the portal emits.
///
/// Tries RFC 3339, epoch seconds/milliseconds, then the common textual date
/// formats. Date-only values resolve to midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(n) = s.parse::<i64>() {
        // Millisecond timestamps are 13 digits until the year 33658.
        let ts = if n.abs() >= 1_000_000_000_000 {
            Utc.timestamp_millis_opt(n)
        } else {
            Utc.timestamp_opt(n, 0)
        };
        return ts.single();
    }
    for fmt in ["%B %d, %Y", "%b %d, %Y", "%m/%d/%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| Utc.from_utc_datetime(&dt));
        }
    }
    None
}
