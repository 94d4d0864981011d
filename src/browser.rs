//! The browser-session capability surface the harvest engine drives.
//!
//! The walker never touches a DOM or an HTTP client directly; everything it
//! needs from the portal goes through [`BrowserSession`]. The crate ships one
//! implementation ([`crate::session::LiteSession`]) backed by plain HTTP
//! fetches, and the walker tests script their own.
//!
//! Handles returned by `query_all` are opaque to the engine: it only ever
//! hands them back to the same session for text/attribute reads or clicks.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a browser session.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// An HTTP request to the portal failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A URL could not be parsed or joined.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The portal returned an unexpected HTTP status.
    #[error("unexpected response status {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned it.
        url: String,
    },

    /// A selector did not compile or a handle was stale for this session.
    #[error("bad element reference: {0}")]
    Element(String),

    /// The session was used after `close`.
    #[error("session already closed")]
    Closed,
}

/// Result of a bounded visibility wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// The selector matched a visible element within the timeout.
    Visible,
    /// The timeout elapsed without a match.
    TimedOut,
}

/// Minimal browser capability surface required by the harvest engine.
///
/// All methods take `&mut self`: a session is a single sequential
/// conversation with the portal, and the walk depends on strictly in-order
/// interaction.
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    /// Opaque reference to an element previously returned by [`Self::query_all`].
    type Handle: Clone;

    /// Re-fetch/settle the current page.
    async fn reload(&mut self) -> Result<(), BrowserError>;

    /// Wait up to `timeout` for `selector` to match a visible element.
    async fn wait_visible(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Visibility, BrowserError>;

    /// All elements matching `selector`, in document order.
    async fn query_all(&mut self, selector: &str) -> Result<Vec<Self::Handle>, BrowserError>;

    /// Read an attribute from an element; `None` when absent.
    async fn get_attribute(
        &mut self,
        handle: &Self::Handle,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    /// Read the visible text of an element.
    async fn get_text(&mut self, handle: &Self::Handle) -> Result<String, BrowserError>;

    /// Click an element. For link-like elements this navigates the session.
    async fn click(&mut self, handle: &Self::Handle) -> Result<(), BrowserError>;

    /// Tear the session down. Must be safe to call on every exit path.
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// CSS hooks for the portal's search-results markup.
///
/// Field-level selectors (`date`, `title`, `description`, `image`) are
/// queried per page and paired with result rows by index, so they must yield
/// one element per row, in the same document order as `row`.
#[derive(Debug, Clone)]
pub struct Selectors {
    /// Container that becomes visible once results have loaded.
    pub results_container: String,
    /// One search-result row.
    pub row: String,
    /// The row's publish timestamp element.
    pub date: String,
    /// The row's headline element.
    pub title: String,
    /// The row's description element.
    pub description: String,
    /// The row's thumbnail `<img>`.
    pub image: String,
    /// Numbered pagination links.
    pub page_link: String,
    /// Category filter options; their text is matched against the requested
    /// category.
    pub category_option: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            results_container: ".search-results".to_string(),
            row: ".search-results article.result".to_string(),
            date: ".search-results article.result time".to_string(),
            title: ".search-results article.result .result__title".to_string(),
            description: ".search-results article.result .result__description".to_string(),
            image: ".search-results article.result img.result__thumb".to_string(),
            page_link: ".pagination a.page-link".to_string(),
            category_option: ".search-filters .category-option".to_string(),
        }
    }
}
