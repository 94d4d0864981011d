//! HTTP-backed browser session for lite/text-style news portals.
//!
//! [`LiteSession`] implements [`BrowserSession`] with plain `reqwest` fetches
//! and `scraper` CSS queries, which is all a text-first portal needs: no
//! scripting, no real browser. "Clicking" an `href`-bearing element navigates
//! the session, and a visibility wait is a bounded re-fetch loop.
//!
//! Element handles are snapshots (text plus attributes) taken at query time,
//! so they stay valid across the borrow-heavy lifetime of a parsed document
//! and survive until the next navigation invalidates them logically.

use crate::browser::{BrowserError, BrowserSession, Visibility};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use url::Url;

/// How long to pause between visibility re-checks.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A detached snapshot of one matched element.
#[derive(Debug, Clone)]
pub struct ElementSnapshot {
    text: String,
    attrs: HashMap<String, String>,
}

/// Browser session over plain HTTP for portals that render server-side.
pub struct LiteSession {
    client: reqwest::Client,
    current_url: Url,
    html: String,
    closed: bool,
}

impl LiteSession {
    /// Open a session on the portal's search results for `phrase`.
    ///
    /// The initial navigation performs the search submission; everything
    /// after that goes through the [`BrowserSession`] surface.
    #[instrument(level = "info", skip(portal_url))]
    pub async fn open(portal_url: &str, phrase: &str) -> Result<Self, BrowserError> {
        let url = search_url(portal_url, phrase)?;
        let client = reqwest::Client::new();
        let html = fetch(&client, &url).await?;
        info!(url = %url, bytes = html.len(), "Opened search session");
        Ok(LiteSession {
            client,
            current_url: url,
            html,
            closed: false,
        })
    }

    /// The URL the session is currently on. Useful as a base for resolving
    /// relative links found on the page.
    pub fn current_url(&self) -> &Url {
        &self.current_url
    }

    fn ensure_open(&self) -> Result<(), BrowserError> {
        if self.closed {
            Err(BrowserError::Closed)
        } else {
            Ok(())
        }
    }

    fn snapshots(&self, selector: &str) -> Result<Vec<ElementSnapshot>, BrowserError> {
        let parsed = Selector::parse(selector)
            .map_err(|e| BrowserError::Element(format!("bad selector {selector:?}: {e}")))?;
        let document = Html::parse_document(&self.html);
        let snapshots = document
            .select(&parsed)
            .map(|element| ElementSnapshot {
                text: element.text().collect::<Vec<_>>().join(" ").trim().to_string(),
                attrs: element
                    .value()
                    .attrs()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            })
            .collect();
        Ok(snapshots)
    }

    async fn navigate(&mut self, url: Url) -> Result<(), BrowserError> {
        self.html = fetch(&self.client, &url).await?;
        debug!(url = %url, bytes = self.html.len(), "Navigated");
        self.current_url = url;
        Ok(())
    }
}

impl BrowserSession for LiteSession {
    type Handle = ElementSnapshot;

    async fn reload(&mut self) -> Result<(), BrowserError> {
        self.ensure_open()?;
        let url = self.current_url.clone();
        self.navigate(url).await
    }

    async fn wait_visible(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Visibility, BrowserError> {
        self.ensure_open()?;
        let deadline = Instant::now() + timeout;
        loop {
            if !self.snapshots(selector)?.is_empty() {
                return Ok(Visibility::Visible);
            }
            if Instant::now() >= deadline {
                return Ok(Visibility::TimedOut);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            let url = self.current_url.clone();
            self.navigate(url).await?;
        }
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementSnapshot>, BrowserError> {
        self.ensure_open()?;
        self.snapshots(selector)
    }

    async fn get_attribute(
        &mut self,
        handle: &ElementSnapshot,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        self.ensure_open()?;
        Ok(handle.attrs.get(name).cloned())
    }

    async fn get_text(&mut self, handle: &ElementSnapshot) -> Result<String, BrowserError> {
        self.ensure_open()?;
        Ok(handle.text.clone())
    }

    async fn click(&mut self, handle: &ElementSnapshot) -> Result<(), BrowserError> {
        self.ensure_open()?;
        let Some(href) = handle.attrs.get("href") else {
            return Err(BrowserError::Element(
                "clicked element has no href to follow".to_string(),
            ));
        };
        let target = self.current_url.join(href)?;
        self.navigate(target).await
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.closed = true;
        self.html.clear();
        info!("Session closed");
        Ok(())
    }
}

/// Build the portal's search URL for a phrase, newest first.
pub(crate) fn search_url(portal_url: &str, phrase: &str) -> Result<Url, url::ParseError> {
    let base = portal_url.trim_end_matches('/');
    Url::parse(&format!(
        "{}/search?q={}&sort=newest",
        base,
        urlencoding::encode(phrase)
    ))
}

async fn fetch(client: &reqwest::Client, url: &Url) -> Result<String, BrowserError> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(BrowserError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(html: &str) -> LiteSession {
        LiteSession {
            client: reqwest::Client::new(),
            current_url: Url::parse("https://portal.example.com/search?q=x").unwrap(),
            html: html.to_string(),
            closed: false,
        }
    }

    #[test]
    fn test_search_url_encodes_phrase() {
        let url = search_url("https://portal.example.com/", "climate change").unwrap();
        assert_eq!(
            url.as_str(),
            "https://portal.example.com/search?q=climate%20change&sort=newest"
        );
    }

    #[tokio::test]
    async fn test_query_text_and_attributes() {
        let mut session = session_with(
            r#"<div class="search-results">
                 <article class="result">
                   <h2 class="result__title">First <em>story</em></h2>
                   <img class="result__thumb" src="/img/a.jpg">
                 </article>
               </div>"#,
        );

        let titles = session.query_all(".result__title").await.unwrap();
        assert_eq!(titles.len(), 1);
        assert_eq!(session.get_text(&titles[0]).await.unwrap(), "First  story");

        let thumbs = session.query_all("img.result__thumb").await.unwrap();
        assert_eq!(
            session.get_attribute(&thumbs[0], "src").await.unwrap(),
            Some("/img/a.jpg".to_string())
        );
        assert_eq!(session.get_attribute(&thumbs[0], "alt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bad_selector_is_an_element_error() {
        let mut session = session_with("<p>hi</p>");
        let err = session.query_all(":::nope").await.unwrap_err();
        assert!(matches!(err, BrowserError::Element(_)));
    }

    #[tokio::test]
    async fn test_click_without_href_fails() {
        let mut session = session_with(r#"<span class="category-option">World</span>"#);
        let handles = session.query_all(".category-option").await.unwrap();
        let err = session.click(&handles[0]).await.unwrap_err();
        assert!(matches!(err, BrowserError::Element(_)));
    }

    #[tokio::test]
    async fn test_closed_session_refuses_queries() {
        let mut session = session_with("<p>hi</p>");
        session.close().await.unwrap();
        let err = session.query_all("p").await.unwrap_err();
        assert!(matches!(err, BrowserError::Closed));
    }
}
