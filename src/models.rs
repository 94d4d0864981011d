//! Data models for harvested news results.
//!
//! This module defines the core value types produced by a harvest run:
//! - [`RawRow`]: the unprocessed text and image reference read from one
//!   search-result row
//! - [`NewsRecord`]: the finished, enriched record appended to the output
//!   sequence
//!
//! A [`NewsRecord`] is constructed exactly once, from a [`RawRow`] plus its
//! [`Enrichment`], and never mutated afterward. The final record list is
//! ordered newest-first because the portal's results are sorted that way and
//! the walker trusts that ordering.

use crate::enrich::Enrichment;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The raw fields extracted from one search-result row before enrichment.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// The row's headline text.
    pub title: String,
    /// The row's description/teaser text; empty when the portal omits it.
    pub description: String,
    /// Publish timestamp as read from the row.
    pub published_at: DateTime<Utc>,
    /// Source URL of the row's thumbnail image, if the row carries one.
    pub image_url: Option<String>,
}

/// One finished harvest record.
///
/// Every record in a run's output satisfies `published_at >= cutoff`, and the
/// sequence is produced in non-increasing `published_at` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsRecord {
    /// The article headline.
    pub title: String,
    /// The article description; may be empty.
    pub description: String,
    /// Publish timestamp of the article.
    pub published_at: DateTime<Utc>,
    /// Deterministic thumbnail name, assigned before download.
    pub image_name: String,
    /// Occurrences of the search phrase across title and description.
    pub search_phrase_occurrences: u32,
    /// Whether the title or description mentions a dollar amount.
    pub contains_currency: bool,
}

impl NewsRecord {
    /// Build a record from a raw row and its enrichment.
    ///
    /// `page` and `row` are the 1-based coordinates of the row within the
    /// walk; they only feed the deterministic image name.
    pub fn from_raw(raw: &RawRow, enrichment: Enrichment, page: u32, row: u32) -> Self {
        NewsRecord {
            title: raw.title.clone(),
            description: raw.description.clone(),
            published_at: raw.published_at,
            image_name: image_name(page, row),
            search_phrase_occurrences: enrichment.occurrences,
            contains_currency: enrichment.has_currency,
        }
    }
}

/// Deterministic thumbnail name for the row at 1-based (page, row).
///
/// The name identifies the position in the walk, not the image content, so
/// re-running the same query overwrites rather than accumulates.
pub fn image_name(page: u32, row: u32) -> String {
    format!("NewsImagePG{page}P{row}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use chrono::TimeZone;

    #[test]
    fn test_image_name_format() {
        assert_eq!(image_name(1, 1), "NewsImagePG1P1");
        assert_eq!(image_name(3, 12), "NewsImagePG3P12");
    }

    #[test]
    fn test_record_from_raw() {
        let raw = RawRow {
            title: "Dollar hits $1.05 against euro".to_string(),
            description: "The dollar climbed again".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            image_url: Some("https://example.com/thumb.jpg".to_string()),
        };
        let enrichment = enrich(&raw.title, &raw.description, "dollar");
        let record = NewsRecord::from_raw(&raw, enrichment, 2, 4);

        assert_eq!(record.title, raw.title);
        assert_eq!(record.description, raw.description);
        assert_eq!(record.published_at, raw.published_at);
        assert_eq!(record.image_name, "NewsImagePG2P4");
        assert_eq!(record.search_phrase_occurrences, 2);
        assert!(record.contains_currency);
    }

    #[test]
    fn test_record_serializes() {
        let record = NewsRecord {
            title: "Title".to_string(),
            description: "Desc".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            image_name: "NewsImagePG1P1".to_string(),
            search_phrase_occurrences: 0,
            contains_currency: false,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("NewsImagePG1P1"));
        assert!(json.contains("2024-05-01"));
    }
}
