//! Row enrichment: derived fields computed from a result's text.
//!
//! Each harvested row carries two derived values alongside the raw text:
//! how many times the search phrase occurs across the title and description,
//! and whether either of them mentions a dollar amount.
//!
//! # Currency Pattern
//!
//! Only USD forms are recognized:
//! - `$` followed by an amount with optional thousands separators and an
//!   optional 1-2 digit decimal part (`$11`, `$111,111.11`)
//! - a 1-3 digit number followed by the whole word `dollars` or `USD`
//!   (`11 dollars`, `100 USD`)
//!
//! A bare number (`100`) is not a currency mention.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$\d+(?:,\d{3})*(?:\.\d{1,2})?|\b\d{1,3}\s?(?:dollars|USD)\b")
        .expect("currency pattern is valid")
});

/// Derived fields for one result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enrichment {
    /// Non-overlapping, case-insensitive occurrences of the search phrase
    /// across title and description.
    pub occurrences: u32,
    /// Whether the title or description mentions a dollar amount.
    pub has_currency: bool,
}

/// Compute the derived fields for one (title, description) pair.
///
/// The occurrence count sums a case-insensitive, non-overlapping substring
/// count over the title and the description. The currency flag is evaluated
/// independently against each text; a match in either sets it.
///
/// An empty phrase is out-of-contract input and counts as zero occurrences.
pub fn enrich(title: &str, description: &str, phrase: &str) -> Enrichment {
    let occurrences = count_occurrences(title, phrase) + count_occurrences(description, phrase);
    let has_currency = CURRENCY_RE.is_match(title) || CURRENCY_RE.is_match(description);
    trace!(occurrences, has_currency, "Enriched row text");
    Enrichment {
        occurrences,
        has_currency,
    }
}

fn count_occurrences(text: &str, phrase: &str) -> u32 {
    if phrase.is_empty() {
        return 0;
    }
    let text = text.to_lowercase();
    let phrase = phrase.to_lowercase();
    text.matches(&phrase).count() as u32
}
