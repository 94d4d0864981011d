//! Command-line interface and run configuration.
//!
//! The three harvest inputs (`searchPhrase`, `newsCategory`,
//! `numberOfMonths`) can come from flags or from a work-item JSON file of
//! the shape produced by RPA-style queue items:
//!
//! ```json
//! { "searchPhrase": "climate", "newsCategory": "World", "numberOfMonths": 2 }
//! ```
//!
//! Flags win; the work item fills in whatever the flags leave at their
//! defaults.

use crate::error::HarvestError;
use clap::Parser;
use serde::Deserialize;
use tokio::fs;
use tracing::debug;

/// Command-line arguments for the news harvester.
///
/// # Examples
///
/// ```sh
/// # Search a portal for a phrase over the default one-month window
/// news_harvest -p https://portal.example.com -s "climate change"
///
/// # Narrow by category, widen the window, take inputs from a work item
/// news_harvest -p https://portal.example.com -w ./work-item.json -c World -n 3
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Base URL of the news portal to search
    #[arg(short, long, env = "NEWS_PORTAL_URL")]
    pub portal_url: String,

    /// Search phrase to submit
    #[arg(short, long, default_value = "")]
    pub search_phrase: String,

    /// Category to narrow by; empty means no filtering
    #[arg(short = 'c', long, default_value = "")]
    pub news_category: String,

    /// Harvest window in calendar months; 0 means one month
    #[arg(short = 'n', long, default_value_t = 0)]
    pub number_of_months: u32,

    /// Directory for the results table and thumbnails
    #[arg(short, long, default_value = "./output")]
    pub output_dir: String,

    /// Optional work-item JSON file supplying any inputs not given as flags
    #[arg(short, long)]
    pub work_item: Option<String>,

    /// Skip thumbnail downloads
    #[arg(long)]
    pub skip_images: bool,
}

/// Inputs read from a work-item JSON file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkItem {
    #[serde(rename = "searchPhrase")]
    pub search_phrase: Option<String>,
    #[serde(rename = "newsCategory")]
    pub news_category: Option<String>,
    #[serde(rename = "numberOfMonths")]
    pub number_of_months: Option<u32>,
}

/// Load a work item from a JSON file.
pub async fn load_work_item(path: &str) -> Result<WorkItem, HarvestError> {
    let raw = fs::read_to_string(path).await?;
    let item: WorkItem = serde_json::from_str(&raw)?;
    debug!(path, ?item, "Loaded work item");
    Ok(item)
}

/// The resolved harvest inputs for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Phrase submitted to the portal search. Required but may be empty.
    pub search_phrase: String,
    /// Category to narrow by; empty skips category selection.
    pub news_category: String,
    /// Window length in calendar months; 0 defaults to 1 downstream.
    pub number_of_months: u32,
}

impl RunConfig {
    /// Merge CLI flags with an optional work item. A flag left at its
    /// default defers to the work item's value.
    pub fn resolve(cli: &Cli, work_item: Option<WorkItem>) -> RunConfig {
        let item = work_item.unwrap_or_default();
        let search_phrase = if cli.search_phrase.is_empty() {
            item.search_phrase.unwrap_or_default()
        } else {
            cli.search_phrase.clone()
        };
        let news_category = if cli.news_category.is_empty() {
            item.news_category.unwrap_or_default()
        } else {
            cli.news_category.clone()
        };
        let number_of_months = if cli.number_of_months == 0 {
            item.number_of_months.unwrap_or(0)
        } else {
            cli.number_of_months
        };
        RunConfig {
            search_phrase,
            news_category,
            number_of_months,
        }
    }
}
