//! Spreadsheet-style table output for the harvested records.
//!
//! The final record list is written as one CSV file with the columns
//! downstream consumers expect:
//!
//! ```text
//! Title, Description, Date, Image Name, Number of Search Phrase on info, Contains Currency
//! ```
//!
//! Rows appear in walk order, which is newest first.

use crate::error::HarvestError;
use crate::models::NewsRecord;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const HEADER: &str =
    "Title,Description,Date,Image Name,Number of Search Phrase on info,Contains Currency";

/// Write the record list as `fresh_news.csv` under `out_dir`.
///
/// Creates the directory if needed and returns the path of the written file.
#[instrument(level = "info", skip(records), fields(count = records.len()))]
pub async fn write_records(
    records: &[NewsRecord],
    out_dir: &Path,
) -> Result<PathBuf, HarvestError> {
    let mut table = String::with_capacity(records.len() * 128 + HEADER.len());
    table.push_str(HEADER);
    table.push('\n');
    for record in records {
        table.push_str(&render_row(record));
        table.push('\n');
    }

    fs::create_dir_all(out_dir).await?;
    let path = out_dir.join("fresh_news.csv");
    fs::write(&path, table).await?;
    info!(path = %path.display(), rows = records.len(), "Wrote results table");
    Ok(path)
}

fn render_row(record: &NewsRecord) -> String {
    [
        escape(&record.title),
        escape(&record.description),
        record.published_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        escape(&record.image_name),
        record.search_phrase_occurrences.to_string(),
        record.contains_currency.to_string(),
    ]
    .join(",")
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(title: &str, description: &str) -> NewsRecord {
        NewsRecord {
            title: title.to_string(),
            description: description.to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 6, 20, 10, 30, 0).unwrap(),
            image_name: "NewsImagePG1P1".to_string(),
            search_phrase_occurrences: 2,
            contains_currency: true,
        }
    }

    #[test]
    fn test_plain_row() {
        let row = render_row(&record("Simple title", "simple description"));
        assert_eq!(
            row,
            "Simple title,simple description,2024-06-20 10:30:00,NewsImagePG1P1,2,true"
        );
    }

    #[test]
    fn test_fields_with_commas_and_quotes_are_quoted() {
        let row = render_row(&record("Hello, world", r#"she said "hi""#));
        assert!(row.starts_with(r#""Hello, world","she said ""hi""","#));
    }

    #[tokio::test]
    async fn test_write_records_creates_file_with_header() {
        let dir = std::env::temp_dir().join("news_harvest_table_test");
        let _ = tokio::fs::remove_dir_all(&dir).await;

        let path = write_records(&[record("A", "B")], &dir).await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();

        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(
            lines.next(),
            Some("A,B,2024-06-20 10:30:00,NewsImagePG1P1,2,true")
        );
        assert_eq!(lines.next(), None);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
