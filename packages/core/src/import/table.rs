//! CSV import
//!
//! One row per item with the columns `Page, Tab, Section, Item, Content,
//! Sources`, preceded by a header row. Columns are read by position. Rows
//! missing any of the first four values are skipped. Tabs and sections are
//! matched by title within their parent, so rows can share them.

use super::builder::DocumentBuilder;
use super::error::ImportError;
use crate::models::{timestamp_now, ContentDocument};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

/// Expected header, in column order
pub const CSV_COLUMNS: [&str; 6] = ["Page", "Tab", "Section", "Item", "Content", "Sources"];

/// Parse CSV input into a document
pub fn parse_csv(input: &str) -> Result<ContentDocument, ImportError> {
    parse_csv_at(input, &timestamp_now())
}

/// Parse CSV input, stamping items and metadata with `now`
pub fn parse_csv_at(input: &str, now: &str) -> Result<ContentDocument, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ImportError::malformed(format!("unreadable header row: {}", e)))?;
    if headers.iter().all(str::is_empty) {
        return Err(ImportError::malformed("missing header row"));
    }
    let expected = headers
        .iter()
        .zip(CSV_COLUMNS)
        .all(|(header, column)| header.eq_ignore_ascii_case(column));
    if !expected {
        warn!(
            "CSV header {:?} differs from {:?}; reading columns by position",
            headers, CSV_COLUMNS
        );
    }

    let mut builder = DocumentBuilder::at(now);
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| {
            let line = e.position().map(|pos| pos.line() as usize);
            match line {
                Some(line) => ImportError::malformed_line(line, e.to_string()),
                None => ImportError::malformed(e.to_string()),
            }
        })?;

        if !add_row(&mut builder, &record) {
            skipped += 1;
        }
    }

    if skipped > 0 {
        warn!("Skipped {} CSV rows missing page, tab, section or item", skipped);
    }
    let doc = builder.finish();
    debug!("Parsed CSV into {} items", doc.item_count());
    Ok(doc)
}

/// Add one row; returns false when the row was skipped
fn add_row(builder: &mut DocumentBuilder, record: &StringRecord) -> bool {
    let column = |index: usize| record.get(index).unwrap_or("");
    let (page, tab, section, item) = (column(0), column(1), column(2), column(3));
    if page.is_empty() || tab.is_empty() || section.is_empty() || item.is_empty() {
        return false;
    }

    let Some(page) = builder.page(page) else {
        return false;
    };
    let tab = builder.tab_by_title(&page, tab);
    let section = builder.section_by_title(&page, tab, section);
    builder.push_item(&page, tab, section, item, column(4), Some(column(5)));
    true
}
