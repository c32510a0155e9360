//! Line-oriented outline import
//!
//! ```text
//! # PAGE: Caregiver
//! ## TAB: Financial Support
//! ### SECTION: Government Programs
//! #### ITEM: Medicare Benefits
//! Content lines go here.
//! Sources: https://www.medicare.gov
//! ---
//! ```
//!
//! Headings open a node under the most recent parent. Non-blank lines after
//! an ITEM heading accumulate as its content; `Sources:` sets its sources
//! (the last one wins); `---` or the next heading closes it.

use super::builder::DocumentBuilder;
use super::error::ImportError;
use crate::models::{timestamp_now, ContentDocument};
use tracing::debug;

const PAGE_MARKER: &str = "# PAGE:";
const TAB_MARKER: &str = "## TAB:";
const SECTION_MARKER: &str = "### SECTION:";
const ITEM_MARKER: &str = "#### ITEM:";
const SOURCES_MARKER: &str = "Sources:";
const ITEM_TERMINATOR: &str = "---";

struct OpenItem {
    title: String,
    content: String,
    sources: Option<String>,
}

#[derive(Default)]
struct Cursor {
    page: Option<String>,
    tab: Option<usize>,
    section: Option<usize>,
    item: Option<OpenItem>,
}

impl Cursor {
    fn close_item(&mut self, builder: &mut DocumentBuilder) {
        let Some(item) = self.item.take() else {
            return;
        };
        if let (Some(page), Some(tab), Some(section)) = (&self.page, self.tab, self.section) {
            builder.push_item(
                page,
                tab,
                section,
                &item.title,
                item.content.trim(),
                item.sources.as_deref(),
            );
        }
    }
}

/// Parse an outline into a document
pub fn parse_outline(input: &str) -> Result<ContentDocument, ImportError> {
    parse_outline_at(input, &timestamp_now())
}

/// Parse an outline, stamping items and metadata with `now`
pub fn parse_outline_at(input: &str, now: &str) -> Result<ContentDocument, ImportError> {
    let mut builder = DocumentBuilder::at(now);
    let mut cursor = Cursor::default();

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();

        if let Some(name) = trimmed.strip_prefix(PAGE_MARKER) {
            cursor.close_item(&mut builder);
            let page = builder.page(name).ok_or_else(|| {
                ImportError::malformed_line(line_number, "PAGE name has no letters or digits")
            })?;
            cursor.page = Some(page);
            cursor.tab = None;
            cursor.section = None;
        } else if let Some(title) = trimmed.strip_prefix(TAB_MARKER) {
            cursor.close_item(&mut builder);
            let page = cursor
                .page
                .as_deref()
                .ok_or_else(|| ImportError::malformed_line(line_number, "TAB before any PAGE"))?;
            cursor.tab = Some(builder.push_tab(page, title.trim()));
            cursor.section = None;
        } else if let Some(title) = trimmed.strip_prefix(SECTION_MARKER) {
            cursor.close_item(&mut builder);
            let (Some(page), Some(tab)) = (cursor.page.as_deref(), cursor.tab) else {
                return Err(ImportError::malformed_line(
                    line_number,
                    "SECTION before any TAB",
                ));
            };
            cursor.section = Some(builder.push_section(page, tab, title.trim()));
        } else if let Some(title) = trimmed.strip_prefix(ITEM_MARKER) {
            cursor.close_item(&mut builder);
            if cursor.section.is_none() {
                return Err(ImportError::malformed_line(
                    line_number,
                    "ITEM before any SECTION",
                ));
            }
            cursor.item = Some(OpenItem {
                title: title.trim().to_string(),
                content: String::new(),
                sources: None,
            });
        } else if let Some(sources) = trimmed.strip_prefix(SOURCES_MARKER) {
            if let Some(item) = cursor.item.as_mut() {
                item.sources = Some(sources.trim().to_string());
            }
        } else if trimmed == ITEM_TERMINATOR {
            cursor.close_item(&mut builder);
        } else if !trimmed.is_empty() {
            if let Some(item) = cursor.item.as_mut() {
                item.content.push_str(line);
                item.content.push('\n');
            }
        }
    }
    cursor.close_item(&mut builder);

    let doc = builder.finish();
    debug!("Parsed outline into {} items", doc.item_count());
    Ok(doc)
}
