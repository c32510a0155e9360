//! Document Format Migration
//!
//! Converts raw JSON in any of the shapes the system has used into the current
//! nested [`ContentDocument`].
//!
//! ## Shapes
//!
//! - **Current**: `{ pages: { <pageId>: Page }, metadata }`. Passed through
//!   untouched.
//! - **PageKeyed**: `{ caregiver: { tabs: [...] }, carerecipient: { tabs: [...] } }`,
//!   the shape written by the bulk importer and old database dumps. Tabs
//!   are taken as stored and renumbered.
//! - **Legacy** (pre-2.0): `{ caregiver: { <tabId>: { sectionTitle,
//!   parentHeaders: [{ id, title, childHeaders: [...] }] } } }`. Tabs come from
//!   the page object's entries in stored key order, sections from
//!   `parentHeaders`, items from `childHeaders`.
//!
//! Shape is detected before conversion, so normalizing an already-current
//! document is the identity.
//!
//! ## Example
//!
//! ```rust
//! use carehub_core::services::FormatMigrator;
//! use serde_json::json;
//!
//! let legacy = json!({
//!     "caregiver": {
//!         "tabA": {
//!             "sectionTitle": "Money",
//!             "parentHeaders": [{
//!                 "id": "p1",
//!                 "title": "Gov",
//!                 "childHeaders": [{"id": "c1", "title": "Medicare", "content": "..."}]
//!             }]
//!         }
//!     }
//! });
//!
//! let doc = FormatMigrator::migrate_legacy_at(&legacy, "2024-01-01T00:00:00.000Z")?;
//! let tab = &doc.pages["caregiver"].tabs[0];
//! assert_eq!(tab.title, "Money");
//! assert_eq!(tab.sections[0].items[0].title, "Medicare");
//! # Ok::<(), carehub_core::services::MigrationError>(())
//! ```

use crate::models::{
    timestamp_now, ContentDocument, ContentItem, ContentMetadata, Page, Section, Tab,
    CONTENT_SCHEMA_VERSION, KNOWN_PAGES,
};
use crate::operations::TreeOperations;
use crate::services::error::MigrationError;
use crate::utils::{unique_id, unique_slug};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Recognised shapes of a stored or imported document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    Current,
    PageKeyed,
    Legacy,
}

/// Shape detection and conversion to [`ContentDocument`]
pub struct FormatMigrator;

impl FormatMigrator {
    /// Detect the shape of a raw document
    pub fn detect(value: &Value) -> Result<DocumentShape, MigrationError> {
        let object = value
            .as_object()
            .ok_or_else(|| MigrationError::unrecognized_shape("document is not a JSON object"))?;

        if object.get("pages").is_some_and(Value::is_object) {
            return Ok(DocumentShape::Current);
        }

        let page_objects = || object.values().filter_map(Value::as_object);

        if page_objects().any(|page| page.get("tabs").is_some_and(Value::is_array)) {
            return Ok(DocumentShape::PageKeyed);
        }

        let is_legacy_page = |page: &Map<String, Value>| {
            page.values().filter_map(Value::as_object).any(|tab| {
                tab.contains_key("parentHeaders") || tab.contains_key("sectionTitle")
            })
        };
        if KNOWN_PAGES
            .iter()
            .filter_map(|known| object.get(known.id).and_then(Value::as_object))
            .any(is_legacy_page)
        {
            return Ok(DocumentShape::Legacy);
        }

        Err(MigrationError::unrecognized_shape(
            "expected 'pages', page objects with 'tabs', or legacy 'parentHeaders'",
        ))
    }

    /// Convert any recognised shape to the current document, stamping
    /// conversions with the current time
    pub fn normalize(value: Value) -> Result<ContentDocument, MigrationError> {
        Self::normalize_at(value, &timestamp_now())
    }

    /// Same as [`normalize`](Self::normalize) with an explicit conversion time
    pub fn normalize_at(value: Value, now: &str) -> Result<ContentDocument, MigrationError> {
        match Self::detect(&value)? {
            DocumentShape::Current => serde_json::from_value(value)
                .map_err(|e| MigrationError::invalid_document(e.to_string())),
            DocumentShape::PageKeyed => Self::from_page_keyed_at(value, now),
            DocumentShape::Legacy => Self::migrate_legacy_at(&value, now),
        }
    }

    /// Convert the page-keyed shape
    ///
    /// Both known pages are always present in the result. Keys whose values
    /// carry no `tabs` array (database bookkeeping such as `_id`) are ignored.
    pub fn from_page_keyed_at(value: Value, now: &str) -> Result<ContentDocument, MigrationError> {
        let Value::Object(object) = value else {
            return Err(MigrationError::unrecognized_shape("document is not a JSON object"));
        };

        let mut doc = ContentDocument::default_document();
        doc.metadata = None;

        for (key, page_value) in object {
            if key == "metadata" {
                let metadata: ContentMetadata = serde_json::from_value(page_value)
                    .map_err(|e| MigrationError::invalid_document(format!("metadata: {}", e)))?;
                doc.metadata = Some(metadata);
                continue;
            }

            let Some(tabs_value) = page_value.get("tabs").filter(|tabs| tabs.is_array()) else {
                debug!("Skipping non-page key '{}' in page-keyed document", key);
                continue;
            };
            let tabs: Vec<Tab> = serde_json::from_value(tabs_value.clone())
                .map_err(|e| MigrationError::invalid_document(format!("{}.tabs: {}", key, e)))?;

            let display_name = page_value
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or(&key)
                .to_string();
            let page = doc
                .pages
                .entry(key.clone())
                .or_insert_with(|| Page::named(key.clone(), &display_name));
            page.tabs = tabs;
        }

        TreeOperations::normalize_order(&mut doc);
        if doc.metadata.is_none() {
            doc.touch(now);
        }
        Ok(doc)
    }

    /// Convert the pre-2.0 legacy shape
    ///
    /// Only the known page keys are read. Sections and items without an `id`
    /// get a slug of their title, unique among their siblings. Items keep
    /// their `last_updated`/`lastUpdated` when present; everything else is
    /// stamped with `now`.
    pub fn migrate_legacy_at(value: &Value, now: &str) -> Result<ContentDocument, MigrationError> {
        let object = value
            .as_object()
            .ok_or_else(|| MigrationError::unrecognized_shape("document is not a JSON object"))?;

        let mut doc = ContentDocument {
            pages: Default::default(),
            metadata: Some(ContentMetadata {
                version: CONTENT_SCHEMA_VERSION.to_string(),
                last_modified: now.to_string(),
                author: None,
                imported_at: None,
            }),
        };

        for known in &KNOWN_PAGES {
            let Some(page_value) = object.get(known.id) else {
                continue;
            };
            let entries = page_value
                .as_object()
                .ok_or_else(|| MigrationError::invalid_legacy_entry(known.id, "expected an object"))?;

            let mut page = Page::from_known(known);
            for (order, (tab_id, tab_value)) in entries.iter().enumerate() {
                let path = format!("{}.{}", known.id, tab_id);
                let mut tab = migrate_legacy_tab(tab_id, tab_value, &path, now)?;
                tab.order = order;
                page.tabs.push(tab);
            }
            doc.pages.insert(known.id.to_string(), page);
        }

        info!(
            "Migrated legacy content: {} page(s), {} item(s)",
            doc.pages.len(),
            doc.item_count()
        );
        Ok(doc)
    }
}

fn migrate_legacy_tab(
    tab_id: &str,
    value: &Value,
    path: &str,
    now: &str,
) -> Result<Tab, MigrationError> {
    let entry = value
        .as_object()
        .ok_or_else(|| MigrationError::invalid_legacy_entry(path, "expected an object"))?;

    let title = non_empty_str(entry, "sectionTitle").unwrap_or(tab_id);
    let mut tab = Tab::new(tab_id, title);

    for (index, parent) in legacy_array(entry, "parentHeaders", path)?.iter().enumerate() {
        let parent_path = format!("{}.parentHeaders[{}]", path, index);
        let parent_entry = parent
            .as_object()
            .ok_or_else(|| MigrationError::invalid_legacy_entry(&parent_path, "expected an object"))?;

        let (id, title) = identify(
            parent_entry,
            "section",
            tab.sections.iter().map(|s| s.id.as_str()),
        );
        let mut section = Section::new(id, title);
        section.order = tab.sections.len();

        for (child_index, child) in legacy_array(parent_entry, "childHeaders", &parent_path)?
            .iter()
            .enumerate()
        {
            let child_path = format!("{}.childHeaders[{}]", parent_path, child_index);
            let child_entry = child
                .as_object()
                .ok_or_else(|| MigrationError::invalid_legacy_entry(&child_path, "expected an object"))?;

            let (id, title) = identify(
                child_entry,
                "item",
                section.items.iter().map(|i| i.id.as_str()),
            );
            let last_updated = non_empty_str(child_entry, "last_updated")
                .or_else(|| non_empty_str(child_entry, "lastUpdated"))
                .unwrap_or(now);

            section.items.push(ContentItem {
                id,
                title,
                content: non_empty_str(child_entry, "content").unwrap_or_default().to_string(),
                sources: child_entry
                    .get("sources")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                last_updated: last_updated.to_string(),
                order: section.items.len(),
            });
        }

        tab.sections.push(section);
    }

    Ok(tab)
}

fn non_empty_str<'a>(entry: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn legacy_array<'a>(
    entry: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a [Value], MigrationError> {
    match entry.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(values)) => Ok(values.as_slice()),
        Some(_) => Err(MigrationError::invalid_legacy_entry(
            format!("{}.{}", path, key),
            "expected an array",
        )),
    }
}

/// Resolve `(id, title)` for a legacy section or item, synthesising
/// whichever is missing
///
/// The id is unique among `sibling_ids`: a stored id that repeats an
/// earlier sibling's gets a `-2`, `-3`, … suffix like a synthesised one.
fn identify<'a>(
    entry: &Map<String, Value>,
    fallback: &str,
    sibling_ids: impl Iterator<Item = &'a str>,
) -> (String, String) {
    let title = non_empty_str(entry, "title");
    let (id, untitled) = match non_empty_str(entry, "id") {
        Some(stored) => (unique_id(stored, sibling_ids), stored.to_string()),
        None => {
            let id = unique_slug(title.unwrap_or_default(), fallback, sibling_ids);
            (id.clone(), id)
        }
    };
    (id, title.map(str::to_string).unwrap_or(untitled))
}
