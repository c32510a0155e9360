//! Content Tree Data Structures
//!
//! This module defines the nested content tree served to the public viewer and
//! edited through the admin console:
//!
//! ```text
//! ContentDocument
//! └── pages: pageId → Page
//!     └── tabs: [Tab]
//!         └── sections: [Section]
//!             └── items: [ContentItem]
//! ```
//!
//! Each parent exclusively owns its children. Within every ordered sequence the
//! `order` field is a dense 0-based index that matches the node's position; the
//! tree operations in [`crate::operations`] maintain that invariant, the types
//! here only carry the data.
//!
//! # Examples
//!
//! ```rust
//! use carehub_core::models::{ContentDocument, Tab};
//!
//! let mut doc = ContentDocument::default_document();
//! assert!(doc.pages.contains_key("caregiver"));
//!
//! let tab = Tab::new("benefits", "Benefits");
//! doc.pages.get_mut("caregiver").unwrap().tabs.push(tab);
//! assert_eq!(doc.pages["caregiver"].tabs.len(), 1);
//! ```

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Schema version written into `metadata.version` by this crate
pub const CONTENT_SCHEMA_VERSION: &str = "2.0.0";

/// Page id of the caregiver area
pub const CAREGIVER_PAGE: &str = "caregiver";

/// Page id of the care recipient area
pub const CARE_RECIPIENT_PAGE: &str = "carerecipient";

/// A page the application ships with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownPage {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Pages seeded into the default document and recognised by legacy migration
pub const KNOWN_PAGES: [KnownPage; 2] = [
    KnownPage {
        id: CAREGIVER_PAGE,
        title: "Caregiver Resources",
        description:
            "Comprehensive resources and information for professional and family caregivers.",
    },
    KnownPage {
        id: CARE_RECIPIENT_PAGE,
        title: "Care Recipient Resources",
        description: "Information and support resources for individuals receiving care.",
    },
];

/// Look up a known page by id
pub fn known_page(id: &str) -> Option<&'static KnownPage> {
    KNOWN_PAGES.iter().find(|page| page.id == id)
}

/// Current time as an RFC 3339 UTC string with millisecond precision
///
/// Every timestamp the crate writes (`lastUpdated`, `lastModified`,
/// `exportedAt`) goes through this helper so the format stays uniform.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn default_true() -> bool {
    true
}

/// Validation errors for content documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Duplicate {kind} id '{id}' under {parent}")]
    DuplicateId {
        kind: &'static str,
        id: String,
        parent: String,
    },

    #[error("Page key '{key}' does not match page id '{id}'")]
    PageKeyMismatch { key: String, id: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Display theme of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    pub version: String,

    pub last_modified: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Set when the document arrived through an import
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<String>,
}

impl ContentMetadata {
    /// Metadata stamped with the current schema version and time
    pub fn current() -> Self {
        Self {
            version: CONTENT_SCHEMA_VERSION.to_string(),
            last_modified: timestamp_now(),
            author: None,
            imported_at: None,
        }
    }
}

/// Root of the content tree, one per deployment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    /// Pages keyed by page id
    pub pages: BTreeMap<String, Page>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ContentMetadata>,
}

/// A top-level content area (e.g. caregiver, care recipient)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tabs: Vec<Tab>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

/// A named, ordered, independently hideable subdivision of a Page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default)]
    pub sections: Vec<Section>,

    #[serde(default)]
    pub order: usize,

    /// Hidden tabs stay in the admin tree but not in the public viewer
    #[serde(default = "default_true")]
    pub visible: bool,
}

/// A collapsible grouping of items within a Tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub items: Vec<ContentItem>,

    #[serde(default)]
    pub order: usize,

    #[serde(default = "default_true")]
    pub collapsible: bool,

    /// Transient UI state; persisted but carries no meaning for the data
    #[serde(default)]
    pub expanded: bool,
}

/// The leaf content unit
///
/// `content` and `sources` are opaque rich-text markup. Sanitising or
/// rendering them is the UI's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,

    #[serde(default = "timestamp_now")]
    pub last_updated: String,

    #[serde(default)]
    pub order: usize,
}

impl ContentDocument {
    /// Document with both known pages and no tabs
    ///
    /// This is the last step of the load fallback chain and the starting point
    /// of every bulk import.
    pub fn default_document() -> Self {
        let pages = KNOWN_PAGES
            .iter()
            .map(|known| (known.id.to_string(), Page::from_known(known)))
            .collect();

        Self {
            pages,
            metadata: Some(ContentMetadata {
                author: Some("System".to_string()),
                ..ContentMetadata::current()
            }),
        }
    }

    /// Get a page by id
    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.get(page_id)
    }

    /// Number of items across the whole tree
    pub fn item_count(&self) -> usize {
        self.pages
            .values()
            .flat_map(|page| &page.tabs)
            .flat_map(|tab| &tab.sections)
            .map(|section| section.items.len())
            .sum()
    }

    /// Set `metadata.lastModified`, creating metadata if absent
    pub fn touch(&mut self, now: &str) {
        match self.metadata.as_mut() {
            Some(metadata) => metadata.last_modified = now.to_string(),
            None => {
                self.metadata = Some(ContentMetadata {
                    version: CONTENT_SCHEMA_VERSION.to_string(),
                    last_modified: now.to_string(),
                    author: None,
                    imported_at: None,
                })
            }
        }
    }

    /// Validate structural requirements before persisting
    ///
    /// Checks that ids and titles are present, that each page is stored under
    /// its own id, and that sibling ids are unique.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (key, page) in &self.pages {
            if page.id.trim().is_empty() {
                return Err(ValidationError::MissingField(format!("pages.{}.id", key)));
            }
            if page.id != *key {
                return Err(ValidationError::PageKeyMismatch {
                    key: key.clone(),
                    id: page.id.clone(),
                });
            }
            if page.title.trim().is_empty() {
                return Err(ValidationError::MissingField(format!(
                    "pages.{}.title",
                    key
                )));
            }

            ensure_unique("tab", &page.id, page.tabs.iter().map(|t| t.id.as_str()))?;
            for tab in &page.tabs {
                require_field(&tab.id, || format!("pages.{}.tabs[].id", key))?;
                require_field(&tab.title, || format!("tab '{}' title", tab.id))?;

                ensure_unique("section", &tab.id, tab.sections.iter().map(|s| s.id.as_str()))?;
                for section in &tab.sections {
                    require_field(&section.id, || format!("tab '{}' section id", tab.id))?;
                    require_field(&section.title, || {
                        format!("section '{}' title", section.id)
                    })?;

                    ensure_unique(
                        "item",
                        &section.id,
                        section.items.iter().map(|i| i.id.as_str()),
                    )?;
                    for item in &section.items {
                        require_field(&item.id, || {
                            format!("section '{}' item id", section.id)
                        })?;
                        require_field(&item.title, || format!("item '{}' title", item.id))?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn require_field(value: &str, name: impl FnOnce() -> String) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(name()))
    } else {
        Ok(())
    }
}

fn ensure_unique<'a>(
    kind: &'static str,
    parent: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
                parent: parent.to_string(),
            });
        }
    }
    Ok(())
}

impl Page {
    /// Empty page for one of the known page ids
    pub fn from_known(known: &KnownPage) -> Self {
        Self {
            id: known.id.to_string(),
            title: known.title.to_string(),
            description: known.description.to_string(),
            tabs: Vec::new(),
            theme: None,
        }
    }

    /// Empty page for an arbitrary id
    ///
    /// Known ids get their canonical title and description; other ids use the
    /// supplied display name.
    pub fn named(id: impl Into<String>, display_name: &str) -> Self {
        let id = id.into();
        match known_page(&id) {
            Some(known) => Self::from_known(known),
            None => Self {
                title: display_name.to_string(),
                id,
                description: String::new(),
                tabs: Vec::new(),
                theme: None,
            },
        }
    }

    pub fn tab(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == tab_id)
    }
}

impl Tab {
    /// Visible tab with no sections; `order` is assigned on insertion
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            icon: None,
            sections: Vec::new(),
            order: 0,
            visible: true,
        }
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == section_id)
    }
}

impl Section {
    /// Collapsible, collapsed section with no items
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            items: Vec::new(),
            order: 0,
            collapsible: true,
            expanded: false,
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&ContentItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

impl ContentItem {
    /// Item stamped with the current time
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            sources: None,
            last_updated: timestamp_now(),
            order: 0,
        }
    }

    pub fn with_sources(mut self, sources: impl Into<String>) -> Self {
        self.sources = Some(sources.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_document_has_known_pages() {
        let doc = ContentDocument::default_document();

        assert_eq!(doc.pages.len(), 2);
        assert!(doc.pages[CAREGIVER_PAGE].tabs.is_empty());
        assert!(doc.pages[CARE_RECIPIENT_PAGE].tabs.is_empty());
        let metadata = doc.metadata.expect("default document has metadata");
        assert_eq!(metadata.version, CONTENT_SCHEMA_VERSION);
        assert_eq!(metadata.author.as_deref(), Some("System"));
    }

    #[test]
    fn test_deserialize_applies_store_defaults() {
        let doc: ContentDocument = serde_json::from_value(json!({
            "pages": {
                "caregiver": {
                    "id": "caregiver",
                    "title": "Caregiver Resources",
                    "tabs": [{
                        "id": "money",
                        "title": "Money",
                        "sections": [{
                            "id": "gov",
                            "title": "Gov",
                            "items": [{"id": "medicare", "title": "Medicare", "lastUpdated": "2024-01-01"}]
                        }]
                    }]
                }
            }
        }))
        .unwrap();

        let tab = &doc.pages["caregiver"].tabs[0];
        assert!(tab.visible);
        assert_eq!(tab.order, 0);
        let section = &tab.sections[0];
        assert!(section.collapsible);
        assert!(!section.expanded);
        let item = &section.items[0];
        assert_eq!(item.content, "");
        assert_eq!(item.last_updated, "2024-01-01");
        assert!(doc.metadata.is_none());
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let item = ContentItem {
            id: "ssdi".to_string(),
            title: "SSDI".to_string(),
            content: "info".to_string(),
            sources: None,
            last_updated: "2024-05-01T00:00:00.000Z".to_string(),
            order: 3,
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["lastUpdated"], "2024-05-01T00:00:00.000Z");
        assert!(value.get("sources").is_none());
        assert_eq!(value["order"], 3);
    }

    #[test]
    fn test_theme_round_trips_lowercase() {
        assert_eq!(serde_json::to_value(Theme::Dark).unwrap(), json!("dark"));
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn test_validate_rejects_duplicate_sibling_ids() {
        let mut doc = ContentDocument::default_document();
        let page = doc.pages.get_mut(CAREGIVER_PAGE).unwrap();
        page.tabs.push(Tab::new("t1", "One"));
        page.tabs.push(Tab::new("t1", "Other"));

        let err = doc.validate().unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { kind: "tab", .. }));
    }

    #[test]
    fn test_validate_rejects_page_key_mismatch() {
        let mut doc = ContentDocument::default_document();
        let page = Page::named("elsewhere", "Elsewhere");
        doc.pages.insert("somewhere".to_string(), page);

        assert!(matches!(
            doc.validate(),
            Err(ValidationError::PageKeyMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_blank_item_title() {
        let mut doc = ContentDocument::default_document();
        let mut section = Section::new("s1", "Section");
        section.items.push(ContentItem::new("i1", "  ", "body"));
        let mut tab = Tab::new("t1", "Tab");
        tab.sections.push(section);
        doc.pages.get_mut(CAREGIVER_PAGE).unwrap().tabs.push(tab);

        assert!(matches!(
            doc.validate(),
            Err(ValidationError::MissingField(_))
        ));
    }

    #[test]
    fn test_touch_creates_metadata_when_absent() {
        let mut doc = ContentDocument::default();
        doc.touch("2025-02-01T10:00:00.000Z");

        let metadata = doc.metadata.unwrap();
        assert_eq!(metadata.version, CONTENT_SCHEMA_VERSION);
        assert_eq!(metadata.last_modified, "2025-02-01T10:00:00.000Z");
    }

    #[test]
    fn test_named_page_uses_known_titles() {
        assert_eq!(Page::named("caregiver", "ignored").title, "Caregiver Resources");
        assert_eq!(Page::named("respite", "Respite").title, "Respite");
    }
}
