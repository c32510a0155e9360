//! Partial update records
//!
//! One update type per entity, listing exactly the fields an editor may change.
//! Absent fields keep their prior value (shallow merge). Ids are immutable and
//! therefore not part of any update.
//!
//! # Double-Option Pattern for Clearable Fields
//!
//! Optional fields on the entity (`icon`, `sources`) use `Option<Option<T>>`:
//!
//! - `None`: Don't change this field (omitted from the JSON body)
//! - `Some(None)`: Clear the field (`null` in the JSON body)
//! - `Some(Some(value))`: Set the field
//!
//! # Order
//!
//! `order` in an update is a move: the node is repositioned at that index
//! among its siblings and the whole sequence is renumbered, so the dense-order
//! invariant survives any update.

use serde::{Deserialize, Deserializer, Serialize};

/// Custom deserializer for the double-Option pattern
///
/// - Missing field → None (don't update)
/// - null → Some(None) (clear)
/// - "value" → Some(Some("value")) (set)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    // Missing field is handled by #[serde(default)] on the struct field
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial update for a [`Tab`](super::Tab)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub icon: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

impl TabUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    /// Check if update contains any changes
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.icon.is_none() && self.visible.is_none() && self.order.is_none()
    }
}

/// Partial update for a [`Section`](super::Section)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsible: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

impl SectionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_collapsible(mut self, collapsible: bool) -> Self {
        self.collapsible = Some(collapsible);
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.collapsible.is_none()
            && self.expanded.is_none()
            && self.order.is_none()
    }
}

/// Partial update for a [`ContentItem`](super::ContentItem)
///
/// Changing `title`, `content`, or `sources` refreshes the item's
/// `lastUpdated` unless `last_updated` is supplied explicitly. A pure move
/// (`order` only) leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub sources: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

impl ItemUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_sources(mut self, sources: Option<String>) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    /// Whether the update touches the item's content fields
    pub fn edits_content(&self) -> bool {
        self.title.is_some() || self.content.is_some() || self.sources.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.edits_content() && self.last_updated.is_none() && self.order.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_icon_means_no_change() {
        let update: TabUpdate = serde_json::from_value(json!({"title": "New"})).unwrap();
        assert_eq!(update.icon, None);
        assert_eq!(update.title.as_deref(), Some("New"));
    }

    #[test]
    fn test_null_icon_means_clear() {
        let update: TabUpdate = serde_json::from_value(json!({"icon": null})).unwrap();
        assert_eq!(update.icon, Some(None));
    }

    #[test]
    fn test_sources_set_and_clear() {
        let set: ItemUpdate =
            serde_json::from_value(json!({"sources": "<a href=\"x\">x</a>"})).unwrap();
        assert_eq!(set.sources, Some(Some("<a href=\"x\">x</a>".to_string())));

        let clear: ItemUpdate = serde_json::from_value(json!({"sources": null})).unwrap();
        assert_eq!(clear.sources, Some(None));
        assert!(clear.edits_content());
    }

    #[test]
    fn test_order_only_update_is_not_a_content_edit() {
        let update = ItemUpdate::new().with_order(2);
        assert!(!update.edits_content());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_empty_updates() {
        assert!(TabUpdate::new().is_empty());
        assert!(SectionUpdate::new().is_empty());
        assert!(ItemUpdate::new().is_empty());
        assert!(!SectionUpdate::new().with_expanded(true).is_empty());
    }
}
