//! Application State
//!
//! [`ContentState`] is the editor's single in-memory copy of the document plus
//! the viewer selection (page, tab, search query, theme). It is an ordinary
//! value: construct one over a [`PersistenceGateway`] and pass it where it is
//! needed.
//!
//! # Copy-on-write edits
//!
//! Every structural edit is applied to a clone of the document, the clone is
//! saved through the gateway as a whole, and only then does it replace the
//! in-memory copy. A failed tree operation or a failed save leaves the state
//! exactly as it was.
//!
//! ```rust,no_run
//! use carehub_core::db::FallbackFile;
//! use carehub_core::models::Tab;
//! use carehub_core::services::{ContentState, PersistenceGateway};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), carehub_core::services::ContentServiceError> {
//! let gateway = Arc::new(PersistenceGateway::new(None, FallbackFile::new("content.json")));
//! let mut state = ContentState::new(gateway);
//! state.load().await;
//! state.add_tab("caregiver", Tab::new("benefits", "Benefits")).await?;
//! # Ok(())
//! # }
//! ```

use crate::models::{
    ContentDocument, ContentItem, ItemUpdate, Section, SectionUpdate, Tab, TabUpdate, Theme,
    CAREGIVER_PAGE,
};
use crate::operations::{TreeOperationError, TreeOperations};
use crate::services::error::ContentServiceError;
use crate::services::persistence_gateway::{ContentSource, PersistenceGateway};
use crate::services::view_projection::ViewProjection;
use std::sync::Arc;
use tracing::debug;

/// Editor and viewer state over one content document
pub struct ContentState {
    gateway: Arc<PersistenceGateway>,
    content: Option<ContentDocument>,
    source: Option<ContentSource>,
    current_page_id: String,
    current_tab_id: Option<String>,
    search_query: String,
    theme: Theme,
}

impl ContentState {
    pub fn new(gateway: Arc<PersistenceGateway>) -> Self {
        Self {
            gateway,
            content: None,
            source: None,
            current_page_id: CAREGIVER_PAGE.to_string(),
            current_tab_id: None,
            search_query: String::new(),
            theme: Theme::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn content(&self) -> Option<&ContentDocument> {
        self.content.as_ref()
    }

    /// Where the loaded document came from
    pub fn source(&self) -> Option<ContentSource> {
        self.source
    }

    pub fn current_page_id(&self) -> &str {
        &self.current_page_id
    }

    pub fn current_tab_id(&self) -> Option<&str> {
        self.current_tab_id.as_deref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Load through the gateway's fallback chain
    ///
    /// Selects the current page's first tab when no tab is selected yet.
    pub async fn load(&mut self) -> ContentSource {
        let loaded = self.gateway.load().await;

        if self.current_tab_id.is_none() {
            self.current_tab_id =
                ViewProjection::default_tab_id(&loaded.document, &self.current_page_id);
        }
        self.content = Some(loaded.document);
        self.source = Some(loaded.source);
        loaded.source
    }

    //
    // SELECTION
    //

    /// Switch page and select its first tab
    ///
    /// Ignored (returns `false`) when no document is loaded or the page does
    /// not exist.
    pub fn set_current_page(&mut self, page_id: &str) -> bool {
        let Some(content) = &self.content else {
            return false;
        };
        if content.page(page_id).is_none() {
            debug!("Ignoring switch to unknown page '{}'", page_id);
            return false;
        }

        self.current_tab_id = ViewProjection::default_tab_id(content, page_id);
        self.current_page_id = page_id.to_string();
        true
    }

    pub fn set_current_tab(&mut self, tab_id: impl Into<String>) {
        self.current_tab_id = Some(tab_id.into());
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Flip between light and dark, returning the new theme
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Sections the viewer renders for the current selection and query
    pub fn visible_sections(&self) -> Vec<Section> {
        match (&self.content, &self.current_tab_id) {
            (Some(content), Some(tab_id)) => ViewProjection::project(
                content,
                &self.current_page_id,
                tab_id,
                &self.search_query,
            ),
            _ => Vec::new(),
        }
    }

    /// Expand or collapse a section of the current tab
    ///
    /// View-only: the change is not persisted.
    pub fn toggle_section(&mut self, section_id: &str) -> Result<bool, ContentServiceError> {
        let tab_id = self
            .current_tab_id
            .clone()
            .ok_or_else(|| TreeOperationError::tab_not_found(&self.current_page_id, ""))?;
        let content = self.content.as_mut().ok_or(ContentServiceError::NotLoaded)?;

        Ok(TreeOperations::toggle_section(
            content,
            &self.current_page_id,
            &tab_id,
            section_id,
        )?)
    }

    //
    // TABS
    //

    pub async fn add_tab(&mut self, page_id: &str, tab: Tab) -> Result<(), ContentServiceError> {
        self.commit(|doc| TreeOperations::add_tab(doc, page_id, tab))
            .await
    }

    pub async fn update_tab(
        &mut self,
        page_id: &str,
        tab_id: &str,
        update: TabUpdate,
    ) -> Result<(), ContentServiceError> {
        self.commit(|doc| TreeOperations::update_tab(doc, page_id, tab_id, update))
            .await
    }

    /// Delete a tab, re-selecting the page's first remaining tab when the
    /// deleted one was current
    pub async fn delete_tab(&mut self, page_id: &str, tab_id: &str) -> Result<Tab, ContentServiceError> {
        let removal = self
            .commit(|doc| TreeOperations::delete_tab(doc, page_id, tab_id))
            .await?;

        if self.current_page_id == page_id && self.current_tab_id.as_deref() == Some(tab_id) {
            self.current_tab_id = removal.next_tab_id;
        }
        Ok(removal.removed)
    }

    pub async fn reorder_tabs(
        &mut self,
        page_id: &str,
        tab_ids: &[String],
    ) -> Result<(), ContentServiceError> {
        self.commit(|doc| TreeOperations::reorder_tabs(doc, page_id, tab_ids))
            .await
    }

    //
    // SECTIONS
    //

    pub async fn add_section(
        &mut self,
        page_id: &str,
        tab_id: &str,
        section: Section,
    ) -> Result<(), ContentServiceError> {
        self.commit(|doc| TreeOperations::add_section(doc, page_id, tab_id, section))
            .await
    }

    pub async fn update_section(
        &mut self,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        update: SectionUpdate,
    ) -> Result<(), ContentServiceError> {
        self.commit(|doc| TreeOperations::update_section(doc, page_id, tab_id, section_id, update))
            .await
    }

    pub async fn delete_section(
        &mut self,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
    ) -> Result<Section, ContentServiceError> {
        self.commit(|doc| TreeOperations::delete_section(doc, page_id, tab_id, section_id))
            .await
    }

    pub async fn reorder_sections(
        &mut self,
        page_id: &str,
        tab_id: &str,
        section_ids: &[String],
    ) -> Result<(), ContentServiceError> {
        self.commit(|doc| TreeOperations::reorder_sections(doc, page_id, tab_id, section_ids))
            .await
    }

    //
    // ITEMS
    //

    pub async fn add_item(
        &mut self,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        item: ContentItem,
    ) -> Result<(), ContentServiceError> {
        self.commit(|doc| TreeOperations::add_item(doc, page_id, tab_id, section_id, item))
            .await
    }

    pub async fn update_item(
        &mut self,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        item_id: &str,
        update: ItemUpdate,
    ) -> Result<(), ContentServiceError> {
        self.commit(|doc| {
            TreeOperations::update_item(doc, page_id, tab_id, section_id, item_id, update)
        })
        .await
    }

    pub async fn delete_item(
        &mut self,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        item_id: &str,
    ) -> Result<ContentItem, ContentServiceError> {
        self.commit(|doc| TreeOperations::delete_item(doc, page_id, tab_id, section_id, item_id))
            .await
    }

    pub async fn reorder_items(
        &mut self,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        item_ids: &[String],
    ) -> Result<(), ContentServiceError> {
        self.commit(|doc| {
            TreeOperations::reorder_items(doc, page_id, tab_id, section_id, item_ids)
        })
        .await
    }

    /// Apply `edit` to a copy, save the copy, then swap it in
    async fn commit<T>(
        &mut self,
        edit: impl FnOnce(&mut ContentDocument) -> Result<T, TreeOperationError>,
    ) -> Result<T, ContentServiceError> {
        let mut draft = self.content.clone().ok_or(ContentServiceError::NotLoaded)?;
        let output = edit(&mut draft)?;

        let stored = self.gateway.save(draft).await?;
        self.content = Some(stored);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FallbackFile, LibsqlContentStore};
    use tempfile::TempDir;

    const P: &str = CAREGIVER_PAGE;

    async fn loaded_state(temp_dir: &TempDir) -> ContentState {
        let store = LibsqlContentStore::open(temp_dir.path().join("carehub.db"))
            .await
            .unwrap();
        let gateway = PersistenceGateway::new(
            Some(Arc::new(store)),
            FallbackFile::new(temp_dir.path().join("content.json")),
        );
        let mut state = ContentState::new(Arc::new(gateway));
        state.load().await;
        state
    }

    #[tokio::test]
    async fn test_edits_require_loaded_content() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = PersistenceGateway::new(None, FallbackFile::new(temp_dir.path().join("c.json")));
        let mut state = ContentState::new(Arc::new(gateway));

        let err = state.add_tab(P, Tab::new("t1", "T")).await.unwrap_err();
        assert!(matches!(err, ContentServiceError::NotLoaded));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_state_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = PersistenceGateway::new(None, FallbackFile::new(temp_dir.path().join("c.json")));
        let mut state = ContentState::new(Arc::new(gateway));
        state.load().await;
        let before = state.content().cloned();

        let err = state.add_tab(P, Tab::new("t1", "T")).await.unwrap_err();

        assert!(matches!(err, ContentServiceError::StoreUnavailable(_)));
        assert_eq!(state.content().cloned(), before);
    }

    #[tokio::test]
    async fn test_failed_tree_operation_is_not_saved() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = loaded_state(&temp_dir).await;

        let err = state
            .add_section(P, "missing", Section::new("s1", "S"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ContentServiceError::Tree(TreeOperationError::TabNotFound { .. })
        ));
        assert!(state.gateway.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_current_tab_reselects_first_remaining() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = loaded_state(&temp_dir).await;
        state.add_tab(P, Tab::new("a", "A")).await.unwrap();
        state.add_tab(P, Tab::new("b", "B")).await.unwrap();
        state.set_current_tab("a");

        state.delete_tab(P, "a").await.unwrap();
        assert_eq!(state.current_tab_id(), Some("b"));

        state.delete_tab(P, "b").await.unwrap();
        assert_eq!(state.current_tab_id(), None);
    }

    #[tokio::test]
    async fn test_set_current_page_ignores_unknown_pages() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = loaded_state(&temp_dir).await;
        state.add_tab("carerecipient", Tab::new("r1", "R")).await.unwrap();

        assert!(!state.set_current_page("respite"));
        assert_eq!(state.current_page_id(), P);

        assert!(state.set_current_page("carerecipient"));
        assert_eq!(state.current_tab_id(), Some("r1"));
    }

    #[tokio::test]
    async fn test_toggle_section_is_view_only() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = loaded_state(&temp_dir).await;
        state.add_tab(P, Tab::new("t1", "T")).await.unwrap();
        state.add_section(P, "t1", Section::new("s1", "S")).await.unwrap();
        state.set_current_tab("t1");

        assert!(state.toggle_section("s1").unwrap());
        assert!(state.visible_sections()[0].expanded);

        let stored = state.gateway.load().await.document;
        assert!(!stored.pages[P].tabs[0].sections[0].expanded);
    }

    #[tokio::test]
    async fn test_visible_sections_follow_search_query() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = loaded_state(&temp_dir).await;
        state.add_tab(P, Tab::new("t1", "T")).await.unwrap();
        state.add_section(P, "t1", Section::new("s1", "S")).await.unwrap();
        state
            .add_item(P, "t1", "s1", ContentItem::new("i1", "Respite care", "x"))
            .await
            .unwrap();
        state
            .add_item(P, "t1", "s1", ContentItem::new("i2", "Meals", "y"))
            .await
            .unwrap();
        state.set_current_tab("t1");

        state.set_search_query("RESPITE");
        let sections = state.visible_sections();
        assert_eq!(ViewProjection::match_count(&sections), 1);

        state.set_search_query("");
        assert_eq!(state.visible_sections()[0].items.len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_theme() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = loaded_state(&temp_dir).await;

        assert_eq!(state.theme(), Theme::Light);
        assert_eq!(state.toggle_theme(), Theme::Dark);
        assert_eq!(state.toggle_theme(), Theme::Light);
    }
}
