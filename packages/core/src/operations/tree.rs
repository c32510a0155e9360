//! Tree Operations
//!
//! Structural reads and writes on a [`ContentDocument`], addressed by a path
//! of identifiers `(page_id, tab_id?, section_id?, item_id?)`.
//!
//! # Guarantees
//!
//! - **No partial mutation**: the full path is resolved before anything is
//!   changed; an `Err` means the document is exactly as it was.
//! - **Dense order**: after every insert, delete, move, or reorder the
//!   affected sibling sequence has `order` equal to position.
//! - **No id validation**: callers supply unique ids. A duplicate id is
//!   appended as given and shadowed by the earlier sibling in lookups.
//!
//! # Examples
//!
//! ```rust
//! use carehub_core::models::{ContentDocument, ContentItem, Section, Tab};
//! use carehub_core::operations::TreeOperations;
//!
//! let mut doc = ContentDocument::default_document();
//! TreeOperations::add_tab(&mut doc, "caregiver", Tab::new("t1", "Benefits"))?;
//! TreeOperations::add_section(&mut doc, "caregiver", "t1", Section::new("s1", "Federal"))?;
//! TreeOperations::add_item(
//!     &mut doc,
//!     "caregiver",
//!     "t1",
//!     "s1",
//!     ContentItem::new("i1", "SSDI", "info"),
//! )?;
//!
//! let item = TreeOperations::find_item(&doc, "caregiver", "t1", "s1", "i1")?;
//! assert_eq!(item.title, "SSDI");
//! # Ok::<(), carehub_core::operations::TreeOperationError>(())
//! ```

use super::error::TreeOperationError;
use super::ordering;
use crate::models::{
    timestamp_now, ContentDocument, ContentItem, ItemUpdate, Page, Section, SectionUpdate, Tab,
    TabUpdate,
};
use tracing::debug;

/// Result of deleting a tab
///
/// The caller uses `next_tab_id` to re-select when the deleted tab was the
/// one being viewed.
#[derive(Debug, Clone, PartialEq)]
pub struct TabRemoval {
    pub removed: Tab,
    /// First remaining tab of the page, if any
    pub next_tab_id: Option<String>,
}

/// Path-addressed operations on the content tree
pub struct TreeOperations;

impl TreeOperations {
    //
    // LOOKUPS
    //

    pub fn find_page<'a>(
        doc: &'a ContentDocument,
        page_id: &str,
    ) -> Result<&'a Page, TreeOperationError> {
        doc.pages
            .get(page_id)
            .ok_or_else(|| TreeOperationError::page_not_found(page_id))
    }

    pub fn find_tab<'a>(
        doc: &'a ContentDocument,
        page_id: &str,
        tab_id: &str,
    ) -> Result<&'a Tab, TreeOperationError> {
        Self::find_page(doc, page_id)?
            .tab(tab_id)
            .ok_or_else(|| TreeOperationError::tab_not_found(page_id, tab_id))
    }

    pub fn find_section<'a>(
        doc: &'a ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
    ) -> Result<&'a Section, TreeOperationError> {
        Self::find_tab(doc, page_id, tab_id)?
            .section(section_id)
            .ok_or_else(|| TreeOperationError::section_not_found(tab_id, section_id))
    }

    pub fn find_item<'a>(
        doc: &'a ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        item_id: &str,
    ) -> Result<&'a ContentItem, TreeOperationError> {
        Self::find_section(doc, page_id, tab_id, section_id)?
            .item(item_id)
            .ok_or_else(|| TreeOperationError::item_not_found(section_id, item_id))
    }

    //
    // TABS
    //

    /// Append a tab to a page with `order` = current tab count
    pub fn add_tab(
        doc: &mut ContentDocument,
        page_id: &str,
        tab: Tab,
    ) -> Result<(), TreeOperationError> {
        let page = page_mut(doc, page_id)?;
        debug!("Adding tab '{}' to page '{}'", tab.id, page_id);
        ordering::append(&mut page.tabs, tab);
        Ok(())
    }

    /// Merge a partial update into a tab
    pub fn update_tab(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        update: TabUpdate,
    ) -> Result<(), TreeOperationError> {
        let page = page_mut(doc, page_id)?;
        let index = ordering::position_of(&page.tabs, tab_id)
            .ok_or_else(|| TreeOperationError::tab_not_found(page_id, tab_id))?;

        let tab = &mut page.tabs[index];
        if let Some(title) = update.title {
            tab.title = title;
        }
        if let Some(icon) = update.icon {
            tab.icon = icon;
        }
        if let Some(visible) = update.visible {
            tab.visible = visible;
        }
        if let Some(order) = update.order {
            ordering::move_to(&mut page.tabs, index, order);
        }
        Ok(())
    }

    /// Remove a tab (and everything under it) and compact sibling orders
    pub fn delete_tab(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
    ) -> Result<TabRemoval, TreeOperationError> {
        let page = page_mut(doc, page_id)?;
        let index = ordering::position_of(&page.tabs, tab_id)
            .ok_or_else(|| TreeOperationError::tab_not_found(page_id, tab_id))?;

        let removed = ordering::remove_at(&mut page.tabs, index);
        let next_tab_id = page.tabs.first().map(|tab| tab.id.clone());
        debug!("Deleted tab '{}' from page '{}'", tab_id, page_id);

        Ok(TabRemoval {
            removed,
            next_tab_id,
        })
    }

    /// Rearrange a page's tabs to follow `tab_ids`
    ///
    /// See [`ordering::reorder_by_ids`] for how unknown, repeated, and
    /// omitted ids are handled.
    pub fn reorder_tabs<S: AsRef<str>>(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_ids: &[S],
    ) -> Result<(), TreeOperationError> {
        let page = page_mut(doc, page_id)?;
        ordering::reorder_by_ids(&mut page.tabs, tab_ids);
        Ok(())
    }

    //
    // SECTIONS
    //

    pub fn add_section(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        section: Section,
    ) -> Result<(), TreeOperationError> {
        let tab = tab_mut(doc, page_id, tab_id)?;
        debug!("Adding section '{}' to tab '{}'", section.id, tab_id);
        ordering::append(&mut tab.sections, section);
        Ok(())
    }

    pub fn update_section(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        update: SectionUpdate,
    ) -> Result<(), TreeOperationError> {
        let tab = tab_mut(doc, page_id, tab_id)?;
        let index = ordering::position_of(&tab.sections, section_id)
            .ok_or_else(|| TreeOperationError::section_not_found(tab_id, section_id))?;

        let section = &mut tab.sections[index];
        if let Some(title) = update.title {
            section.title = title;
        }
        if let Some(collapsible) = update.collapsible {
            section.collapsible = collapsible;
        }
        if let Some(expanded) = update.expanded {
            section.expanded = expanded;
        }
        if let Some(order) = update.order {
            ordering::move_to(&mut tab.sections, index, order);
        }
        Ok(())
    }

    pub fn delete_section(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
    ) -> Result<Section, TreeOperationError> {
        let tab = tab_mut(doc, page_id, tab_id)?;
        let index = ordering::position_of(&tab.sections, section_id)
            .ok_or_else(|| TreeOperationError::section_not_found(tab_id, section_id))?;

        Ok(ordering::remove_at(&mut tab.sections, index))
    }

    pub fn reorder_sections<S: AsRef<str>>(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_ids: &[S],
    ) -> Result<(), TreeOperationError> {
        let tab = tab_mut(doc, page_id, tab_id)?;
        ordering::reorder_by_ids(&mut tab.sections, section_ids);
        Ok(())
    }

    /// Flip a section's `expanded` flag, returning the new value
    pub fn toggle_section(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
    ) -> Result<bool, TreeOperationError> {
        let section = section_mut(doc, page_id, tab_id, section_id)?;
        section.expanded = !section.expanded;
        Ok(section.expanded)
    }

    //
    // ITEMS
    //

    pub fn add_item(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        item: ContentItem,
    ) -> Result<(), TreeOperationError> {
        let section = section_mut(doc, page_id, tab_id, section_id)?;
        debug!("Adding item '{}' to section '{}'", item.id, section_id);
        ordering::append(&mut section.items, item);
        Ok(())
    }

    /// Merge a partial update into an item, refreshing `lastUpdated` on
    /// content edits
    pub fn update_item(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        item_id: &str,
        update: ItemUpdate,
    ) -> Result<(), TreeOperationError> {
        Self::update_item_at(
            doc,
            page_id,
            tab_id,
            section_id,
            item_id,
            update,
            &timestamp_now(),
        )
    }

    /// Same as [`update_item`](Self::update_item) with an explicit edit time
    pub fn update_item_at(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        item_id: &str,
        update: ItemUpdate,
        now: &str,
    ) -> Result<(), TreeOperationError> {
        let section = section_mut(doc, page_id, tab_id, section_id)?;
        let index = ordering::position_of(&section.items, item_id)
            .ok_or_else(|| TreeOperationError::item_not_found(section_id, item_id))?;

        let edits_content = update.edits_content();
        let item = &mut section.items[index];
        if let Some(title) = update.title {
            item.title = title;
        }
        if let Some(content) = update.content {
            item.content = content;
        }
        if let Some(sources) = update.sources {
            item.sources = sources;
        }
        match update.last_updated {
            Some(last_updated) => item.last_updated = last_updated,
            None if edits_content => item.last_updated = now.to_string(),
            None => {}
        }
        if let Some(order) = update.order {
            ordering::move_to(&mut section.items, index, order);
        }
        Ok(())
    }

    pub fn delete_item(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        item_id: &str,
    ) -> Result<ContentItem, TreeOperationError> {
        let section = section_mut(doc, page_id, tab_id, section_id)?;
        let index = ordering::position_of(&section.items, item_id)
            .ok_or_else(|| TreeOperationError::item_not_found(section_id, item_id))?;

        Ok(ordering::remove_at(&mut section.items, index))
    }

    pub fn reorder_items<S: AsRef<str>>(
        doc: &mut ContentDocument,
        page_id: &str,
        tab_id: &str,
        section_id: &str,
        item_ids: &[S],
    ) -> Result<(), TreeOperationError> {
        let section = section_mut(doc, page_id, tab_id, section_id)?;
        ordering::reorder_by_ids(&mut section.items, item_ids);
        Ok(())
    }

    //
    // INVARIANTS
    //

    /// Check the dense-order invariant on every sequence in the document
    pub fn is_densely_ordered(doc: &ContentDocument) -> bool {
        doc.pages.values().all(|page| {
            ordering::is_dense(&page.tabs)
                && page.tabs.iter().all(|tab| {
                    ordering::is_dense(&tab.sections)
                        && tab
                            .sections
                            .iter()
                            .all(|section| ordering::is_dense(&section.items))
                })
        })
    }

    /// Renumber every sequence in the document
    ///
    /// Used on documents coming from outside (saves, imports) whose `order`
    /// fields may carry gaps. Sequence position wins over stored `order`.
    pub fn normalize_order(doc: &mut ContentDocument) {
        for page in doc.pages.values_mut() {
            ordering::renumber(&mut page.tabs);
            for tab in &mut page.tabs {
                ordering::renumber(&mut tab.sections);
                for section in &mut tab.sections {
                    ordering::renumber(&mut section.items);
                }
            }
        }
    }
}

fn page_mut<'a>(
    doc: &'a mut ContentDocument,
    page_id: &str,
) -> Result<&'a mut Page, TreeOperationError> {
    doc.pages
        .get_mut(page_id)
        .ok_or_else(|| TreeOperationError::page_not_found(page_id))
}

fn tab_mut<'a>(
    doc: &'a mut ContentDocument,
    page_id: &str,
    tab_id: &str,
) -> Result<&'a mut Tab, TreeOperationError> {
    let page = page_mut(doc, page_id)?;
    let index = ordering::position_of(&page.tabs, tab_id)
        .ok_or_else(|| TreeOperationError::tab_not_found(page_id, tab_id))?;
    Ok(&mut page.tabs[index])
}

fn section_mut<'a>(
    doc: &'a mut ContentDocument,
    page_id: &str,
    tab_id: &str,
    section_id: &str,
) -> Result<&'a mut Section, TreeOperationError> {
    let tab = tab_mut(doc, page_id, tab_id)?;
    let index = ordering::position_of(&tab.sections, section_id)
        .ok_or_else(|| TreeOperationError::section_not_found(tab_id, section_id))?;
    Ok(&mut tab.sections[index])
}
