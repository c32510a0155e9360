//! View Projection
//!
//! Derives what the public viewer renders from a [`ContentDocument`] and the
//! current selection: visible tabs, the default tab, and the sections of the
//! current tab filtered by a search query.
//!
//! Search is a case-insensitive substring match against item titles and
//! content (markup included verbatim) and against section titles:
//!
//! - an item is kept when its title or content matches;
//! - a section is kept when its title matches or it keeps at least one item,
//!   and it then carries only its kept items.

use crate::models::{ContentDocument, Section, Tab};

/// Read-only projections of a content document
pub struct ViewProjection;

impl ViewProjection {
    /// Tabs shown to the public viewer: `visible` only, by `order`
    pub fn visible_tabs<'a>(doc: &'a ContentDocument, page_id: &str) -> Vec<&'a Tab> {
        let mut tabs: Vec<&Tab> = doc
            .page(page_id)
            .map(|page| page.tabs.iter().filter(|tab| tab.visible).collect())
            .unwrap_or_default();
        tabs.sort_by_key(|tab| tab.order);
        tabs
    }

    /// First tab of a page, selected after load, page switch, or deletion
    pub fn default_tab_id(doc: &ContentDocument, page_id: &str) -> Option<String> {
        doc.page(page_id)
            .and_then(|page| page.tabs.first())
            .map(|tab| tab.id.clone())
    }

    /// Sections to render for the current page and tab under `search_query`
    ///
    /// An empty query returns the tab's sections as stored. A page or tab that
    /// does not resolve yields no sections.
    pub fn project(
        doc: &ContentDocument,
        page_id: &str,
        tab_id: &str,
        search_query: &str,
    ) -> Vec<Section> {
        let Some(tab) = doc.page(page_id).and_then(|page| page.tab(tab_id)) else {
            return Vec::new();
        };
        Self::filter_sections(&tab.sections, search_query)
    }

    /// Apply the search rule to a list of sections
    pub fn filter_sections(sections: &[Section], search_query: &str) -> Vec<Section> {
        if search_query.is_empty() {
            return sections.to_vec();
        }

        let needle = search_query.to_lowercase();
        let matches = |text: &str| text.to_lowercase().contains(&needle);

        let mut ordered: Vec<&Section> = sections.iter().collect();
        ordered.sort_by_key(|section| section.order);

        ordered
            .into_iter()
            .filter_map(|section| {
                let mut items: Vec<_> = section
                    .items
                    .iter()
                    .filter(|item| matches(&item.title) || matches(&item.content))
                    .cloned()
                    .collect();
                if items.is_empty() && !matches(&section.title) {
                    return None;
                }
                items.sort_by_key(|item| item.order);
                Some(Section {
                    items,
                    ..section.clone()
                })
            })
            .collect()
    }

    /// Number of items in a projection (the search result counter)
    pub fn match_count(sections: &[Section]) -> usize {
        sections.iter().map(|section| section.items.len()).sum()
    }
}
