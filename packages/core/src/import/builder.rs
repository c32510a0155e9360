//! Incremental construction of an imported document
//!
//! Outline and CSV imports both walk their input top-down and append pages,
//! tabs, sections and items as they appear. Children are addressed by index
//! within their parent; `order` is the sibling count at insertion, so the
//! finished tree is densely ordered without a renumbering pass.

use crate::models::{ContentDocument, ContentItem, Page, Section, Tab};
use crate::utils::{page_key, unique_slug};

pub(crate) struct DocumentBuilder {
    doc: ContentDocument,
    now: String,
}

impl DocumentBuilder {
    /// Start from the default document, stamping items with `now`
    pub fn at(now: &str) -> Self {
        Self {
            doc: ContentDocument::default_document(),
            now: now.to_string(),
        }
    }

    /// Key of the page named `name`, creating the page if needed
    ///
    /// Returns `None` when the name has no alphanumerics.
    pub fn page(&mut self, name: &str) -> Option<String> {
        let key = page_key(name);
        if key.is_empty() {
            return None;
        }
        self.doc
            .pages
            .entry(key.clone())
            .or_insert_with(|| Page::named(key.clone(), name.trim()));
        Some(key)
    }

    pub fn push_tab(&mut self, page: &str, title: &str) -> usize {
        let tabs = &mut self.page_mut(page).tabs;
        let id = unique_slug(title, "tab", tabs.iter().map(|tab| tab.id.as_str()));
        let mut tab = Tab::new(id, title);
        tab.order = tabs.len();
        tabs.push(tab);
        tabs.len() - 1
    }

    /// Index of the tab titled `title`, appending it when absent
    pub fn tab_by_title(&mut self, page: &str, title: &str) -> usize {
        let position = self.page_mut(page).tabs.iter().position(|tab| tab.title == title);
        match position {
            Some(index) => index,
            None => self.push_tab(page, title),
        }
    }

    pub fn push_section(&mut self, page: &str, tab: usize, title: &str) -> usize {
        let sections = &mut self.page_mut(page).tabs[tab].sections;
        let id = unique_slug(
            title,
            "section",
            sections.iter().map(|section| section.id.as_str()),
        );
        let mut section = Section::new(id, title);
        section.order = sections.len();
        sections.push(section);
        sections.len() - 1
    }

    pub fn section_by_title(&mut self, page: &str, tab: usize, title: &str) -> usize {
        let position = self.page_mut(page).tabs[tab]
            .sections
            .iter()
            .position(|section| section.title == title);
        match position {
            Some(index) => index,
            None => self.push_section(page, tab, title),
        }
    }

    pub fn push_item(
        &mut self,
        page: &str,
        tab: usize,
        section: usize,
        title: &str,
        content: &str,
        sources: Option<&str>,
    ) {
        let now = self.now.clone();
        let items = &mut self.page_mut(page).tabs[tab].sections[section].items;
        let id = unique_slug(title, "item", items.iter().map(|item| item.id.as_str()));

        let mut item = ContentItem::new(id, title, content);
        item.sources = sources
            .map(str::trim)
            .filter(|sources| !sources.is_empty())
            .map(str::to_string);
        item.last_updated = now;
        item.order = items.len();
        items.push(item);
    }

    /// The finished document with `metadata.lastModified` set to the build time
    pub fn finish(mut self) -> ContentDocument {
        self.doc.touch(&self.now);
        self.doc
    }

    // Page keys handed out by `page` always exist
    fn page_mut(&mut self, key: &str) -> &mut Page {
        self.doc
            .pages
            .entry(key.to_string())
            .or_insert_with(|| Page::named(key, key))
    }
}
