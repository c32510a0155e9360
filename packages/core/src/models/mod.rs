//! Data Models
//!
//! This module contains the core data structures of the content tree:
//!
//! - `ContentDocument` - Root holding pages and metadata
//! - `Page`, `Tab`, `Section`, `ContentItem` - The nested tree nodes
//! - `TabUpdate`, `SectionUpdate`, `ItemUpdate` - Explicit partial updates

mod content;
mod update;

pub use content::{
    known_page, timestamp_now, ContentDocument, ContentItem, ContentMetadata, KnownPage, Page,
    Section, Tab, Theme, ValidationError, CAREGIVER_PAGE, CARE_RECIPIENT_PAGE,
    CONTENT_SCHEMA_VERSION, KNOWN_PAGES,
};
pub use update::{ItemUpdate, SectionUpdate, TabUpdate};
