//! Error types for tree operations
//!
//! Every variant is a NotFound condition: a path segment that does not
//! resolve under its claimed parent. Tree operations resolve the whole path
//! before touching anything, so an error always means the document was left
//! unchanged.

use thiserror::Error;

/// Errors that can occur while addressing a node in the content tree
///
/// # Examples
///
/// ```rust
/// use carehub_core::operations::TreeOperationError;
///
/// let err = TreeOperationError::tab_not_found("caregiver", "benefits");
/// assert_eq!(err.to_string(), "Tab 'benefits' not found on page 'caregiver'");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeOperationError {
    #[error("Page '{page_id}' not found")]
    PageNotFound { page_id: String },

    #[error("Tab '{tab_id}' not found on page '{page_id}'")]
    TabNotFound { page_id: String, tab_id: String },

    #[error("Section '{section_id}' not found in tab '{tab_id}'")]
    SectionNotFound { tab_id: String, section_id: String },

    #[error("Item '{item_id}' not found in section '{section_id}'")]
    ItemNotFound { section_id: String, item_id: String },
}

impl TreeOperationError {
    pub fn page_not_found(page_id: impl Into<String>) -> Self {
        Self::PageNotFound {
            page_id: page_id.into(),
        }
    }

    pub fn tab_not_found(page_id: impl Into<String>, tab_id: impl Into<String>) -> Self {
        Self::TabNotFound {
            page_id: page_id.into(),
            tab_id: tab_id.into(),
        }
    }

    pub fn section_not_found(tab_id: impl Into<String>, section_id: impl Into<String>) -> Self {
        Self::SectionNotFound {
            tab_id: tab_id.into(),
            section_id: section_id.into(),
        }
    }

    pub fn item_not_found(section_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self::ItemNotFound {
            section_id: section_id.into(),
            item_id: item_id.into(),
        }
    }

    /// Machine-readable code used by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::PageNotFound { .. } => "PAGE_NOT_FOUND",
            Self::TabNotFound { .. } => "TAB_NOT_FOUND",
            Self::SectionNotFound { .. } => "SECTION_NOT_FOUND",
            Self::ItemNotFound { .. } => "ITEM_NOT_FOUND",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_not_found_error() {
        let err = TreeOperationError::page_not_found("respite");
        assert!(matches!(err, TreeOperationError::PageNotFound { .. }));
        assert_eq!(format!("{}", err), "Page 'respite' not found");
        assert_eq!(err.code(), "PAGE_NOT_FOUND");
    }

    #[test]
    fn test_section_not_found_error() {
        let err = TreeOperationError::section_not_found("money", "gov");
        assert_eq!(format!("{}", err), "Section 'gov' not found in tab 'money'");
        assert_eq!(err.code(), "SECTION_NOT_FOUND");
    }

    #[test]
    fn test_item_not_found_error() {
        let err = TreeOperationError::item_not_found("gov", "medicare");
        assert_eq!(
            format!("{}", err),
            "Item 'medicare' not found in section 'gov'"
        );
    }
}
