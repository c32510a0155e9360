//! Service Layer Error Types
//!
//! Error types for the content services: document migration, the
//! persistence gateway, and the application state that sits on top of both.

use crate::models::ValidationError;
use crate::operations::TreeOperationError;
use thiserror::Error;

/// Errors raised while converting a raw JSON value into a [`ContentDocument`]
///
/// [`ContentDocument`]: crate::models::ContentDocument
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// The value matches none of the known document shapes
    #[error("Unrecognized document shape: {0}")]
    UnrecognizedShape(String),

    /// The value has a known shape but does not decode
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A legacy entry has the wrong JSON type
    #[error("Invalid legacy entry at {path}: {reason}")]
    InvalidLegacyEntry { path: String, reason: String },
}

impl MigrationError {
    pub fn unrecognized_shape(msg: impl Into<String>) -> Self {
        Self::UnrecognizedShape(msg.into())
    }

    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    pub fn invalid_legacy_entry(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLegacyEntry {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Content service operation errors
///
/// Aggregates the lower layers for the persistence gateway and
/// [`ContentState`](crate::services::ContentState).
#[derive(Error, Debug)]
pub enum ContentServiceError {
    /// Path did not resolve in the content tree
    #[error(transparent)]
    Tree(#[from] TreeOperationError),

    /// Document failed validation before being persisted
    #[error("Content validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Document could not be migrated to the current shape
    #[error("Content migration failed: {0}")]
    Migration(#[from] MigrationError),

    /// The primary store is missing or failed; writes cannot proceed
    #[error("Content store unavailable: {0}")]
    StoreUnavailable(String),

    /// Nothing is stored yet
    #[error("No content found")]
    ContentNotFound,

    /// The application state has no document loaded
    #[error("Content has not been loaded")]
    NotLoaded,
}

impl ContentServiceError {
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Machine-readable code used by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::Tree(err) => err.code(),
            Self::Validation(_) | Self::Migration(_) => "VALIDATION_ERROR",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::ContentNotFound => "CONTENT_NOT_FOUND",
            Self::NotLoaded => "NOT_LOADED",
        }
    }
}
