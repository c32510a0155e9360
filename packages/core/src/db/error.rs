//! Content Version Store Errors
//!
//! Failures of the `content_versions` database: opening the file, preparing
//! the schema, running queries, and turning rows back into documents.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to open content database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    #[error("Failed to create directory for content database {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Permission denied for content database: {path}")]
    PermissionDenied { path: PathBuf },

    /// `content_versions` table or index could not be created
    #[error("Failed to prepare content_versions schema: {0}")]
    Schema(String),

    #[error("Database operation failed: {0}")]
    Libsql(#[from] libsql::Error),

    #[error("Content version query failed: {context}")]
    Query { context: String },

    /// Document could not be serialized for storage
    #[error("Failed to encode content document: {0}")]
    Encode(#[from] serde_json::Error),

    /// A stored row holds something other than a content document
    #[error("Content version {id} is not a readable document: {reason}")]
    InvalidVersion { id: i64, reason: String },
}

impl DatabaseError {
    pub fn open_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::OpenFailed { path, source }
    }

    pub fn create_directory(path: PathBuf, source: std::io::Error) -> Self {
        Self::CreateDirectory { path, source }
    }

    pub fn permission_denied(path: PathBuf) -> Self {
        Self::PermissionDenied { path }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn query(context: impl Into<String>) -> Self {
        Self::Query {
            context: context.into(),
        }
    }

    pub fn invalid_version(id: i64, reason: impl std::fmt::Display) -> Self {
        Self::InvalidVersion {
            id,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error() {
        let err = DatabaseError::query("Failed to prepare latest query: boom");
        assert_eq!(
            err.to_string(),
            "Content version query failed: Failed to prepare latest query: boom"
        );
    }

    #[test]
    fn test_invalid_version_names_the_row() {
        let err = DatabaseError::invalid_version(7, "expected an object");
        assert_eq!(
            err.to_string(),
            "Content version 7 is not a readable document: expected an object"
        );
    }

    #[test]
    fn test_permission_denied_error() {
        let err = DatabaseError::permission_denied(PathBuf::from("/root/carehub.db"));
        assert!(err.to_string().contains("/root/carehub.db"));
    }
}
