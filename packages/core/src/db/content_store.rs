//! ContentStore Trait - Primary Store Abstraction
//!
//! Abstracts the primary document store behind an async trait so the
//! persistence gateway can run against libsql in production and against
//! in-process doubles in tests.
//!
//! The store keeps whole-document versions. `upsert` replaces the latest
//! version in place (a normal save); `insert_version` appends a new one (an
//! import). There is no partial patching.
//!
//! # Examples
//!
//! ```rust,no_run
//! use carehub_core::db::{ContentStore, DatabaseService, LibsqlContentStore};
//! use carehub_core::models::ContentDocument;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/carehub.db")).await?);
//!     let store: Arc<dyn ContentStore> = Arc::new(LibsqlContentStore::new(db));
//!
//!     store.upsert(&ContentDocument::default_document()).await?;
//!     assert!(store.latest().await?.is_some());
//!     Ok(())
//! }
//! ```

use crate::models::ContentDocument;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// A stored document version
#[derive(Debug, Clone, PartialEq)]
pub struct StoredVersion {
    pub id: i64,
    pub document: ContentDocument,
    pub created_at: String,
    pub updated_at: String,
}

/// History listing entry; the document body is not decoded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub id: i64,
    pub version: Option<String>,
    pub last_modified: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Abstraction over the primary content store
///
/// Implementations must be `Send + Sync`; the server shares one instance
/// across request handlers.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Most recently updated version, if any
    ///
    /// The document is in the current shape whatever shape it was stored in.
    async fn latest(&self) -> Result<Option<StoredVersion>>;

    /// Replace the latest version in place, or insert the first one
    async fn upsert(&self, document: &ContentDocument) -> Result<StoredVersion>;

    /// Store the document as a new version
    async fn insert_version(&self, document: &ContentDocument) -> Result<StoredVersion>;

    /// Newest-first version summaries
    async fn history(&self, limit: usize) -> Result<Vec<VersionSummary>>;

    /// Number of stored versions
    async fn count(&self) -> Result<u64>;
}
