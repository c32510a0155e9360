//! Database Layer
//!
//! Storage for the content document:
//!
//! - [`DatabaseService`] - libsql connection and `content_versions` schema
//! - [`ContentStore`] - async trait the persistence gateway talks to
//! - [`LibsqlContentStore`] - `ContentStore` over `DatabaseService`
//! - [`FallbackFile`] - static JSON file used for reads when the primary
//!   store has nothing, and as a backup target after saves

mod content_store;
mod database;
mod error;
mod fallback_file;
mod libsql_store;

pub use content_store::{ContentStore, StoredVersion, VersionSummary};
pub use database::{DatabaseService, DbWriteVersionParams, VersionRow};
pub use error::DatabaseError;
pub use fallback_file::FallbackFile;
pub use libsql_store::LibsqlContentStore;
