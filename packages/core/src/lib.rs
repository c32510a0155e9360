//! Care Resource Hub Core Business Logic Layer
//!
//! This crate provides the content tree, its mutation rules, persistence and
//! bulk import for the Care Resource Hub: caregiver and care recipient
//! resources organised as Pages → Tabs → Sections → Items, served to a
//! public viewer and edited through an admin console.
//!
//! # Architecture
//!
//! - **One document**: the whole tree is read and written as a single JSON
//!   document; every admin edit is a full replace
//! - **Pure tree operations**: path-addressed mutations that either succeed
//!   or leave the document untouched
//! - **libsql**: each saved document is a versioned row; a static JSON file
//!   serves as read fallback and write-through backup
//! - **Format migration**: older document shapes are upgraded on load
//!
//! # Modules
//!
//! - [`models`] - Data structures (ContentDocument, Page, Tab, Section, ContentItem)
//! - [`operations`] - TreeOperations and dense sibling ordering
//! - [`services`] - Migration, projection, persistence gateway, app state, auth
//! - [`db`] - Database layer with libsql integration
//! - [`import`] - JSON, outline and CSV bulk import
//! - [`utils`] - Slug helpers

pub mod db;
pub mod import;
pub mod models;
pub mod operations;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use models::*;
pub use operations::{TreeOperationError, TreeOperations};
pub use services::*;
