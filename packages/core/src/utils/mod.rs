//! Utility functions for Care Resource Hub Core

mod slug;

pub use slug::{page_key, slugify, unique_id, unique_slug};
