//! Tree Operations
//!
//! Path-addressed structural reads and writes on the content tree, plus the
//! dense-order helpers they share.
//!
//! - [`TreeOperations`] - find/add/update/delete/reorder for tabs, sections, items
//! - [`ordering`] - generic renumber/move/reorder over any [`Ordered`] sibling
//! - [`TreeOperationError`] - NotFound family, never leaves a partial mutation

mod error;
pub mod ordering;
mod tree;

pub use error::TreeOperationError;
pub use ordering::Ordered;
pub use tree::{TabRemoval, TreeOperations};
