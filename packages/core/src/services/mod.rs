//! Business Services
//!
//! - `FormatMigrator` - Normalizes stored/imported JSON to the current shape
//! - `ViewProjection` - Visible tabs and search filtering for the viewer
//! - `PersistenceGateway` - Load/save/import/export over primary + fallback
//! - `ContentState` - The editing session: selection, search, edits that persist
//! - `AuthService` - Admin login and bearer sessions

pub mod auth;
pub mod content_state;
pub mod error;
pub mod format_migrator;
pub mod persistence_gateway;
pub mod view_projection;

pub use auth::{password_digest, AdminUser, AuthError, AuthService, Session};
pub use content_state::ContentState;
pub use error::{ContentServiceError, MigrationError};
pub use format_migrator::{DocumentShape, FormatMigrator};
pub use persistence_gateway::{
    ContentHealth, ContentSource, ExportedContent, LoadedContent, PersistenceGateway,
    HISTORY_LIMIT,
};
pub use view_projection::ViewProjection;
