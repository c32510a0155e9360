//! Persistence Gateway
//!
//! Loads and saves the whole content document.
//!
//! # Read path
//!
//! `load()` never fails. It tries, in order:
//!
//! 1. the latest version in the primary [`ContentStore`] (stores hand back
//!    documents already normalized);
//! 2. the static fallback file, normalized through [`FormatMigrator`];
//! 3. [`ContentDocument::default_document`].
//!
//! Failures at each step are logged and fall through to the next.
//!
//! # Write path
//!
//! Writes go to the primary store only. A missing or failing primary store is
//! a failed write ([`ContentServiceError::StoreUnavailable`]). After a
//! successful save the document is mirrored to the fallback file on a best
//! effort basis; a failed backup is logged and swallowed.

use crate::db::{ContentStore, FallbackFile, VersionSummary};
use crate::models::{timestamp_now, ContentDocument};
use crate::operations::TreeOperations;
use crate::services::error::ContentServiceError;
use crate::services::format_migrator::FormatMigrator;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Number of versions returned by [`PersistenceGateway::history`]
pub const HISTORY_LIMIT: usize = 10;

/// Where a loaded document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Primary,
    Fallback,
    Default,
}

/// Result of [`PersistenceGateway::load`]
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedContent {
    pub document: ContentDocument,
    pub source: ContentSource,
}

/// Export payload: the stored document plus the export time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedContent {
    #[serde(flatten)]
    pub document: ContentDocument,
    pub exported_at: String,
}

/// Store status for the content health endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentHealth {
    pub database_available: bool,
    pub total_versions: u64,
    pub latest_update: Option<String>,
    pub version: String,
    pub fallback_available: bool,
}

/// Load/save boundary for the content document
pub struct PersistenceGateway {
    primary: Option<Arc<dyn ContentStore>>,
    fallback: FallbackFile,
}

impl PersistenceGateway {
    /// Gateway over an optional primary store and the fallback file
    ///
    /// `primary` is `None` when the database could not be opened; reads then
    /// come from the fallback chain and writes fail.
    pub fn new(primary: Option<Arc<dyn ContentStore>>, fallback: FallbackFile) -> Self {
        Self { primary, fallback }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn fallback(&self) -> &FallbackFile {
        &self.fallback
    }

    fn primary(&self) -> Result<&Arc<dyn ContentStore>, ContentServiceError> {
        self.primary
            .as_ref()
            .ok_or_else(|| ContentServiceError::store_unavailable("no primary store configured"))
    }

    /// Load the current document through the fallback chain
    #[instrument(skip(self))]
    pub async fn load(&self) -> LoadedContent {
        if let Some(primary) = &self.primary {
            match primary.latest().await {
                Ok(Some(stored)) => {
                    debug!("Loaded content version {} from primary store", stored.id);
                    return LoadedContent {
                        document: stored.document,
                        source: ContentSource::Primary,
                    };
                }
                Ok(None) => debug!("Primary store is empty"),
                Err(e) => warn!("Primary store read failed, trying fallback file: {:#}", e),
            }
        }

        match self.fallback.read().await {
            Ok(Some(value)) => match FormatMigrator::normalize(value) {
                Ok(document) => {
                    info!("Loaded content from {}", self.fallback.path().display());
                    return LoadedContent {
                        document,
                        source: ContentSource::Fallback,
                    };
                }
                Err(e) => warn!("Fallback file is not a content document: {}", e),
            },
            Ok(None) => debug!("No fallback file at {}", self.fallback.path().display()),
            Err(e) => warn!("Fallback file read failed: {:#}", e),
        }

        info!("Serving default content");
        LoadedContent {
            document: ContentDocument::default_document(),
            source: ContentSource::Default,
        }
    }

    /// Replace the stored document
    ///
    /// Validates, re-densifies `order`, stamps `metadata.lastModified`, and
    /// upserts into the primary store. Returns the document as stored.
    #[instrument(skip(self, document))]
    pub async fn save(
        &self,
        mut document: ContentDocument,
    ) -> Result<ContentDocument, ContentServiceError> {
        document.validate()?;
        let primary = self.primary()?;

        TreeOperations::normalize_order(&mut document);
        document.touch(&timestamp_now());

        let stored = primary.upsert(&document).await.map_err(|e| {
            error!("Failed to save content: {:#}", e);
            ContentServiceError::store_unavailable(format!("{:#}", e))
        })?;
        info!("✅ Saved content version {}", stored.id);

        if let Err(e) = self.fallback.write(&stored.document).await {
            warn!("Failed to save backup file: {:#}", e);
        }

        Ok(stored.document)
    }

    /// Store the document as a new version without touching earlier ones
    #[instrument(skip(self, document))]
    pub async fn import(
        &self,
        mut document: ContentDocument,
    ) -> Result<ContentDocument, ContentServiceError> {
        document.validate()?;
        let primary = self.primary()?;

        let now = timestamp_now();
        TreeOperations::normalize_order(&mut document);
        document.touch(&now);
        if let Some(metadata) = document.metadata.as_mut() {
            metadata.imported_at = Some(now);
        }

        let stored = primary.insert_version(&document).await.map_err(|e| {
            error!("Failed to import content: {:#}", e);
            ContentServiceError::store_unavailable(format!("{:#}", e))
        })?;
        info!(
            "✅ Imported content as version {} ({} items)",
            stored.id,
            stored.document.item_count()
        );

        Ok(stored.document)
    }

    /// Latest stored document with an export timestamp
    pub async fn export(&self) -> Result<ExportedContent, ContentServiceError> {
        let stored = self
            .primary()?
            .latest()
            .await
            .map_err(|e| ContentServiceError::store_unavailable(format!("{:#}", e)))?
            .ok_or(ContentServiceError::ContentNotFound)?;

        Ok(ExportedContent {
            document: stored.document,
            exported_at: timestamp_now(),
        })
    }

    /// Newest-first summaries of stored versions
    pub async fn history(&self) -> Result<Vec<VersionSummary>, ContentServiceError> {
        self.primary()?
            .history(HISTORY_LIMIT)
            .await
            .map_err(|e| ContentServiceError::store_unavailable(format!("{:#}", e)))
    }

    /// Primary store status; never fails
    pub async fn health(&self) -> ContentHealth {
        let fallback_available = self.fallback.exists();
        let unavailable = || ContentHealth {
            database_available: false,
            total_versions: 0,
            latest_update: None,
            version: "unknown".to_string(),
            fallback_available,
        };

        let Some(primary) = &self.primary else {
            return unavailable();
        };

        let (count, latest) = match (primary.count().await, primary.latest().await) {
            (Ok(count), Ok(latest)) => (count, latest),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Content health check failed: {:#}", e);
                return unavailable();
            }
        };

        ContentHealth {
            database_available: true,
            total_versions: count,
            latest_update: latest.as_ref().map(|stored| stored.updated_at.clone()),
            version: latest
                .and_then(|stored| stored.document.metadata)
                .map(|metadata| metadata.version)
                .unwrap_or_else(|| "unknown".to_string()),
            fallback_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LibsqlContentStore;
    use crate::models::{Tab, ValidationError, CAREGIVER_PAGE};
    use serde_json::json;
    use tempfile::TempDir;

    async fn gateway_with_store(temp_dir: &TempDir) -> PersistenceGateway {
        let store = LibsqlContentStore::open(temp_dir.path().join("carehub.db"))
            .await
            .unwrap();
        PersistenceGateway::new(
            Some(Arc::new(store)),
            FallbackFile::new(temp_dir.path().join("content.json")),
        )
    }

    fn gateway_without_store(temp_dir: &TempDir) -> PersistenceGateway {
        PersistenceGateway::new(None, FallbackFile::new(temp_dir.path().join("content.json")))
    }

    fn document_with_tab() -> ContentDocument {
        let mut doc = ContentDocument::default_document();
        TreeOperations::add_tab(&mut doc, CAREGIVER_PAGE, Tab::new("t1", "Benefits")).unwrap();
        doc
    }

    #[tokio::test]
    async fn test_load_defaults_when_nothing_is_stored() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = gateway_with_store(&temp_dir).await;

        let loaded = gateway.load().await;

        assert_eq!(loaded.source, ContentSource::Default);
        assert_eq!(loaded.document.pages.len(), 2);
        assert_eq!(
            loaded.document.metadata.unwrap().author.as_deref(),
            Some("System")
        );
    }

    #[tokio::test]
    async fn test_load_migrates_legacy_fallback_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("content.json"),
            json!({"caregiver": {"money": {"sectionTitle": "Money", "parentHeaders": []}}})
                .to_string(),
        )
        .unwrap();
        let gateway = gateway_without_store(&temp_dir);

        let loaded = gateway.load().await;

        assert_eq!(loaded.source, ContentSource::Fallback);
        assert_eq!(loaded.document.pages[CAREGIVER_PAGE].tabs[0].title, "Money");
    }

    #[tokio::test]
    async fn test_load_ignores_unreadable_fallback_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("content.json"), "{ nope").unwrap();
        let gateway = gateway_without_store(&temp_dir);

        assert_eq!(gateway.load().await.source, ContentSource::Default);
    }

    #[tokio::test]
    async fn test_save_then_load_from_primary_and_backup() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = gateway_with_store(&temp_dir).await;

        let saved = gateway.save(document_with_tab()).await.unwrap();
        let loaded = gateway.load().await;

        assert_eq!(loaded.source, ContentSource::Primary);
        assert_eq!(loaded.document, saved);
        assert!(gateway.fallback().exists());
    }

    #[tokio::test]
    async fn test_save_stamps_last_modified() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = gateway_with_store(&temp_dir).await;
        let mut doc = document_with_tab();
        doc.metadata = None;

        let saved = gateway.save(doc).await.unwrap();

        let metadata = saved.metadata.unwrap();
        assert_eq!(metadata.version, "2.0.0");
        assert!(!metadata.last_modified.is_empty());
    }

    #[tokio::test]
    async fn test_save_without_primary_is_store_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = gateway_without_store(&temp_dir);

        let err = gateway.save(document_with_tab()).await.unwrap_err();

        assert!(matches!(err, ContentServiceError::StoreUnavailable(_)));
        assert!(!gateway.fallback().exists());
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_document() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = gateway_with_store(&temp_dir).await;
        let mut doc = document_with_tab();
        TreeOperations::add_tab(&mut doc, CAREGIVER_PAGE, Tab::new("t1", "Again")).unwrap();

        let err = gateway.save(doc).await.unwrap_err();

        assert!(matches!(
            err,
            ContentServiceError::Validation(ValidationError::DuplicateId { .. })
        ));
        assert_eq!(gateway.load().await.source, ContentSource::Default);
    }

    #[tokio::test]
    async fn test_import_adds_version_and_history() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = gateway_with_store(&temp_dir).await;

        gateway.save(ContentDocument::default_document()).await.unwrap();
        let imported = gateway.import(document_with_tab()).await.unwrap();

        assert!(imported.metadata.as_ref().unwrap().imported_at.is_some());
        assert_eq!(gateway.history().await.unwrap().len(), 2);
        assert_eq!(gateway.load().await.document, imported);

        let health = gateway.health().await;
        assert!(health.database_available);
        assert_eq!(health.total_versions, 2);
        assert_eq!(health.version, "2.0.0");
        assert!(health.fallback_available);
    }

    #[tokio::test]
    async fn test_export_requires_stored_content() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = gateway_with_store(&temp_dir).await;

        assert!(matches!(
            gateway.export().await,
            Err(ContentServiceError::ContentNotFound)
        ));

        gateway.save(document_with_tab()).await.unwrap();
        let exported = gateway.export().await.unwrap();
        let value = serde_json::to_value(&exported).unwrap();
        assert!(value["pages"]["caregiver"].is_object());
        assert!(value["exportedAt"].is_string());
    }

    #[tokio::test]
    async fn test_health_without_primary() {
        let temp_dir = TempDir::new().unwrap();
        let health = gateway_without_store(&temp_dir).health().await;

        assert!(!health.database_available);
        assert_eq!(health.version, "unknown");
        assert!(!health.fallback_available);
    }
}
