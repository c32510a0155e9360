//! LibsqlContentStore - ContentStore Implementation for libsql
//!
//! Thin wrapper around [`DatabaseService`] that encodes documents as JSON
//! rows and decodes them back. All SQL lives in the service.
//!
//! Rows are read as raw JSON and passed through [`FormatMigrator::normalize`],
//! so versions written in an older shape load as current documents.

use crate::db::content_store::{ContentStore, StoredVersion, VersionSummary};
use crate::db::database::{DatabaseService, DbWriteVersionParams, VersionRow};
use crate::db::error::DatabaseError;
use crate::models::{timestamp_now, ContentDocument};
use crate::services::FormatMigrator;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// libsql-backed content store
pub struct LibsqlContentStore {
    db: Arc<DatabaseService>,
}

impl LibsqlContentStore {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Open the database at `db_path` and wrap it
    pub async fn open(db_path: std::path::PathBuf) -> Result<Self, DatabaseError> {
        Ok(Self::new(Arc::new(DatabaseService::new(db_path).await?)))
    }

    pub fn database(&self) -> &Arc<DatabaseService> {
        &self.db
    }

    async fn write(&self, document: &ContentDocument, replace: Option<i64>) -> Result<StoredVersion> {
        let encoded = serde_json::to_string(document).map_err(DatabaseError::from)?;
        let metadata = document.metadata.as_ref();
        let now = timestamp_now();
        let params = DbWriteVersionParams {
            document: &encoded,
            version: metadata.map(|m| m.version.as_str()),
            last_modified: metadata.map(|m| m.last_modified.as_str()),
            now: &now,
        };

        let id = match replace {
            Some(id) if self.db.db_replace_version(id, params).await? => id,
            _ => self.db.db_insert_version(params).await?,
        };

        let stored = self
            .db
            .db_get_version(id)
            .await?
            .with_context(|| format!("content version {} vanished after write", id))?;
        decode(stored)
    }
}

fn decode(row: VersionRow) -> Result<StoredVersion> {
    let value: serde_json::Value = serde_json::from_str(&row.document)
        .map_err(|e| DatabaseError::invalid_version(row.id, e))?;
    let document =
        FormatMigrator::normalize(value).map_err(|e| DatabaseError::invalid_version(row.id, e))?;

    Ok(StoredVersion {
        id: row.id,
        document,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl ContentStore for LibsqlContentStore {
    async fn latest(&self) -> Result<Option<StoredVersion>> {
        self.db.db_latest_version().await?.map(decode).transpose()
    }

    async fn upsert(&self, document: &ContentDocument) -> Result<StoredVersion> {
        let latest = self.db.db_latest_version().await?.map(|row| row.id);
        debug!("Upserting content (replacing version {:?})", latest);
        self.write(document, latest).await
    }

    async fn insert_version(&self, document: &ContentDocument) -> Result<StoredVersion> {
        debug!("Inserting new content version");
        self.write(document, None).await
    }

    async fn history(&self, limit: usize) -> Result<Vec<VersionSummary>> {
        let rows = self.db.db_list_versions(limit).await?;
        Ok(rows
            .into_iter()
            .map(|row| VersionSummary {
                id: row.id,
                version: row.version,
                last_modified: row.last_modified,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.db.db_count_versions().await?)
    }
}
