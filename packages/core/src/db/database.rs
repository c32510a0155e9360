//! Database Connection Management
//!
//! Connection and schema management for the content version store, built on
//! libsql (embedded SQLite).
//!
//! # Schema
//!
//! A single `content_versions` table holds one row per stored document
//! version. The document itself is kept as a JSON string; `version` and
//! `last_modified` are copied out of its metadata so history can be listed
//! without decoding every document.
//!
//! # Connection Pattern
//!
//! Every operation opens its own connection through `connect_with_timeout()`,
//! which sets a 5 second busy timeout so concurrent requests wait for the
//! write lock instead of failing with `SQLITE_BUSY`.
//!
//! ```no_run
//! # use carehub_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseService::new(PathBuf::from("./data/carehub.db")).await?;
//! let conn = db.connect_with_timeout().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// One row of `content_versions`, undecoded
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRow {
    pub id: i64,
    pub document: String,
    pub version: Option<String>,
    pub last_modified: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Parameters for writing a version row
#[derive(Debug, Clone, Copy)]
pub struct DbWriteVersionParams<'a> {
    pub document: &'a str,
    pub version: Option<&'a str>,
    pub last_modified: Option<&'a str>,
    pub now: &'a str,
}

/// Database service for managing the libsql connection and schema
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

const VERSION_COLUMNS: &str = "id, document, version, last_modified, created_at, updated_at";

impl DatabaseService {
    /// Open (or create) the database at `db_path` and initialize the schema
    ///
    /// The parent directory is created when missing.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::create_directory(parent.to_path_buf(), e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::open_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };
        service.initialize_schema().await?;

        debug!("Content database ready at {}", service.db_path.display());
        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so they go through query() instead of
    /// execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::query(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::query(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Create tables and indexes (idempotent)
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS content_versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document TEXT NOT NULL,
                version TEXT,
                last_modified TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::schema(format!(
                "Failed to create content_versions table: {}",
                e
            ))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_content_versions_updated ON content_versions(updated_at)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::schema(format!(
                "Failed to create index 'idx_content_versions_updated': {}",
                e
            ))
        })?;

        Ok(())
    }

    /// Get a raw connection
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::Libsql)
    }

    /// Get a connection with a 5 second busy timeout
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;
        Ok(conn)
    }

    //
    // CONTENT VERSION OPERATIONS
    //

    /// Most recently updated version row
    pub async fn db_latest_version(&self) -> Result<Option<VersionRow>, DatabaseError> {
        let mut rows = self
            .db_select_versions(
                &format!(
                    "SELECT {} FROM content_versions ORDER BY updated_at DESC, id DESC LIMIT 1",
                    VERSION_COLUMNS
                ),
                "latest",
            )
            .await?;
        Ok(rows.pop())
    }

    /// Version row by id
    pub async fn db_get_version(&self, id: i64) -> Result<Option<VersionRow>, DatabaseError> {
        let mut rows = self
            .db_select_versions(
                &format!(
                    "SELECT {} FROM content_versions WHERE id = {}",
                    VERSION_COLUMNS, id
                ),
                "get_version",
            )
            .await?;
        Ok(rows.pop())
    }

    /// Newest-first version rows
    pub async fn db_list_versions(&self, limit: usize) -> Result<Vec<VersionRow>, DatabaseError> {
        self.db_select_versions(
            &format!(
                "SELECT {} FROM content_versions ORDER BY updated_at DESC, id DESC LIMIT {}",
                VERSION_COLUMNS, limit
            ),
            "history",
        )
        .await
    }

    /// Insert a new version row, returning its id
    pub async fn db_insert_version(
        &self,
        params: DbWriteVersionParams<'_>,
    ) -> Result<i64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO content_versions (document, version, last_modified, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                params.document,
                params.version,
                params.last_modified,
                params.now,
                params.now,
            ),
        )
        .await
        .map_err(|e| DatabaseError::query(format!("Failed to insert version: {}", e)))?;

        Ok(conn.last_insert_rowid())
    }

    /// Replace the document of an existing version row
    ///
    /// Returns `false` when no row has the given id.
    pub async fn db_replace_version(
        &self,
        id: i64,
        params: DbWriteVersionParams<'_>,
    ) -> Result<bool, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let affected = conn
            .execute(
                "UPDATE content_versions
                 SET document = ?, version = ?, last_modified = ?, updated_at = ?
                 WHERE id = ?",
                (
                    params.document,
                    params.version,
                    params.last_modified,
                    params.now,
                    id,
                ),
            )
            .await
            .map_err(|e| {
                DatabaseError::query(format!("Failed to replace version {}: {}", id, e))
            })?;

        Ok(affected > 0)
    }

    /// Number of stored versions
    pub async fn db_count_versions(&self) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare("SELECT COUNT(*) FROM content_versions")
            .await
            .map_err(|e| {
                DatabaseError::query(format!("Failed to prepare count query: {}", e))
            })?;
        let mut rows = stmt.query(()).await.map_err(|e| {
            DatabaseError::query(format!("Failed to execute count query: {}", e))
        })?;

        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::query(e.to_string()))?
        {
            Some(row) => {
                let count: i64 = row.get(0).map_err(|e| {
                    DatabaseError::query(format!("Failed to read count column: {}", e))
                })?;
                Ok(count.max(0) as u64)
            }
            None => Ok(0),
        }
    }

    async fn db_select_versions(
        &self,
        sql: &str,
        label: &str,
    ) -> Result<Vec<VersionRow>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn.prepare(sql).await.map_err(|e| {
            DatabaseError::query(format!("Failed to prepare {} query: {}", label, e))
        })?;
        let mut rows = stmt.query(()).await.map_err(|e| {
            DatabaseError::query(format!("Failed to execute {} query: {}", label, e))
        })?;

        let mut versions = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::query(e.to_string()))?
        {
            versions.push(row_to_version(&row)?);
        }
        Ok(versions)
    }
}

fn row_to_version(row: &libsql::Row) -> Result<VersionRow, DatabaseError> {
    let column = |e: libsql::Error| {
        DatabaseError::query(format!("Failed to read content_versions column: {}", e))
    };

    Ok(VersionRow {
        id: row.get(0).map_err(column)?,
        document: row.get(1).map_err(column)?,
        version: row.get(2).map_err(column)?,
        last_modified: row.get(3).map_err(column)?,
        created_at: row.get(4).map_err(column)?,
        updated_at: row.get(5).map_err(column)?,
    })
}
