//! Static JSON fallback file
//!
//! Second step of the load chain and the target of the best-effort backup
//! written after every successful save. The file is read as a raw JSON value
//! so older document shapes can still be migrated on load.

use crate::models::ContentDocument;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Content document mirrored to a JSON file on disk
#[derive(Debug, Clone)]
pub struct FallbackFile {
    path: PathBuf,
}

impl FallbackFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the file as raw JSON
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub async fn read(&self) -> Result<Option<Value>> {
        if !self.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(Some(value))
    }

    /// Write the document pretty-printed
    ///
    /// Writes to a sibling temp file and renames it over the target, so a
    /// crash mid-write never leaves a truncated file behind.
    pub async fn write(&self, document: &ContentDocument) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        let serialized =
            serde_json::to_string_pretty(document).context("Failed to serialize content")?;

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_file = PathBuf::from(temp_name);

        fs::write(&temp_file, serialized)
            .await
            .with_context(|| format!("Failed to write {}", temp_file.display()))?;
        fs::rename(&temp_file, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}
