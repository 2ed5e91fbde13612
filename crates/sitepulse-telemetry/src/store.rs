//! Local export storage
//!
//! Manages user study export files in `~/.local/share/sitepulse/exports/`.
//! The store is also an [`IArtifactTarget`], so a tracker can offer its
//! export straight into it.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use sitepulse_core::ports::IArtifactTarget;
use tracing::debug;

use crate::export::{UserStudyExport, EXPORT_FILE_PREFIX};

/// Entry in the local export store
#[derive(Debug, Clone)]
pub struct ExportEntry {
    /// Session id taken from the file name
    pub id: String,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
    pub path: PathBuf,
}

/// Manages the local directory of export files.
pub struct ExportStore {
    exports_dir: PathBuf,
}

impl ExportStore {
    /// Creates a new store pointing at `exports_dir`.
    pub fn new(exports_dir: PathBuf) -> Self {
        Self { exports_dir }
    }

    /// Returns the default exports directory.
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("sitepulse")
            .join("exports")
    }

    /// List export files, newest first.
    pub fn list(&self) -> anyhow::Result<Vec<ExportEntry>> {
        if !self.exports_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.exports_dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let stem = path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let Some(id) = parse_export_filename(&stem) else {
                continue;
            };

            let metadata = entry.metadata()?;
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            entries.push(ExportEntry {
                id: id.to_string(),
                size_bytes: metadata.len(),
                modified,
                path,
            });
        }

        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));
        Ok(entries)
    }

    /// Read an export by session id or a unique id prefix.
    pub fn read(&self, id: &str) -> anyhow::Result<Option<UserStudyExport>> {
        let Some(entry) = self.find(id)? else {
            return Ok(None);
        };
        let content = std::fs::read_to_string(&entry.path)
            .with_context(|| format!("Failed to read {}", entry.path.display()))?;
        let export = serde_json::from_str(&content)
            .with_context(|| format!("Malformed export file {}", entry.path.display()))?;
        Ok(Some(export))
    }

    /// Delete an export by session id or id prefix.
    pub fn delete(&self, id: &str) -> anyhow::Result<bool> {
        match self.find(id)? {
            Some(entry) => {
                std::fs::remove_file(&entry.path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete all exports.
    pub fn delete_all(&self) -> anyhow::Result<u32> {
        let entries = self.list()?;
        let mut count = 0;
        for entry in entries {
            if std::fs::remove_file(&entry.path).is_ok() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns the exports directory path.
    pub fn exports_dir(&self) -> &Path {
        &self.exports_dir
    }

    fn find(&self, id: &str) -> anyhow::Result<Option<ExportEntry>> {
        if id.is_empty() {
            return Ok(None);
        }
        let entries = self.list()?;
        if let Some(exact) = entries.iter().find(|e| e.id == id) {
            return Ok(Some(exact.clone()));
        }
        Ok(entries.into_iter().find(|e| e.id.starts_with(id)))
    }
}

impl IArtifactTarget for ExportStore {
    fn offer(&self, file_name: &str, mime_type: &str, contents: &[u8]) -> anyhow::Result<()> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            bail!("Refusing to write export with file name '{file_name}'");
        }

        std::fs::create_dir_all(&self.exports_dir).with_context(|| {
            format!("Failed to create exports directory {}", self.exports_dir.display())
        })?;
        let path = self.exports_dir.join(file_name);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!(path = %path.display(), mime_type, bytes = contents.len(), "Export written");
        Ok(())
    }
}

/// Extract the session id from a stem like `user_study_data_<id>`.
fn parse_export_filename(stem: &str) -> Option<&str> {
    stem.strip_prefix(EXPORT_FILE_PREFIX).filter(|id| !id.is_empty())
}
