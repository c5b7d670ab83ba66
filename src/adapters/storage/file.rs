//! File-backed run log store
//!
//! Each log is a pretty-printed JSON file `<directory>/<name>.json`. Writes
//! go to a temporary sibling first and are renamed into place, so readers
//! never see a half-written log.

use super::traits::RunLogStore;
use crate::core::state::RunLog;
use crate::domain::{Result, SyncError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Stores run logs as JSON files in a directory
#[derive(Debug, Clone)]
pub struct FileRunLogStore {
    directory: PathBuf,
}

impl FileRunLogStore {
    /// Create a store rooted at `directory`; the directory is created on first save
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Directory holding the logs
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file for `name`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.json"))
    }
}

#[async_trait]
impl RunLogStore for FileRunLogStore {
    async fn load(&self, name: &str) -> Result<Option<RunLog>> {
        let path = self.path_for(name);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SyncError::State(format!(
                    "Failed to read run log {}: {e}",
                    path.display()
                )))
            }
        };

        let log = serde_json::from_str(&contents).map_err(|e| {
            SyncError::State(format!("Failed to parse run log {}: {e}", path.display()))
        })?;
        Ok(Some(log))
    }

    async fn save(&self, name: &str, log: &RunLog) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await.map_err(|e| {
            SyncError::State(format!(
                "Failed to create state directory {}: {e}",
                self.directory.display()
            ))
        })?;

        let path = self.path_for(name);
        let tmp_path = self.directory.join(format!(".{name}.json.tmp"));
        let contents = serde_json::to_vec_pretty(log)?;

        tokio::fs::write(&tmp_path, contents).await.map_err(|e| {
            SyncError::State(format!("Failed to write {}: {e}", tmp_path.display()))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            SyncError::State(format!("Failed to replace {}: {e}", path.display()))
        })?;

        tracing::debug!(path = %path.display(), "Run log saved");
        Ok(())
    }
}
