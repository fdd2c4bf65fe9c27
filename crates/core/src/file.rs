//! In-memory representation of a single synced file.
//!
//! A [`File`] is ephemeral: it is read fresh at the start of each per-file
//! task and discarded once the resolved content has been written back.

use std::path::{Path, PathBuf};

use crate::errors::SyncError;

/// A file's location together with its text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path: PathBuf,
    pub content: String,
}

impl File {
    /// Build a file value without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read a file as text.
    ///
    /// A missing path is not an error: it yields empty content, which the
    /// sync decision table treats as "nothing local to preserve".
    pub async fn read(path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(SyncError::io(path.display().to_string(), e)),
        };
        Ok(Self { path, content })
    }

    /// Write the content to the file's own path.
    pub async fn write(&self) -> Result<(), SyncError> {
        write_text(&self.path, &self.content).await
    }
}

/// Write a text blob to `path`, creating parent directories as needed.
pub async fn write_text(path: &Path, content: &str) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::io(parent.display().to_string(), e))?;
        }
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| SyncError::io(path.display().to_string(), e))
}
