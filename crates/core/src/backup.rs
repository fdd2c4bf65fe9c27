//! Persisted snapshot of the last-seen source content, used as the
//! three-way-merge ancestor.
//!
//! The store is one JSON document, `{ "files": { "<name>": "<content>" } }`,
//! loaded once at run start, mutated in place during the run (one entry per
//! synced file), and written back whole at run end. A store is owned by a
//! single run; there is deliberately no process-wide instance.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::BackupError;
use crate::file::File;

/// On-disk shape of the backup document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BackupDocument {
    files: BTreeMap<String, String>,
}

/// The merge-base content for every file synced at least once.
///
/// Invariant: after a completed sync of file `name`, `files[name]` equals the
/// *source* content seen during that sync — even when the merge produced
/// conflict markers. The next run measures drift against the newest source,
/// never against a previously merged result.
#[derive(Debug)]
pub struct BackupStore {
    path: PathBuf,
    files: BTreeMap<String, String>,
}

impl BackupStore {
    /// Create an empty store that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            files: BTreeMap::new(),
        }
    }

    /// Load the store from disk.
    ///
    /// An absent document is first-run state and yields an empty store; a
    /// present but unparsable document is [`BackupError::Corrupt`].
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, BackupError> {
        let path = path.into();
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no backup document, starting empty");
                return Ok(Self::new(path));
            }
            Err(e) => return Err(BackupError::Io(e)),
        };

        let doc: BackupDocument = serde_json::from_str(&raw).map_err(|e| BackupError::Corrupt {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

        debug!(path = %path.display(), entries = doc.files.len(), "loaded backup document");
        Ok(Self {
            path,
            files: doc.files,
        })
    }

    /// Path the store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of every file the store holds a merge base for.
    pub fn file_names(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    /// Fetch the merge base for `name`.
    ///
    /// Never fails: an absent entry means "no prior base" (first sync) and
    /// comes back as empty content.
    pub fn get_file(&self, name: &str) -> File {
        File::new(
            self.path.parent().unwrap_or_else(|| Path::new("")).join(name),
            self.files.get(name).map(String::as_str).unwrap_or(""),
        )
    }

    /// Upsert the merge base for `name`.
    pub fn put_file(&mut self, name: &str, content: impl Into<String>) {
        self.files.insert(name.to_string(), content.into());
    }

    /// Drop the entry for `name`, if any.
    pub fn remove_file(&mut self, name: &str) {
        self.files.remove(name);
    }

    /// Serialize the store to its JSON document form.
    pub fn serialize(&self) -> Result<String, BackupError> {
        let doc = BackupDocument {
            files: self.files.clone(),
        };
        Ok(serde_json::to_string(&doc)?)
    }

    /// Persist the whole document to the store's path, overwriting.
    pub async fn save(&self) -> Result<(), BackupError> {
        let raw = self.serialize()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, raw).await?;
        debug!(path = %self.path.display(), entries = self.files.len(), "saved backup document");
        Ok(())
    }
}
