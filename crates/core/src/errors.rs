//! Error types for the ConfSync core library.
//!
//! Each subsystem has its own error type derived with `thiserror`. The
//! coordinator surfaces [`SyncError`], which unifies the backup and per-file
//! failure modes for callers.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Backup store errors
// ---------------------------------------------------------------------------

/// Errors from the persisted backup document.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The persisted backup document exists but cannot be parsed.
    ///
    /// This aborts the whole run: without a trustworthy merge base every
    /// file would degrade to a blind overwrite.
    #[error("backup file at '{path}' is broken: {detail}")]
    Corrupt { path: String, detail: String },

    /// Serializing the store for persistence failed.
    #[error("failed to serialize backup document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Reading or writing the backup document failed.
    #[error("backup I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Sync errors
// ---------------------------------------------------------------------------

/// Errors from a sync run or one of its per-file tasks.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The target file still carries conflict markers from a previous run.
    ///
    /// The markers must be resolved by hand before this file can be merged
    /// again; the file's task is skipped for the run, other files continue.
    #[error("file '{path}' has unresolved conflicts; resolve them before syncing")]
    FileHasConflicts { path: String },

    /// A filesystem operation failed for a specific path.
    #[error("filesystem error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The backup document could not be loaded or persisted.
    #[error(transparent)]
    Backup(#[from] BackupError),

    /// Every per-file task in the run failed.
    #[error("sync run failed: all {failed} file tasks failed, first error: {first}")]
    AllTasksFailed { failed: usize, first: String },
}

impl SyncError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
