//! Per-run orchestration: fan out file tasks, reconcile deletions, persist
//! the backup document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::backup::BackupStore;
use crate::errors::SyncError;
use crate::merge::{DiffyMerge, MergeEngine};
use crate::syncer::FileSyncer;

/// Default cap on concurrently in-flight file tasks.
const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// One file task that failed during a run.
#[derive(Debug)]
pub struct FileFailure {
    pub file_name: String,
    pub error: SyncError,
}

/// What a run did: files synced, files removed, files that failed.
///
/// Per-file failures do not fail the run; they are reported here and the
/// affected files keep their previous backup entry, so the next run retries
/// them as unmerged.
#[derive(Debug, Default)]
pub struct RunReport {
    pub synced: Vec<String>,
    pub removed: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl RunReport {
    /// True when every file task succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives one propagation run from a source tree into an actual tree.
pub struct SyncCoordinator {
    engine: Arc<dyn MergeEngine>,
    max_in_flight: usize,
}

impl Default for SyncCoordinator {
    fn default() -> Self {
        Self::new(Arc::new(DiffyMerge))
    }
}

impl SyncCoordinator {
    pub fn new(engine: Arc<dyn MergeEngine>) -> Self {
        Self {
            engine,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Override the cap on concurrent file tasks.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Execute one full propagation run.
    ///
    /// On success, `actual_dir` reflects merged content for every file
    /// currently in `source_dir`, files removed from `source_dir` are
    /// removed from `actual_dir`, and the backup document at `backup_path`
    /// is rewritten. Fails only if listing/loading fails, if a filesystem
    /// error escapes the per-file scope, or if every file task failed.
    pub async fn run(
        &self,
        source_dir: &Path,
        actual_dir: &Path,
        backup_path: &Path,
    ) -> Result<RunReport, SyncError> {
        info!(
            source = %source_dir.display(),
            actual = %actual_dir.display(),
            "starting sync run"
        );

        let (file_names, backup) = tokio::join!(
            list_file_names(source_dir),
            BackupStore::load(backup_path)
        );
        let file_names = file_names?;
        let backup = Arc::new(Mutex::new(backup?));

        let mut report = RunReport::default();
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks: JoinSet<(String, Result<(), SyncError>)> = JoinSet::new();

        for file_name in &file_names {
            let file_name = file_name.clone();
            let source_path = source_dir.join(&file_name);
            let actual_path = actual_dir.join(&file_name);
            let backup = Arc::clone(&backup);
            let engine = Arc::clone(&self.engine);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                // Holding the Ok keeps the permit; the semaphore is never
                // closed, so acquisition only waits, never fails.
                let _permit = semaphore.acquire_owned().await;
                let result = FileSyncer::new(engine)
                    .sync_file(&file_name, &source_path, &actual_path, &backup)
                    .await;
                (file_name, result)
            });
        }

        // Barrier: deletions below must not race a same-run recreate.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((file_name, Ok(()))) => report.synced.push(file_name),
                Ok((file_name, Err(error))) => {
                    warn!(file = %file_name, %error, "file task failed, continuing");
                    report.failures.push(FileFailure { file_name, error });
                }
                Err(join_error) => {
                    warn!(%join_error, "file task panicked");
                }
            }
        }

        if !file_names.is_empty() && report.failures.len() == file_names.len() {
            return Err(SyncError::AllTasksFailed {
                failed: report.failures.len(),
                first: report.failures[0].error.to_string(),
            });
        }

        // Propagate source-side deletions: anything we hold a base for that
        // the source no longer lists.
        let mut store = backup.lock().await;
        for file_name in store.file_names() {
            if !file_names.contains(&file_name) {
                remove_if_present(&actual_dir.join(&file_name)).await?;
                store.remove_file(&file_name);
                info!(file = %file_name, "removed (deleted upstream)");
                report.removed.push(file_name);
            }
        }

        store.save().await?;

        info!(
            synced = report.synced.len(),
            removed = report.removed.len(),
            failed = report.failures.len(),
            "sync run complete"
        );
        Ok(report)
    }
}

/// List the plain-file entries of `dir`.
async fn list_file_names(dir: &Path) -> Result<Vec<String>, SyncError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| SyncError::io(dir.display().to_string(), e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SyncError::io(dir.display().to_string(), e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| SyncError::io(entry.path().display().to_string(), e))?;
        if !file_type.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => {
                warn!(name = %raw.to_string_lossy(), "skipping non-UTF-8 file name");
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Delete a file, treating "already gone" as success.
async fn remove_if_present(path: &PathBuf) -> Result<(), SyncError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SyncError::io(path.display().to_string(), e)),
    }
}
