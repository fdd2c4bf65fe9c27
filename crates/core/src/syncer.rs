//! Per-file synchronization: the three-way-merge decision table.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::backup::BackupStore;
use crate::errors::SyncError;
use crate::file::File;
use crate::merge::{is_conflicted, render, MergeEngine};

/// Resolves one file per run by merging source and actual over the backup
/// base, then upgrading the backup entry to the new source content.
pub struct FileSyncer {
    engine: Arc<dyn MergeEngine>,
}

impl FileSyncer {
    pub fn new(engine: Arc<dyn MergeEngine>) -> Self {
        Self { engine }
    }

    /// Run one file's sync task.
    ///
    /// Reads both sides, resolves per the decision table, writes the result
    /// to the actual path, and only then sets the backup entry to the new
    /// source content. A failed resolution leaves the entry untouched so the
    /// file is retried as unmerged on the next run.
    pub async fn sync_file(
        &self,
        file_name: &str,
        source_path: &Path,
        actual_path: &Path,
        backup: &Mutex<BackupStore>,
    ) -> Result<(), SyncError> {
        let (source, actual) =
            tokio::try_join!(File::read(source_path), File::read(actual_path))?;

        let base = backup.lock().await.get_file(file_name).content;

        let resolved = self.resolve(&source, &actual, &base)?;
        File::new(actual_path, resolved).write().await?;

        backup.lock().await.put_file(file_name, source.content);
        debug!(file = file_name, "synced");
        Ok(())
    }

    /// The three-way-merge decision table, first match wins.
    pub fn resolve(&self, source: &File, actual: &File, base: &str) -> Result<String, SyncError> {
        // (a) No upstream change since base: local state wins verbatim,
        //     including an empty or deleted local file.
        if source.content == base {
            debug!(file = %actual.path.display(), "source unchanged, keeping actual");
            return Ok(actual.content.clone());
        }

        // (b) Nothing local to preserve: bootstrap from source.
        if actual.content.is_empty() {
            debug!(file = %actual.path.display(), "no actual content, copying source");
            return Ok(source.content.clone());
        }

        // (c) A conflict from a prior run must be resolved by hand first.
        if is_conflicted(&actual.content) {
            return Err(SyncError::FileHasConflicts {
                path: actual.path.display().to_string(),
            });
        }

        // (d) Both sides drifted: merge over the backup base.
        let patch = self
            .engine
            .merge(base, &source.content, &actual.content);
        Ok(render(&patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{DiffyMerge, CONFLICT_MARKER_BEGIN, CONFLICT_MARKER_END, LINE_SEP};

    fn syncer() -> FileSyncer {
        FileSyncer::new(Arc::new(DiffyMerge))
    }

    fn file(content: &str) -> File {
        File::new("/actual/.eslintrc.json", content)
    }

    #[test]
    fn test_rule_a_source_unchanged_keeps_actual_verbatim() {
        let base = "{\"a\":1}\n";
        let source = File::new("/source/f", base);
        let actual = file("locally edited, not even json");

        let out = syncer().resolve(&source, &actual, base).unwrap();
        assert_eq!(out, "locally edited, not even json");
    }

    #[test]
    fn test_rule_a_local_deletion_wins_when_source_unchanged() {
        let base = "{\"a\":1}\n";
        let source = File::new("/source/f", base);
        let actual = file("");

        let out = syncer().resolve(&source, &actual, base).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_rule_b_bootstrap_copies_source() {
        let source = File::new("/source/f", "{\"fresh\":true}\n");
        let actual = file("");

        let out = syncer().resolve(&source, &actual, "").unwrap();
        assert_eq!(out, "{\"fresh\":true}\n");
    }

    #[test]
    fn test_rule_c_existing_conflict_blocks_sync() {
        let conflicted = format!(
            "{CONFLICT_MARKER_BEGIN}{LINE_SEP}x{LINE_SEP}======={LINE_SEP}y{LINE_SEP}{CONFLICT_MARKER_END}{LINE_SEP}"
        );
        let source = File::new("/source/f", "anything new\n");
        let actual = file(&conflicted);

        let err = syncer().resolve(&source, &actual, "old base\n").unwrap_err();
        assert!(matches!(err, SyncError::FileHasConflicts { .. }));
    }

    #[test]
    fn test_rule_d_merges_over_base() {
        // spec'd worked example: actual == base, source drifted; the merge
        // falls through rule (a) and converges on the new source.
        let base = "{\"rules\":{\"semi\":\"on\"}}\n";
        let source = File::new("/source/f", "{\"rules\":{\"semi\":\"off\",\"quote\":\"warn\"}}\n");
        let actual = file(base);

        let out = syncer().resolve(&source, &actual, base).unwrap();
        assert_eq!(
            out,
            format!("{{\"rules\":{{\"semi\":\"off\",\"quote\":\"warn\"}}}}{LINE_SEP}")
        );
    }

    #[test]
    fn test_rule_d_competing_edits_render_markers() {
        let base = "a\nb\nc\n";
        let source = File::new("/source/f", "a\nsource-edit\nc\n");
        let actual = file("a\nlocal-edit\nc\n");

        let out = syncer().resolve(&source, &actual, base).unwrap();
        assert!(out.contains(CONFLICT_MARKER_BEGIN));
        assert!(out.contains(CONFLICT_MARKER_END));
        assert!(out.contains("source-edit"));
        assert!(out.contains("local-edit"));
    }

    #[tokio::test]
    async fn test_sync_file_upgrades_backup_entry_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("source").join("a.json");
        let actual_path = dir.path().join("actual").join("a.json");
        crate::file::write_text(&source_path, "{\"v\":2}\n").await.unwrap();

        let backup = Mutex::new(BackupStore::new(dir.path().join(".backup")));
        syncer()
            .sync_file("a.json", &source_path, &actual_path, &backup)
            .await
            .unwrap();

        assert_eq!(backup.lock().await.get_file("a.json").content, "{\"v\":2}\n");
        let written = File::read(&actual_path).await.unwrap();
        assert_eq!(written.content, "{\"v\":2}\n");
    }

    #[tokio::test]
    async fn test_sync_file_failure_leaves_backup_entry_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("source").join("a.json");
        let actual_path = dir.path().join("actual").join("a.json");
        crate::file::write_text(&source_path, "new source\n").await.unwrap();
        crate::file::write_text(
            &actual_path,
            &format!(
                "{CONFLICT_MARKER_BEGIN}{LINE_SEP}x{LINE_SEP}======={LINE_SEP}y{LINE_SEP}{CONFLICT_MARKER_END}{LINE_SEP}"
            ),
        )
        .await
        .unwrap();

        let mut store = BackupStore::new(dir.path().join(".backup"));
        store.put_file("a.json", "prior base\n");
        let backup = Mutex::new(store);

        let err = syncer()
            .sync_file("a.json", &source_path, &actual_path, &backup)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::FileHasConflicts { .. }));
        assert_eq!(backup.lock().await.get_file("a.json").content, "prior base\n");
    }
}
