//! ConfSync core library.
//!
//! Propagates a canonical ("source") config-file tree into a working
//! ("actual") directory while preserving local edits. A persisted snapshot
//! of the last-seen source content (the "backup") serves as the common
//! ancestor for per-file three-way merges; concurrent edits that cannot be
//! reconciled are written out with conflict markers for manual resolution.

pub mod backup;
pub mod coordinator;
pub mod errors;
pub mod file;
pub mod merge;
pub mod syncer;

// Re-exports for convenience.
pub use backup::BackupStore;
pub use coordinator::{RunReport, SyncCoordinator};
pub use errors::{BackupError, SyncError};
pub use file::File;
pub use merge::{DiffyMerge, MergeEngine};
pub use syncer::FileSyncer;
