//! Three-way merge: structured patch model, engine seam, and text rendering.

pub mod engine;
pub mod patch;
pub mod render;

pub use engine::{DiffyMerge, MergeEngine};
pub use patch::{ConflictBundle, DiffLine, DiffTag, Hunk, LineEntry, MergedPatch};
pub use render::{is_conflicted, render, CONFLICT_MARKER_BEGIN, CONFLICT_MARKER_END,
    CONFLICT_MARKER_SEP, LINE_SEP};
