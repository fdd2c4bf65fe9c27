//! Three-way merge engine.
//!
//! The differencing/merging capability is an injected seam: the syncer only
//! depends on [`MergeEngine`], and the default implementation delegates the
//! actual diff work to the `diffy` crate rather than reimplementing it.

use tracing::debug;

use super::patch::{ConflictBundle, DiffLine, Hunk, LineEntry, MergedPatch};

/// Merges two sides of a file over a common ancestor into a structured patch.
///
/// `mine` is the source-derived side, `theirs` the actual-derived side.
/// Structurally conflicting regions come back as conflict bundles; the
/// operation itself never fails.
pub trait MergeEngine: Send + Sync {
    fn merge(&self, base: &str, mine: &str, theirs: &str) -> MergedPatch;
}

/// Default engine built on `diffy::merge`.
#[derive(Debug, Default)]
pub struct DiffyMerge;

impl MergeEngine for DiffyMerge {
    fn merge(&self, base: &str, mine: &str, theirs: &str) -> MergedPatch {
        // Fast path: both sides made the exact same change.
        if mine == theirs {
            debug!("mine == theirs, identical changes");
            return context_patch(mine);
        }

        match diffy::merge(base, mine, theirs) {
            Ok(merged) => {
                debug!("clean three-way merge");
                context_patch(&merged)
            }
            Err(conflicted) => {
                debug!("merge produced conflicts");
                structure_conflicted(&conflicted)
            }
        }
    }
}

/// Wrap already-merged text as a single all-context hunk.
fn context_patch(text: &str) -> MergedPatch {
    let lines = text
        .lines()
        .map(|l| LineEntry::Line(DiffLine::context(l)))
        .collect();
    MergedPatch {
        hunks: vec![Hunk { lines }],
    }
}

/// Parse diffy's conflict-marker output back into the structured patch form.
///
/// Handles both the merge and diff3 conflict styles (a diff3 base section
/// between `|||||||` and `=======` is discarded; only the two sides'
/// competing lines are kept, tagged as added).
fn structure_conflicted(text: &str) -> MergedPatch {
    enum State {
        Context,
        Mine,
        Base,
        Theirs,
    }

    let mut lines: Vec<LineEntry> = Vec::new();
    let mut state = State::Context;
    let mut bundle = ConflictBundle::default();

    for line in text.lines() {
        match state {
            State::Context => {
                if line.starts_with("<<<<<<<") {
                    state = State::Mine;
                    bundle = ConflictBundle::default();
                } else {
                    lines.push(LineEntry::Line(DiffLine::context(line)));
                }
            }
            State::Mine => {
                if line.starts_with("|||||||") {
                    state = State::Base;
                } else if line.starts_with("=======") {
                    state = State::Theirs;
                } else {
                    bundle.mine.push(DiffLine::added(line));
                }
            }
            State::Base => {
                if line.starts_with("=======") {
                    state = State::Theirs;
                }
                // base-section lines are not part of either side
            }
            State::Theirs => {
                if line.starts_with(">>>>>>>") {
                    lines.push(LineEntry::Conflict(std::mem::take(&mut bundle)));
                    state = State::Context;
                } else {
                    bundle.theirs.push(DiffLine::added(line));
                }
            }
        }
    }

    MergedPatch {
        hunks: vec![Hunk { lines }],
    }
}
