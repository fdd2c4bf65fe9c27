//! Structured output of a three-way merge, prior to text rendering.

/// Diff tag carried by a single merged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    Added,
    Removed,
    Context,
}

/// One line of merge output together with its diff tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
}

impl DiffLine {
    pub fn added(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Added,
            text: text.into(),
        }
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Removed,
            text: text.into(),
        }
    }

    pub fn context(text: impl Into<String>) -> Self {
        Self {
            tag: DiffTag::Context,
            text: text.into(),
        }
    }
}

/// Two competing groups of added lines for one unresolved region.
///
/// "mine" is the source-derived side, "theirs" the actual-derived side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictBundle {
    pub mine: Vec<DiffLine>,
    pub theirs: Vec<DiffLine>,
}

/// A single entry in a hunk: either one diff-tagged line or a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEntry {
    Line(DiffLine),
    Conflict(ConflictBundle),
}

/// An ordered run of line entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunk {
    pub lines: Vec<LineEntry>,
}

/// Ordered hunks produced by merging two patches over a common base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedPatch {
    pub hunks: Vec<Hunk>,
}

impl MergedPatch {
    /// True if any hunk carries an unresolved conflict.
    pub fn has_conflicts(&self) -> bool {
        self.hunks
            .iter()
            .flat_map(|h| h.lines.iter())
            .any(|entry| matches!(entry, LineEntry::Conflict(_)))
    }
}
