//! Rendering of a [`MergedPatch`] into final file text.
//!
//! Conflicted regions are written with the literal marker lines below. The
//! same literals double as the input-side detection signal: a file that
//! contains both boundary markers is considered to carry an unresolved
//! conflict from a previous run. Detection is plain substring containment,
//! so legitimate content that happens to include these exact tokens will be
//! misdetected; no escaping is performed.

use super::patch::{DiffLine, DiffTag, LineEntry, MergedPatch};

/// Opens the source-derived side of a conflict block.
pub const CONFLICT_MARKER_BEGIN: &str = "<<<<<<< original";
/// Separates the two sides of a conflict block.
pub const CONFLICT_MARKER_SEP: &str = "=======";
/// Closes the actual-derived side of a conflict block.
pub const CONFLICT_MARKER_END: &str = ">>>>>>> yours";

/// Platform line terminator used for all rendered output.
#[cfg(windows)]
pub const LINE_SEP: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEP: &str = "\n";

/// Does `content` carry an unresolved conflict block?
pub fn is_conflicted(content: &str) -> bool {
    content.contains(CONFLICT_MARKER_BEGIN) && content.contains(CONFLICT_MARKER_END)
}

/// Render a merged patch to one text blob.
///
/// Per line entry, in hunk order: removed lines emit nothing; added and
/// context lines emit their text followed by the line terminator; a conflict
/// bundle emits the marker block with each side's added lines. Hunks are
/// concatenated joined by the line terminator.
pub fn render(patch: &MergedPatch) -> String {
    patch
        .hunks
        .iter()
        .map(render_hunk)
        .collect::<Vec<_>>()
        .join(LINE_SEP)
}

fn render_hunk(hunk: &super::patch::Hunk) -> String {
    let mut out = String::new();
    for entry in &hunk.lines {
        match entry {
            LineEntry::Line(DiffLine { tag, text }) => match tag {
                DiffTag::Removed => {}
                DiffTag::Added | DiffTag::Context => {
                    out.push_str(text);
                    out.push_str(LINE_SEP);
                }
            },
            LineEntry::Conflict(bundle) => {
                let block = [
                    CONFLICT_MARKER_BEGIN.to_string(),
                    join_added(&bundle.mine),
                    CONFLICT_MARKER_SEP.to_string(),
                    join_added(&bundle.theirs),
                    CONFLICT_MARKER_END.to_string(),
                ]
                .join(LINE_SEP);
                out.push_str(&block);
                out.push_str(LINE_SEP);
            }
        }
    }
    out
}

/// Join one side's added lines, dropping anything not tagged as added.
fn join_added(lines: &[DiffLine]) -> String {
    lines
        .iter()
        .filter(|l| l.tag == DiffTag::Added)
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join(LINE_SEP)
}

#[cfg(test)]
mod tests {
    use super::super::patch::{ConflictBundle, Hunk};
    use super::*;

    fn one_hunk(lines: Vec<LineEntry>) -> MergedPatch {
        MergedPatch {
            hunks: vec![Hunk { lines }],
        }
    }

    #[test]
    fn test_removed_lines_are_dropped() {
        let patch = one_hunk(vec![
            LineEntry::Line(DiffLine::context("keep")),
            LineEntry::Line(DiffLine::removed("gone")),
            LineEntry::Line(DiffLine::added("new")),
        ]);
        assert_eq!(render(&patch), format!("keep{LINE_SEP}new{LINE_SEP}"));
    }

    #[test]
    fn test_conflict_block_layout() {
        let patch = one_hunk(vec![LineEntry::Conflict(ConflictBundle {
            mine: vec![DiffLine::added("source-line")],
            theirs: vec![DiffLine::added("local-line")],
        })]);

        let expected = [
            "<<<<<<< original",
            "source-line",
            "=======",
            "local-line",
            ">>>>>>> yours",
            "",
        ]
        .join(LINE_SEP);
        assert_eq!(render(&patch), expected);
    }

    #[test]
    fn test_conflict_sides_keep_only_added_lines() {
        let patch = one_hunk(vec![LineEntry::Conflict(ConflictBundle {
            mine: vec![DiffLine::added("a"), DiffLine::removed("x"), DiffLine::added("b")],
            theirs: vec![DiffLine::context("y"), DiffLine::added("c")],
        })]);

        let rendered = render(&patch);
        assert!(rendered.contains(&format!("a{LINE_SEP}b")));
        assert!(!rendered.contains('x'));
        assert!(!rendered.contains('y'));
        assert!(rendered.contains(&format!("{CONFLICT_MARKER_SEP}{LINE_SEP}c")));
    }

    #[test]
    fn test_hunks_join_with_line_terminator() {
        let patch = MergedPatch {
            hunks: vec![
                Hunk {
                    lines: vec![LineEntry::Line(DiffLine::context("one"))],
                },
                Hunk {
                    lines: vec![LineEntry::Line(DiffLine::context("two"))],
                },
            ],
        };
        assert_eq!(
            render(&patch),
            format!("one{LINE_SEP}{LINE_SEP}two{LINE_SEP}")
        );
    }

    #[test]
    fn test_is_conflicted_needs_both_boundary_markers() {
        assert!(is_conflicted(
            "<<<<<<< original\na\n=======\nb\n>>>>>>> yours\n"
        ));
        assert!(!is_conflicted("<<<<<<< original\nonly the open side\n"));
        assert!(!is_conflicted("plain content"));
    }
}
