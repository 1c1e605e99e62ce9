//! Line diffs between two text blobs, rendered as classified lines.
//!
//! Output follows the classic unified format:
//!
//! ```text
//! --- Previous Version
//! +++ Current Version
//! @@ -1,2 +1,2 @@
//!  line1
//! -line2
//! +line2X
//! ```
//!
//! File labels and hunk headers are classified as context; a renderer only
//! needs the leading marker of added and removed lines.

use similar::{Algorithm, DiffOp, DiffTag};
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use verso_util::TimingGuard;

/// Default number of unchanged lines kept around each change.
pub const DEFAULT_CONTEXT_LINES: usize = 3;
/// Default label of the older side.
pub const DEFAULT_FROM_LABEL: &str = "Previous Version";
/// Default label of the newer side.
pub const DEFAULT_TO_LABEL: &str = "Current Version";

/// How a line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

/// One line of diff output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    kind: LineKind,
    marker: &'static str,
    text: Cow<'a, str>,
}

impl<'a> ClassifiedLine<'a> {
    fn header(text: String) -> Self {
        Self {
            kind: LineKind::Context,
            marker: "",
            text: Cow::Owned(text),
        }
    }

    fn unchanged(line: &'a str) -> Self {
        Self {
            kind: LineKind::Context,
            marker: " ",
            text: Cow::Borrowed(line),
        }
    }

    fn added(line: &'a str) -> Self {
        Self {
            kind: LineKind::Added,
            marker: "+",
            text: Cow::Borrowed(line),
        }
    }

    fn removed(line: &'a str) -> Self {
        Self {
            kind: LineKind::Removed,
            marker: "-",
            text: Cow::Borrowed(line),
        }
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// The line without its diff marker.
    pub fn content(&self) -> &str {
        &self.text
    }

    /// File labels and `@@` hunk headers.
    pub fn is_header(&self) -> bool {
        self.marker.is_empty()
    }
}

impl fmt::Display for ClassifiedLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.marker, self.text)
    }
}

/// Computes line diffs with fixed labels and context size.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    context_lines: usize,
    from_label: String,
    to_label: String,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            from_label: DEFAULT_FROM_LABEL.to_string(),
            to_label: DEFAULT_TO_LABEL.to_string(),
        }
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn with_labels(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from_label = from.into();
        self.to_label = to.into();
        self
    }

    pub fn context_lines(&self) -> usize {
        self.context_lines
    }

    /// Diff `old` against `new`.
    ///
    /// Identical inputs produce an empty diff with no header lines.
    pub fn diff(&self, old: &str, new: &str) -> LineDiff {
        self.diff_labeled(old, new, &self.from_label, &self.to_label)
    }

    /// Diff with labels other than the configured ones.
    pub fn diff_labeled(&self, old: &str, new: &str, from: &str, to: &str) -> LineDiff {
        let _timing = TimingGuard::diff("lines");

        let old_lines = split_lines(old);
        let new_lines = split_lines(new);

        let ops = similar::capture_diff_slices(Algorithm::Myers, &old_lines[..], &new_lines[..]);
        let hunks = similar::group_diff_ops(ops, self.context_lines)
            .into_iter()
            .filter(|group| group.iter().any(|op| op.tag() != DiffTag::Equal))
            .map(Hunk::new)
            .collect();

        LineDiff {
            from_label: from.to_string(),
            to_label: to.to_string(),
            old: old_lines.into_iter().map(str::to_string).collect(),
            new: new_lines.into_iter().map(str::to_string).collect(),
            hunks,
        }
    }
}

#[derive(Debug, Clone)]
struct Hunk {
    header: String,
    ops: Vec<DiffOp>,
}

impl Hunk {
    fn new(ops: Vec<DiffOp>) -> Self {
        let old = span(&ops, DiffOp::old_range);
        let new = span(&ops, DiffOp::new_range);
        Self {
            header: format!(
                "@@ -{} +{} @@",
                format_range(old.start, old.end),
                format_range(new.start, new.end)
            ),
            ops,
        }
    }
}

fn span(ops: &[DiffOp], range: fn(&DiffOp) -> Range<usize>) -> Range<usize> {
    match (ops.first(), ops.last()) {
        (Some(first), Some(last)) => range(first).start..range(last).end,
        _ => 0..0,
    }
}

/// Unified range notation: 1-based start, length omitted when it is one,
/// and an empty range points at the line before it.
fn format_range(start: usize, end: usize) -> String {
    let length = end - start;
    let beginning = start + 1;
    match length {
        1 => beginning.to_string(),
        0 => format!("{},0", beginning - 1),
        _ => format!("{},{}", beginning, length),
    }
}

/// Split text into lines without their terminators.
///
/// Breaks on `\n`, `\r\n`, `\r` and the other Unicode line boundaries; a
/// trailing terminator does not start an extra empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let is_break = matches!(
            c,
            '\n' | '\r'
                | '\u{0b}'
                | '\u{0c}'
                | '\u{1c}'
                | '\u{1d}'
                | '\u{1e}'
                | '\u{85}'
                | '\u{2028}'
                | '\u{2029}'
        );
        if !is_break {
            continue;
        }
        lines.push(&text[start..i]);
        let mut next = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                next = j + 1;
            }
        }
        start = next;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// The result of one diff computation.
///
/// Owns both sides' lines; [`LineDiff::iter`] renders classified lines
/// lazily and can be called any number of times.
#[derive(Debug, Clone)]
pub struct LineDiff {
    from_label: String,
    to_label: String,
    old: Vec<String>,
    new: Vec<String>,
    hunks: Vec<Hunk>,
}

impl LineDiff {
    /// True when both sides have the same lines.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn hunk_count(&self) -> usize {
        self.hunks.len()
    }

    /// Count of (added, removed) lines.
    pub fn stats(&self) -> (usize, usize) {
        self.iter().fold((0, 0), |(added, removed), line| match line.kind() {
            LineKind::Added => (added + 1, removed),
            LineKind::Removed => (added, removed + 1),
            LineKind::Context => (added, removed),
        })
    }

    /// Classified lines in unified-diff order.
    pub fn iter(&self) -> impl Iterator<Item = ClassifiedLine<'_>> + '_ {
        let labels = if self.hunks.is_empty() {
            Vec::new()
        } else {
            vec![
                ClassifiedLine::header(format!("--- {}", self.from_label)),
                ClassifiedLine::header(format!("+++ {}", self.to_label)),
            ]
        };

        labels
            .into_iter()
            .chain(self.hunks.iter().flat_map(move |hunk| self.hunk_lines(hunk)))
    }

    fn hunk_lines<'s>(&'s self, hunk: &'s Hunk) -> impl Iterator<Item = ClassifiedLine<'s>> + 's {
        std::iter::once(ClassifiedLine::header(hunk.header.clone()))
            .chain(hunk.ops.iter().flat_map(move |op| self.op_lines(op)))
    }

    fn op_lines<'s>(&'s self, op: &DiffOp) -> impl Iterator<Item = ClassifiedLine<'s>> + 's {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let old = &self.old[old_range];
        let new = &self.new[new_range];

        let none: &[String] = &[];
        let (unchanged, removed, added) = match tag {
            DiffTag::Equal => (old, none, none),
            DiffTag::Delete => (none, old, none),
            DiffTag::Insert => (none, none, new),
            DiffTag::Replace => (none, old, new),
        };

        unchanged
            .iter()
            .map(|l| ClassifiedLine::unchanged(l))
            .chain(removed.iter().map(|l| ClassifiedLine::removed(l)))
            .chain(added.iter().map(|l| ClassifiedLine::added(l)))
    }

    /// Rendered lines, exactly as a unified diff prints them.
    pub fn to_lines(&self) -> Vec<String> {
        self.iter().map(|line| line.to_string()).collect()
    }
}

impl fmt::Display for LineDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.iter() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_change_matches_reference_output() {
        let diff = DiffEngine::new().diff("line1\nline2", "line1\nline2X");
        assert_eq!(
            diff.to_lines(),
            vec![
                "--- Previous Version",
                "+++ Current Version",
                "@@ -1,2 +1,2 @@",
                " line1",
                "-line2",
                "+line2X",
            ]
        );
    }

    #[test]
    fn single_line_change_is_classified() {
        let diff = DiffEngine::new().diff("line1\nline2", "line1\nline2X");
        let body: Vec<_> = diff
            .iter()
            .filter(|l| !l.is_header())
            .map(|l| (l.kind(), l.content().to_string()))
            .collect();
        assert_eq!(
            body,
            vec![
                (LineKind::Context, "line1".to_string()),
                (LineKind::Removed, "line2".to_string()),
                (LineKind::Added, "line2X".to_string()),
            ]
        );
        assert!(diff.iter().filter(|l| l.is_header()).all(|l| l.kind() == LineKind::Context));
    }

    #[test]
    fn stats_agree_with_classified_lines() {
        let diff = DiffEngine::new().diff("a\nb\nc\nd\n", "a\nB\nc\nd\ne\n");
        let count = |kind: LineKind| {
            diff.iter()
                .filter(|l| !l.is_header() && l.kind() == kind)
                .count()
        };
        assert_eq!(diff.stats(), (count(LineKind::Added), count(LineKind::Removed)));
        assert_eq!(diff.stats(), (2, 1));
    }

    #[test]
    fn identical_inputs_have_no_changes() {
        let text = "alpha\nbeta\ngamma\n";
        let diff = DiffEngine::new().diff(text, text);
        assert!(diff.is_empty());
        assert!(diff.iter().all(|l| l.kind() == LineKind::Context));
        assert_eq!(diff.stats(), (0, 0));
    }

    #[test]
    fn both_empty_is_empty() {
        assert!(DiffEngine::new().diff("", "").is_empty());
    }

    #[test]
    fn trailing_newline_is_not_a_change() {
        assert!(DiffEngine::new().diff("a\nb\n", "a\nb").is_empty());
        assert!(DiffEngine::new().diff("a\r\nb\r\n", "a\nb").is_empty());
    }

    #[test]
    fn insertion_into_empty_file() {
        let diff = DiffEngine::new().diff("", "one\ntwo\n");
        assert_eq!(
            diff.to_lines(),
            vec![
                "--- Previous Version",
                "+++ Current Version",
                "@@ -0,0 +1,2 @@",
                "+one",
                "+two",
            ]
        );
    }

    #[test]
    fn distant_changes_get_separate_hunks() {
        let old: Vec<String> = (1..=20).map(|i| format!("l{i}")).collect();
        let mut new = old.clone();
        new[1] = "changed2".to_string();
        new[18] = "changed19".to_string();

        let diff = DiffEngine::new().diff(&old.join("\n"), &new.join("\n"));
        assert_eq!(diff.hunk_count(), 2);

        let headers: Vec<_> = diff
            .iter()
            .filter(|l| l.content().starts_with("@@"))
            .map(|l| l.to_string())
            .collect();
        assert_eq!(headers, vec!["@@ -1,5 +1,5 @@", "@@ -16,5 +16,5 @@"]);
        assert_eq!(diff.stats(), (2, 2));
    }

    #[test]
    fn context_lines_are_configurable() {
        let old = "a\nb\nc\nd\ne\n";
        let new = "a\nb\nX\nd\ne\n";
        let diff = DiffEngine::new().with_context_lines(1).diff(old, new);
        assert_eq!(
            diff.to_lines()[2..],
            ["@@ -2,3 +2,3 @@", " b", "-c", "+X", " d"]
        );
    }

    #[test]
    fn custom_labels_are_used() {
        let diff = DiffEngine::new()
            .with_labels("20240101000000", "20240102000000")
            .diff("a", "b");
        let lines = diff.to_lines();
        assert_eq!(lines[0], "--- 20240101000000");
        assert_eq!(lines[1], "+++ 20240102000000");
    }

    #[test]
    fn iteration_is_restartable() {
        let diff = DiffEngine::new().diff("a\nb\n", "a\nc\n");
        let first: Vec<_> = diff.iter().map(|l| l.to_string()).collect();
        let second: Vec<_> = diff.iter().map(|l| l.to_string()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn display_renders_one_line_each() {
        let diff = DiffEngine::new().diff("a", "b");
        assert_eq!(
            diff.to_string(),
            "--- Previous Version\n+++ Current Version\n@@ -1 +1 @@\n-a\n+b\n"
        );
    }

    #[test]
    fn split_lines_handles_mixed_terminators() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert_eq!(split_lines(""), Vec::<&str>::new());
        assert_eq!(split_lines("\n"), vec![""]);
    }

    #[test]
    fn format_range_follows_unified_conventions() {
        assert_eq!(format_range(0, 1), "1");
        assert_eq!(format_range(0, 2), "1,2");
        assert_eq!(format_range(0, 0), "0,0");
        assert_eq!(format_range(4, 4), "4,0");
    }
}
