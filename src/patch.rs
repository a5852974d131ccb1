//! Types and parsing for unified-diff patches of delimited table files.
//!
//! The retrieval service hands over the `patch` field of a commit file, which is
//! the body of a unified diff. Every line starts with a one-character marker:
//!
//! - `+` - the row exists only in the new version
//! - `-` - the row exists only in the old version
//! - ` ` - the row is unchanged (context)
//!
//! The [`parse`] function turns that text into a flat list of [`PatchLine`]s in
//! patch order, which the [`crate::table`] module splits into columns.
//!
//! ## Example Patch
//!
//! ```text
//! @@ -1,3 +1,3 @@
//!  id,value
//!  1,apple
//! -2,banana
//! +2,banana-v2
//! ```
//!
//! Hunk headers, `\ No newline at end of file` markers and a leading
//! `diff --git` preamble describe the diff rather than the table, so they never
//! become data lines. Anything else without a recognized marker is kept as
//! context.

/// How a line of the patch relates the old and new versions of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Context,
    Added,
    Removed,
}

/// A single classified data line from the patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchLine {
    pub operation: Operation,

    /// The line content with its marker stripped.
    pub text: String,

    /// 0-indexed line number in the old file, when a hunk header gave one.
    pub old_line: Option<usize>,

    /// 0-indexed line number in the new file, when a hunk header gave one.
    pub new_line: Option<usize>,
}

/// The result of parsing a patch: data lines plus the number of hunks seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPatch {
    pub lines: Vec<PatchLine>,
    pub hunks: usize,
}

/// Start lines parsed out of a `@@ -a,b +c,d @@` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HunkHeader {
    old_start: usize,
    new_start: usize,
}

/// Lines that may precede the first hunk in `git diff` output.
const PREAMBLE_PREFIXES: &[&str] = &[
    "diff ",
    "index ",
    "--- ",
    "+++ ",
    "new file mode",
    "deleted file mode",
    "old mode",
    "new mode",
    "similarity index",
    "dissimilarity index",
    "rename from",
    "rename to",
    "copy from",
    "copy to",
    "Binary files",
];

/// Parses raw patch text into classified data lines.
///
/// Never fails: an empty patch gives an empty [`ParsedPatch`], and lines
/// without a recognized marker are kept as [`Operation::Context`].
pub fn parse(patch: &str) -> ParsedPatch {
    let mut parsed = ParsedPatch::default();
    let mut in_preamble = starts_with_preamble(patch);
    let mut old_next: Option<usize> = None;
    let mut new_next: Option<usize> = None;

    for line in patch.lines() {
        if line.starts_with("@@") {
            if let Some(header) = parse_hunk_header(line) {
                parsed.hunks += 1;
                in_preamble = false;
                old_next = Some(header.old_start.saturating_sub(1));
                new_next = Some(header.new_start.saturating_sub(1));
                continue;
            }
            log::debug!("malformed hunk header kept as context: {line:?}");
        }

        if in_preamble {
            if PREAMBLE_PREFIXES.iter().any(|p| line.starts_with(p)) {
                continue;
            }
            in_preamble = false;
        }

        if line.starts_with("\\ ") {
            continue;
        }

        let (operation, text) = classify(line);
        let old_line = match operation {
            Operation::Context | Operation::Removed => advance(&mut old_next),
            Operation::Added => None,
        };
        let new_line = match operation {
            Operation::Context | Operation::Added => advance(&mut new_next),
            Operation::Removed => None,
        };

        parsed.lines.push(PatchLine {
            operation,
            text: text.to_string(),
            old_line,
            new_line,
        });
    }

    parsed
}

/// Splits a line into its operation and the content after the marker.
fn classify(line: &str) -> (Operation, &str) {
    match line.as_bytes().first() {
        Some(b'+') => (Operation::Added, &line[1..]),
        Some(b'-') => (Operation::Removed, &line[1..]),
        Some(b' ') => (Operation::Context, &line[1..]),
        None => (Operation::Context, line),
        Some(_) => {
            log::debug!("line without diff marker kept as context: {line:?}");
            (Operation::Context, line)
        }
    }
}

/// Returns the current counter value and moves it one line forward.
#[inline]
fn advance(counter: &mut Option<usize>) -> Option<usize> {
    let current = *counter;
    if let Some(n) = counter.as_mut() {
        *n = n.saturating_add(1);
    }
    current
}

/// Whether the patch opens with a file preamble rather than data.
///
/// A bare `--- ` line only counts when `+++ ` follows it, so a removed data
/// row that happens to start with `--` is not mistaken for a file header.
fn starts_with_preamble(patch: &str) -> bool {
    let mut lines = patch.lines();
    match lines.next() {
        Some(first) if first.starts_with("diff ") => true,
        Some(first) if first.starts_with("--- ") => {
            lines.next().is_some_and(|second| second.starts_with("+++ "))
        }
        _ => false,
    }
}

/// Parses `@@ -a[,b] +c[,d] @@ [section]`.
fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let rest = line.strip_prefix("@@ ")?;
    let (ranges, _section) = rest.split_once(" @@")?;
    let (old, new) = ranges.split_once(' ')?;

    Some(HunkHeader {
        old_start: parse_range_start(old.strip_prefix('-')?)?,
        new_start: parse_range_start(new.strip_prefix('+')?)?,
    })
}

/// Parses `start[,count]`, returning the start line.
fn parse_range_start(range: &str) -> Option<usize> {
    match range.split_once(',') {
        Some((start, count)) => {
            count.parse::<usize>().ok()?;
            start.parse().ok()
        }
        None => range.parse().ok(),
    }
}
