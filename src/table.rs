//! Rebuilding table rows from classified patch lines.
//!
//! Each [`PatchLine`] holds one serialized table row. This module splits it
//! into column values and sorts it into the old-side and new-side sequences:
//!
//! - old side: context and removed lines, in patch order
//! - new side: context and added lines, in patch order
//!
//! Every row is reconciled to the header width. Short rows are padded on the
//! right with empty values. Long rows lose their trailing values. Earlier
//! columns never move, so any misalignment stays at the tail of the row.

use crate::patch::{Operation, PatchLine};

/// How many data lines [`Delimiter::detect`] looks at.
const DETECT_SAMPLE: usize = 64;

/// Field separator of the serialized table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    #[inline]
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }

    /// Infers the delimiter from a serialized header line.
    #[must_use]
    pub fn infer(header_line: &str) -> Self {
        if header_line.contains('\t') {
            Self::Tab
        } else {
            Self::Comma
        }
    }

    /// Guesses the delimiter from sampled data lines.
    ///
    /// A tab outside quotes is strong evidence: TSV values often hold commas,
    /// CSV values rarely hold bare tabs. Once any sampled line splits on tabs,
    /// Tab wins unless comma splitting lands strictly closer to `width` over
    /// the whole sample. Without tabs the answer is [`Delimiter::Comma`].
    pub fn detect<'a>(width: usize, lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tab_split = false;
        let mut comma_distance = 0usize;
        let mut tab_distance = 0usize;

        for line in lines
            .into_iter()
            .filter(|l| !l.is_empty())
            .take(DETECT_SAMPLE)
        {
            let tab_fields = split_fields(line, Self::Tab).len();
            tab_split |= tab_fields > 1;
            tab_distance = tab_distance.saturating_add(tab_fields.abs_diff(width));

            let comma_fields = split_fields(line, Self::Comma).len();
            comma_distance = comma_distance.saturating_add(comma_fields.abs_diff(width));
        }

        if tab_split && tab_distance <= comma_distance {
            Self::Tab
        } else {
            Self::Comma
        }
    }
}

/// A table row on one side, before cell annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// `Context`, or `Removed`/`Added` for the side it belongs to.
    pub operation: Operation,

    /// Column values, always exactly as many as there are headers.
    pub values: Vec<String>,

    /// 0-indexed line number in the file this side represents.
    pub line_number: Option<usize>,
}

/// Old-side and new-side rows rebuilt from a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconstructed {
    pub old_rows: Vec<SourceRow>,
    pub new_rows: Vec<SourceRow>,

    /// Lines that had fewer values than headers.
    pub padded: usize,

    /// Lines that had more values than headers.
    pub truncated: usize,
}

/// Outcome of fitting a row's values to the header width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Exact,
    /// This many empty values were appended.
    Padded(usize),
    /// This many trailing values were dropped.
    Truncated(usize),
}

/// Splits patch lines into column values and sorts them into both sides.
pub fn reconstruct(lines: Vec<PatchLine>, width: usize, delimiter: Delimiter) -> Reconstructed {
    let context_lines = lines
        .iter()
        .filter(|l| l.operation == Operation::Context)
        .count();
    let mut result = Reconstructed {
        old_rows: Vec::with_capacity(lines.len()),
        new_rows: Vec::with_capacity(context_lines + lines.len() / 2),
        ..Reconstructed::default()
    };

    for line in lines {
        let (values, fit) = reconcile(split_fields(&line.text, delimiter), width);
        match fit {
            Fit::Exact => {}
            Fit::Padded(_) => result.padded += 1,
            Fit::Truncated(_) => result.truncated += 1,
        }

        match line.operation {
            Operation::Context => {
                result.old_rows.push(SourceRow {
                    operation: Operation::Context,
                    values: values.clone(),
                    line_number: line.old_line,
                });
                result.new_rows.push(SourceRow {
                    operation: Operation::Context,
                    values,
                    line_number: line.new_line,
                });
            }
            Operation::Removed => result.old_rows.push(SourceRow {
                operation: Operation::Removed,
                values,
                line_number: line.old_line,
            }),
            Operation::Added => result.new_rows.push(SourceRow {
                operation: Operation::Added,
                values,
                line_number: line.new_line,
            }),
        }
    }

    if result.padded > 0 || result.truncated > 0 {
        log::debug!(
            "column count mismatch against {width} headers: {} rows padded, {} rows truncated",
            result.padded,
            result.truncated
        );
    }

    result
}

/// Splits one serialized row into field values.
///
/// Double-quoted fields may contain the delimiter, and `""` inside quotes is
/// a literal quote. An unterminated quote runs to the end of the line.
/// Unquoted values are kept verbatim, surrounding whitespace included.
pub fn split_fields(line: &str, delimiter: Delimiter) -> Vec<String> {
    let sep = delimiter.as_char();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    let mut at_field_start = true;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == sep {
            fields.push(std::mem::take(&mut field));
            at_field_start = true;
            continue;
        } else if c == '"' && at_field_start {
            in_quotes = true;
        } else {
            field.push(c);
        }
        at_field_start = false;
    }

    fields.push(field);
    fields
}

/// Fits `values` to `width`: pads right with empty strings or drops the tail.
pub fn reconcile(mut values: Vec<String>, width: usize) -> (Vec<String>, Fit) {
    let len = values.len();
    if len < width {
        values.resize(width, String::new());
        (values, Fit::Padded(width - len))
    } else if len > width {
        values.truncate(width);
        (values, Fit::Truncated(len - width))
    } else {
        (values, Fit::Exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(operation: Operation, text: &str) -> PatchLine {
        PatchLine {
            operation,
            text: text.to_string(),
            old_line: None,
            new_line: None,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_plain_comma_row() {
        assert_eq!(
            split_fields("1,apple,red", Delimiter::Comma),
            strings(&["1", "apple", "red"])
        );
    }

    #[test]
    fn split_tab_row_keeps_commas() {
        assert_eq!(
            split_fields("1\tapple, green\tred", Delimiter::Tab),
            strings(&["1", "apple, green", "red"])
        );
    }

    #[test]
    fn split_quoted_field_with_delimiter() {
        assert_eq!(
            split_fields(r#"1,"Paris, France",3"#, Delimiter::Comma),
            strings(&["1", "Paris, France", "3"])
        );
    }

    #[test]
    fn split_escaped_quote() {
        assert_eq!(
            split_fields(r#""say ""hi""",x"#, Delimiter::Comma),
            strings(&[r#"say "hi""#, "x"])
        );
    }

    #[test]
    fn split_unterminated_quote_takes_rest() {
        assert_eq!(
            split_fields(r#"1,"open,still open"#, Delimiter::Comma),
            strings(&["1", "open,still open"])
        );
    }

    #[test]
    fn split_quote_inside_unquoted_field_is_literal() {
        assert_eq!(
            split_fields(r#"5" screen,x"#, Delimiter::Comma),
            strings(&[r#"5" screen"#, "x"])
        );
    }

    #[test]
    fn split_keeps_whitespace_and_empty_fields() {
        assert_eq!(
            split_fields(" a ,,b ", Delimiter::Comma),
            strings(&[" a ", "", "b "])
        );
    }

    #[test]
    fn split_empty_line_is_one_empty_field() {
        assert_eq!(split_fields("", Delimiter::Comma), strings(&[""]));
    }

    #[test]
    fn reconcile_pads_short_rows() {
        let (values, fit) = reconcile(strings(&["1", "apple"]), 3);
        assert_eq!(values, strings(&["1", "apple", ""]));
        assert_eq!(fit, Fit::Padded(1));
    }

    #[test]
    fn reconcile_truncates_long_rows() {
        let (values, fit) = reconcile(strings(&["1", "apple", "red", "extra"]), 2);
        assert_eq!(values, strings(&["1", "apple"]));
        assert_eq!(fit, Fit::Truncated(2));
    }

    #[test]
    fn reconcile_exact() {
        let (values, fit) = reconcile(strings(&["a", "b"]), 2);
        assert_eq!(values.len(), 2);
        assert_eq!(fit, Fit::Exact);
    }

    #[test]
    fn infer_from_header_line() {
        assert_eq!(Delimiter::infer("id\tvalue"), Delimiter::Tab);
        assert_eq!(Delimiter::infer("id,value"), Delimiter::Comma);
        assert_eq!(Delimiter::infer("id"), Delimiter::Comma);
    }

    #[test]
    fn detect_prefers_matching_width() {
        let lines = ["1\tapple, red\tx", "2\tpear\ty"];
        assert_eq!(Delimiter::detect(3, lines), Delimiter::Tab);

        let lines = ["1,apple,x", "2,pear,y"];
        assert_eq!(Delimiter::detect(3, lines), Delimiter::Comma);
    }

    #[test]
    fn detect_tab_rows_shorter_than_headers() {
        let lines = ["1\tapple", "2\tpear", "2\tpeach"];
        assert_eq!(Delimiter::detect(3, lines), Delimiter::Tab);
    }

    #[test]
    fn detect_tab_rows_with_commas_in_values() {
        let lines = ["1\tDoe, John", "2\tRoe, Jane", "2\tRoe, Janet"];
        assert_eq!(Delimiter::detect(2, lines), Delimiter::Tab);
    }

    #[test]
    fn detect_stray_tab_in_csv_value_keeps_comma() {
        let lines = ["1,\"a\tb\",x", "2,c,y"];
        assert_eq!(Delimiter::detect(3, lines), Delimiter::Comma);
    }

    #[test]
    fn detect_ties_fall_back_to_comma() {
        assert_eq!(Delimiter::detect(1, ["abc"]), Delimiter::Comma);
        assert_eq!(Delimiter::detect(4, std::iter::empty()), Delimiter::Comma);
    }

    #[test]
    fn reconstruct_splits_sides() {
        let lines = vec![
            line(Operation::Context, "1,apple"),
            line(Operation::Removed, "2,banana"),
            line(Operation::Added, "2,banana-v2"),
        ];
        let rows = reconstruct(lines, 2, Delimiter::Comma);

        assert_eq!(rows.old_rows.len(), 2);
        assert_eq!(rows.new_rows.len(), 2);
        assert_eq!(rows.old_rows[0].operation, Operation::Context);
        assert_eq!(rows.old_rows[1].operation, Operation::Removed);
        assert_eq!(rows.old_rows[1].values, strings(&["2", "banana"]));
        assert_eq!(rows.new_rows[1].operation, Operation::Added);
        assert_eq!(rows.new_rows[1].values, strings(&["2", "banana-v2"]));
    }

    #[test]
    fn reconstruct_counts_mismatches() {
        let lines = vec![
            line(Operation::Context, "1,apple"),
            line(Operation::Added, "2,pear,green,extra"),
            line(Operation::Added, ""),
        ];
        let rows = reconstruct(lines, 3, Delimiter::Comma);

        assert_eq!(rows.padded, 2);
        assert_eq!(rows.truncated, 1);
        assert_eq!(rows.new_rows[2].values, strings(&["", "", ""]));
        assert!(rows.old_rows.iter().all(|r| r.values.len() == 3));
        assert!(rows.new_rows.iter().all(|r| r.values.len() == 3));
    }

    #[test]
    fn reconstruct_uses_side_line_numbers() {
        let lines = vec![PatchLine {
            operation: Operation::Context,
            text: "a".into(),
            old_line: Some(4),
            new_line: Some(6),
        }];
        let rows = reconstruct(lines, 1, Delimiter::Comma);
        assert_eq!(rows.old_rows[0].line_number, Some(4));
        assert_eq!(rows.new_rows[0].line_number, Some(6));
    }
}
