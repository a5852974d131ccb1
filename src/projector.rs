//! Projecting aligned row pairs into the two display tables.
//!
//! The viewer draws the old and new versions of the table next to each other,
//! so this module produces one [`TableSide`] per version with exactly the same
//! headers and the same number of rows. Row `i` on the old side and row `i` on
//! the new side always describe the same position in the patch.
//!
//! ## Wire Shape
//!
//! Sides serialize to the shape the table renderer consumes:
//!
//! ```json
//! {
//!   "diffType": "removed",
//!   "headers": ["id", "value"],
//!   "data": [
//!     {"isEmphasized": false, "data": [{"isEmphasized": false, "value": "1"}, {"isEmphasized": false, "value": "apple"}]},
//!     {"isEmphasized": true,  "data": [{"isEmphasized": false, "value": "2"}, {"isEmphasized": true,  "value": "banana"}]}
//!   ]
//! }
//! ```
//!
//! ## Emphasis Rules
//!
//! - Context rows: a cell is emphasized when its value differs, the row when
//!   any cell is
//! - Modified rows: same cell rule, and the row is always emphasized
//! - Removed/added rows: the row and every cell are emphasized
//! - Filler rows: empty, unemphasized cells in an emphasized row, so the
//!   highlight band lines up with the real row on the other side

use crate::annotate::{PairKind, RowPair};
use crate::table::SourceRow;
use serde::Serialize;

/// Which version of the table a side shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffType {
    /// The old version, before the change.
    Removed,
    /// The new version, after the change.
    Added,
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub is_emphasized: bool,
    pub value: String,
}

/// A single row of one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub is_emphasized: bool,

    /// One cell per header.
    #[serde(rename = "data")]
    pub cells: Vec<Cell>,

    /// Whether this is a placeholder row.
    ///
    /// Filler rows are inserted to keep both sides aligned when only the
    /// other side has a row at this position.
    #[serde(skip)]
    pub is_filler: bool,

    /// 0-indexed line number in the file, `None` for fillers or when the
    /// patch had no hunk headers.
    #[serde(skip)]
    pub line_number: Option<usize>,
}

impl Row {
    /// Creates a filler row of `width` empty cells.
    #[must_use]
    fn filler(width: usize) -> Self {
        Self {
            is_emphasized: true,
            cells: vec![
                Cell {
                    is_emphasized: false,
                    value: String::new(),
                };
                width
            ],
            is_filler: true,
            line_number: None,
        }
    }

    /// Creates a row with every cell emphasized.
    #[must_use]
    fn with_full_emphasis(source: SourceRow) -> Self {
        Self {
            is_emphasized: true,
            cells: source
                .values
                .into_iter()
                .map(|value| Cell {
                    is_emphasized: true,
                    value,
                })
                .collect(),
            is_filler: false,
            line_number: source.line_number,
        }
    }

    /// Creates a row emphasizing only the cells at `changed` indices.
    #[must_use]
    fn with_changed_cells(source: SourceRow, changed: &[usize], is_emphasized: bool) -> Self {
        Self {
            is_emphasized,
            cells: source
                .values
                .into_iter()
                .enumerate()
                .map(|(i, value)| Cell {
                    is_emphasized: changed.contains(&i),
                    value,
                })
                .collect(),
            is_filler: false,
            line_number: source.line_number,
        }
    }
}

/// One side of the dual table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSide {
    pub diff_type: DiffType,
    pub headers: Vec<String>,
    #[serde(rename = "data")]
    pub rows: Vec<Row>,
}

/// Row counts for the viewer's summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    /// Rows present only in the new version.
    pub added: usize,
    /// Rows present only in the old version.
    pub removed: usize,
    /// Removed rows paired with an added row.
    pub modified: usize,
    pub unchanged: usize,
    /// Hunk headers seen in the patch.
    pub hunks: usize,
}

/// The old and new tables, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DualTable {
    pub old: TableSide,
    pub new: TableSide,

    /// Passed through from the retrieval layer: the patch was cut short, so
    /// the tables only show part of the change.
    pub patch_too_large: bool,

    /// Row indices (0-indexed) where runs of changed rows start.
    ///
    /// Used for navigation commands like "jump to next change".
    pub hunk_starts: Vec<usize>,

    pub stats: DiffStats,
}

impl DualTable {
    /// Number of aligned rows, the same on both sides.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.old.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.old.rows.is_empty()
    }
}

/// Builds both sides from aligned pairs.
///
/// Each pair contributes exactly one row to each side.
#[must_use]
pub fn project(
    headers: Vec<String>,
    pairs: Vec<RowPair>,
    hunks: usize,
    patch_too_large: bool,
) -> DualTable {
    let width = headers.len();
    let mut old_rows = Vec::with_capacity(pairs.len());
    let mut new_rows = Vec::with_capacity(pairs.len());
    let mut hunk_starts = Vec::new();
    let mut stats = DiffStats {
        hunks,
        ..DiffStats::default()
    };
    let mut in_hunk = false;

    for (row_idx, pair) in pairs.into_iter().enumerate() {
        let is_changed = pair.is_emphasized();
        if is_changed && !in_hunk {
            hunk_starts.push(row_idx);
            in_hunk = true;
        } else if !is_changed {
            in_hunk = false;
        }

        match pair.kind {
            PairKind::Context => stats.unchanged += 1,
            PairKind::Modified => stats.modified += 1,
            PairKind::Removed => stats.removed += 1,
            PairKind::Added => stats.added += 1,
        }

        let (old_row, new_row) = project_pair(pair, width, is_changed);
        old_rows.push(old_row);
        new_rows.push(new_row);
    }

    DualTable {
        old: TableSide {
            diff_type: DiffType::Removed,
            headers: headers.clone(),
            rows: old_rows,
        },
        new: TableSide {
            diff_type: DiffType::Added,
            headers,
            rows: new_rows,
        },
        patch_too_large,
        hunk_starts,
        stats,
    }
}

/// Turns one pair into its old-side and new-side rows.
fn project_pair(pair: RowPair, width: usize, is_emphasized: bool) -> (Row, Row) {
    let changed = pair.changed_columns.as_slice();
    let side = |source: Option<SourceRow>, full: bool| match source {
        Some(source) if full => Row::with_full_emphasis(source),
        Some(source) => Row::with_changed_cells(source, changed, is_emphasized),
        None => Row::filler(width),
    };

    match pair.kind {
        PairKind::Context | PairKind::Modified => {
            (side(pair.old, false), side(pair.new, false))
        }
        PairKind::Removed | PairKind::Added => (side(pair.old, true), side(pair.new, true)),
    }
}
