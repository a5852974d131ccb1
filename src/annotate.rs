//! Pairing old and new rows and finding the cells that differ.
//!
//! Rows are aligned by patch order, not by any key column. Both sides contain
//! the same context rows in the same order, so [`annotate`] walks them in
//! lockstep and decides at each step from the two heads:
//!
//! | old head | new head           | result                                  |
//! |----------|--------------------|-----------------------------------------|
//! | context  | context            | context pair, compared cell by cell     |
//! | removed  | added              | modified pair, compared cell by cell    |
//! | removed  | context / none     | removed row, filler on the new side     |
//! | context / none | added        | added row, filler on the old side       |
//!
//! A run of removed lines followed by a run of added lines therefore pairs up
//! one to one, and whichever run is longer spills over into filler rows.
//!
//! Cells are compared by exact string equality. Whitespace and number
//! formatting differences count as changes.

use crate::patch::Operation;
use crate::table::SourceRow;
use smallvec::SmallVec;

/// Indices of the columns whose values differ. Most changed rows touch 0-2
/// columns; inline storage avoids heap allocation.
pub type ChangedColumns = SmallVec<[usize; 4]>;

/// How an aligned position came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairKind {
    /// Both sides carry the same context line.
    Context,
    /// A removed line paired with an added line.
    Modified,
    /// Only the old side has a row.
    Removed,
    /// Only the new side has a row.
    Added,
}

/// One aligned position: the row on each side, if any, and the columns that
/// differ between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPair {
    pub kind: PairKind,
    pub old: Option<SourceRow>,
    pub new: Option<SourceRow>,

    /// Differing columns for `Context` and `Modified` pairs. Empty for
    /// one-sided pairs, where the whole row counts as changed.
    pub changed_columns: ChangedColumns,
}

impl RowPair {
    /// Whether this position is highlighted on both sides.
    ///
    /// One-sided and modified positions always are; context positions only
    /// when a cell differs.
    #[inline]
    #[must_use]
    pub fn is_emphasized(&self) -> bool {
        match self.kind {
            PairKind::Context => !self.changed_columns.is_empty(),
            PairKind::Modified | PairKind::Removed | PairKind::Added => true,
        }
    }

    fn compared(kind: PairKind, old: SourceRow, new: SourceRow) -> Self {
        let changed_columns = changed_columns(&old.values, &new.values);
        Self {
            kind,
            old: Some(old),
            new: Some(new),
            changed_columns,
        }
    }

    fn old_only(old: SourceRow) -> Self {
        Self {
            kind: PairKind::Removed,
            old: Some(old),
            new: None,
            changed_columns: ChangedColumns::new(),
        }
    }

    fn new_only(new: SourceRow) -> Self {
        Self {
            kind: PairKind::Added,
            old: None,
            new: Some(new),
            changed_columns: ChangedColumns::new(),
        }
    }
}

/// Aligns old-side and new-side rows by patch order.
pub fn annotate(old_rows: Vec<SourceRow>, new_rows: Vec<SourceRow>) -> Vec<RowPair> {
    let mut pairs = Vec::with_capacity(old_rows.len().max(new_rows.len()));
    let mut old_iter = old_rows.into_iter().peekable();
    let mut new_iter = new_rows.into_iter().peekable();

    loop {
        let old_op = old_iter.peek().map(|r| r.operation);
        let new_op = new_iter.peek().map(|r| r.operation);

        let pair = match (old_op, new_op) {
            (None, None) => break,
            (Some(Operation::Removed), Some(Operation::Added)) => {
                let (Some(old), Some(new)) = (old_iter.next(), new_iter.next()) else {
                    break;
                };
                RowPair::compared(PairKind::Modified, old, new)
            }
            (Some(Operation::Removed), _) | (Some(_), None) => {
                let Some(old) = old_iter.next() else { break };
                RowPair::old_only(old)
            }
            (_, Some(Operation::Added)) | (None, Some(_)) => {
                let Some(new) = new_iter.next() else { break };
                RowPair::new_only(new)
            }
            (Some(_), Some(_)) => {
                let (Some(old), Some(new)) = (old_iter.next(), new_iter.next()) else {
                    break;
                };
                RowPair::compared(PairKind::Context, old, new)
            }
        };

        pairs.push(pair);
    }

    pairs
}

/// Returns the indices where `old` and `new` differ by exact string equality.
///
/// A column missing on one side counts as different.
pub fn changed_columns(old: &[String], new: &[String]) -> ChangedColumns {
    let width = old.len().max(new.len());
    (0..width)
        .filter(|&i| old.get(i) != new.get(i))
        .collect()
}
