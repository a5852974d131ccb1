//! # datadrift-diff
//!
//! Turns the patch of a versioned table file into two aligned tables for a
//! side-by-side diff viewer.
//!
//! A data snapshot (a CSV or TSV file) is tracked in git. For a commit, or for
//! a range of commits between two dates, the retrieval service returns the
//! unified-diff `patch` of that file together with its column `headers`. This
//! crate rebuilds the old and new versions of the changed rows from that patch
//! and marks which rows, and which cells within them, differ.
//!
//! ## Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `patch` - Classifies patch lines as context, added or removed
//! - `table` - Splits lines into column values and reconciles them to the headers
//! - `annotate` - Aligns old and new rows by patch order and compares cells
//! - `projector` - Builds the two display tables
//! - `payload` - The retrieval service's JSON responses
//! - `config` / `error` - Options and the error type of the outer layers
//! - `lua` - Lua bindings (feature `lua`)
//! - `lib` (this module) - Entry points
//!
//! ## Usage
//!
//! ```
//! use datadrift_diff::{diff_patch, DiffOptions};
//!
//! let headers = vec!["id".to_string(), "value".to_string()];
//! let table = diff_patch(" 1,apple\n-2,banana\n+2,banana-v2", headers, false, &DiffOptions::default());
//!
//! assert_eq!(table.old.rows.len(), table.new.rows.len());
//! assert!(table.new.rows[1].cells[1].is_emphasized);
//! ```
//!
//! ## Environment Variables
//!
//! - `DATADRIFT_DIFF_DELIMITER` - Forces `comma` or `tab` splitting (see [`DiffOptions::from_env`])

use rayon::prelude::*;
use serde::Serialize;

pub mod annotate;
pub mod config;
pub mod error;
#[cfg(feature = "lua")]
mod lua;
pub mod patch;
pub mod payload;
pub mod projector;
pub mod table;

pub use config::{DelimiterChoice, DiffOptions};
pub use error::DiffError;
pub use payload::{CommitInfo, PatchPayload};
pub use projector::{Cell, DiffStats, DiffType, DualTable, Row, TableSide};
pub use table::Delimiter;

/// The dual table of one payload together with its commit metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitDiff {
    pub commit: CommitInfo,
    pub table: DualTable,
}

/// Builds the old and new tables from a patch and its column headers.
///
/// `headers` is authoritative: every row ends up with exactly one cell per
/// header, whatever the patch lines contain. `patch_too_large` is only carried
/// through to the result.
#[must_use]
pub fn diff_patch(
    patch: &str,
    headers: Vec<String>,
    patch_too_large: bool,
    options: &DiffOptions,
) -> DualTable {
    if patch_too_large {
        log::warn!("patch was truncated upstream; the diff only covers part of the change");
    }

    let parsed = patch::parse(patch);
    let width = headers.len();
    let delimiter = options
        .delimiter
        .resolve(width, parsed.lines.iter().map(|l| l.text.as_str()));
    log::debug!(
        "diffing {} patch lines across {} hunks, {width} columns, {delimiter:?}",
        parsed.lines.len(),
        parsed.hunks
    );

    let rows = table::reconstruct(parsed.lines, width, delimiter);
    let pairs = annotate::annotate(rows.old_rows, rows.new_rows);
    projector::project(headers, pairs, parsed.hunks, patch_too_large)
}

/// Like [`diff_patch`], with the headers still serialized as a table line.
///
/// The header line decides the delimiter unless the options force one.
#[must_use]
pub fn diff_patch_with_header_line(
    patch: &str,
    header_line: &str,
    patch_too_large: bool,
    options: &DiffOptions,
) -> DualTable {
    let header_line = header_line.trim_end_matches(['\r', '\n']);
    let delimiter = match options.delimiter {
        DelimiterChoice::Auto => Delimiter::infer(header_line),
        DelimiterChoice::Comma => Delimiter::Comma,
        DelimiterChoice::Tab => Delimiter::Tab,
    };
    let headers = if header_line.is_empty() {
        Vec::new()
    } else {
        table::split_fields(header_line, delimiter)
    };

    let options = DiffOptions {
        delimiter: delimiter.into(),
    };
    diff_patch(patch, headers, patch_too_large, &options)
}

/// Builds the dual table of a retrieval payload.
#[must_use]
pub fn diff_payload(payload: PatchPayload, options: &DiffOptions) -> CommitDiff {
    let table = diff_patch(
        &payload.patch,
        payload.headers,
        payload.patch_too_large,
        options,
    );
    CommitDiff {
        commit: payload.commit,
        table,
    }
}

/// Builds the dual tables of several payloads in parallel.
///
/// Results are in the same order as `payloads`.
#[must_use]
pub fn diff_payloads(payloads: Vec<PatchPayload>, options: &DiffOptions) -> Vec<CommitDiff> {
    payloads
        .into_par_iter()
        .map(|payload| diff_payload(payload, options))
        .collect()
}

/// Parses a retrieval response (see [`payload::parse`]) and diffs every payload in it.
pub fn diff_payload_json(json: &str, options: &DiffOptions) -> Result<Vec<CommitDiff>, DiffError> {
    let payloads = payload::parse(json)?;
    Ok(diff_payloads(payloads, options))
}
