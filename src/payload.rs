//! Types and parsing for the retrieval service's JSON responses.
//!
//! The service answers two kinds of request with the same core triple
//! (`patch`, `headers`, `patchToLarge`) plus some metadata:
//!
//! - **commit diff**: `{patch, headers, patchToLarge, commitLink, date, filename}`
//! - **date range comparison**: `{patch, headers, patchToLarge, filename,
//!   baseCommitDateISO8601, headCommitDateISO8601}`
//!
//! Both deserialize into [`PatchPayload`]. Metadata is not used to build the
//! tables; it travels along in [`CommitInfo`] so the viewer can show it.
//!
//! The service spells the truncation flag `patchToLarge`. `patchTooLarge` is
//! accepted too.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Commit metadata passed through to the viewer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommitInfo {
    /// Path of the table file within the repository.
    pub filename: Option<String>,

    /// Link to the commit on the hosting service.
    pub commit_link: Option<String>,

    /// Commit date, for single commit diffs.
    pub date: Option<DateTime<Utc>>,

    /// First commit of a date range comparison.
    #[serde(rename = "baseCommitDateISO8601")]
    pub base_commit_date: Option<DateTime<Utc>>,

    /// Last commit of a date range comparison.
    #[serde(rename = "headCommitDateISO8601")]
    pub head_commit_date: Option<DateTime<Utc>>,
}

/// A patch of one table file, as returned by the retrieval service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchPayload {
    /// Unified diff body of the table file.
    #[serde(default)]
    pub patch: String,

    /// Column names. Authoritative even when the patch rows disagree.
    #[serde(default)]
    pub headers: Vec<String>,

    /// The service cut the patch short.
    #[serde(default, rename = "patchToLarge", alias = "patchTooLarge")]
    pub patch_too_large: bool,

    #[serde(flatten)]
    pub commit: CommitInfo,
}

/// Parses one or more payloads.
///
/// Handles three layouts:
/// - a JSON array `[{...}, {...}]`
/// - a single JSON object
/// - newline-separated JSON objects
///
/// When nothing fits, the error comes from the single-object attempt, unless
/// the input got past its first line as newline-separated JSON.
pub fn parse(json: &str) -> Result<Vec<PatchPayload>, serde_json::Error> {
    if let Ok(payloads) = serde_json::from_str::<Vec<PatchPayload>>(json) {
        return Ok(payloads);
    }

    let object_err = match serde_json::from_str::<PatchPayload>(json) {
        Ok(payload) => return Ok(vec![payload]),
        Err(err) => err,
    };

    let mut payloads = Vec::new();
    for (idx, line) in json
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
    {
        match serde_json::from_str(line) {
            Ok(payload) => payloads.push(payload),
            Err(_) if idx == 0 => return Err(object_err),
            Err(err) => return Err(err),
        }
    }
    Ok(payloads)
}
