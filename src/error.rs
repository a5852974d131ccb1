//! Error type for the payload and options layers.
//!
//! Building the tables themselves never fails: malformed lines and column
//! count mismatches are recovered where they occur. Only decoding a retrieval
//! payload or reading options can go wrong.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiffError {
    /// A payload or options document was not valid JSON for its type.
    #[error("failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A delimiter option named neither `auto`, `comma` nor `tab`.
    #[error("unknown delimiter '{0}' (expected auto, comma or tab)")]
    UnknownDelimiter(String),
}
