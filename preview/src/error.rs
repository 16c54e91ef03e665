//! Preview error type.

use canvas::dialect::DialectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    /// A recorded span no longer slices to the text it was matched from.
    #[error("span {start}..{end} does not match the source text")]
    SpanMismatch { start: usize, end: usize },
    #[error("span {start}..{end} is outside the document ({len} bytes)")]
    SpanOutOfRange { start: usize, end: usize, len: usize },
    #[error("diagram could not be interpreted: {0}")]
    Diagram(#[from] DialectError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("browser storage unavailable")]
    StorageUnavailable,
    #[error("DOM operation failed: {0}")]
    Dom(String),
}
