//! Result types reported by a successful workflow run.

use crate::format::DocumentFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a successful run produced.
///
/// Serialised as one JSON object per conversion by `anydoc2md --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// Normalized source path, as given by the caller.
    pub source_path: PathBuf,
    /// Where the Markdown was written.
    pub output_path: PathBuf,
    /// Bytes of Markdown written.
    pub bytes_written: u64,
    /// Format detected from the source extension.
    pub format: DocumentFormat,
    /// Name of the delegate that produced the Markdown.
    pub converter: String,
    /// Wall-clock time of the whole run.
    pub duration_ms: u64,
}
