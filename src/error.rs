//! Error types for the anydoc2md library.
//!
//! A workflow invocation can fail in exactly two places, and each has its own
//! type:
//!
//! * [`ConversionError`]: the conversion delegate could not produce text
//!   (missing file, unsupported or corrupt input, unreadable file). The
//!   delegate's own [`ExtractError`] is kept as the `source`.
//!
//! * [`WriteError`]: the Markdown could not be persisted next to the source
//!   (missing directory, permission denied, disk full).
//!
//! [`WorkflowError`] joins the two at the workflow boundary so front-ends can
//! render a single message while still matching on [`FailureKind`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by a [`crate::converter::DocumentConverter`].
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("No such file: '{}'", .path.display())]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{}'", .path.display())]
    PermissionDenied { path: PathBuf },

    /// The path points at a directory.
    #[error("'{}' is a directory, not a file", .path.display())]
    IsADirectory { path: PathBuf },

    /// The delegate has no strategy for this extension.
    #[error("Unsupported file format '.{extension}'{}", hint_suffix(.hint))]
    UnsupportedFormat {
        extension: String,
        hint: Option<&'static str>,
    },

    // ── Content errors ────────────────────────────────────────────────────
    /// The file claims a format (by extension) but its bytes disagree.
    #[error("'{}' is not a valid {format} file: {detail}", .path.display())]
    Malformed {
        path: PathBuf,
        format: &'static str,
        detail: String,
    },

    /// A text-based format was not valid UTF-8.
    #[error("'{}' is not valid UTF-8 text: {detail}", .path.display())]
    InvalidEncoding { path: PathBuf, detail: String },

    /// The pdfium shared library could not be loaded.
    #[error(
        "PDF engine unavailable: {0}\n\
Place libpdfium next to the executable, install it system-wide, or pass --pdfium-lib <PATH>."
    )]
    PdfEngineUnavailable(String),

    /// Reading the source failed for another I/O reason.
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reported verbatim by an external delegate.
    #[error("{0}")]
    Delegate(String),
}

fn hint_suffix(hint: &Option<&'static str>) -> String {
    hint.map(|h| format!(" ({h})")).unwrap_or_default()
}

/// The conversion delegate failed for `path`.
///
/// Displayed as `Conversion error: <cause>`; the prefix is stable so callers
/// can tell conversion failures from write failures in plain text output.
#[derive(Debug, Error)]
#[error("Conversion error: {cause}")]
pub struct ConversionError {
    pub path: PathBuf,
    #[source]
    pub cause: ExtractError,
}

impl ConversionError {
    pub fn new(path: impl Into<PathBuf>, cause: ExtractError) -> Self {
        Self {
            path: path.into(),
            cause,
        }
    }
}

/// The Markdown could not be written to `path`.
#[derive(Debug, Error)]
#[error("Error saving file '{}': {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Any terminal failure of a workflow invocation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl WorkflowError {
    /// Which step of the workflow failed.
    pub fn kind(&self) -> FailureKind {
        match self {
            WorkflowError::Conversion(_) => FailureKind::Conversion,
            WorkflowError::Write(_) => FailureKind::Write,
        }
    }
}

/// The error kind carried by the workflow's `Failed` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Conversion,
    Write,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Conversion => f.write_str("ConversionError"),
            FailureKind::Write => f.write_str("WriteError"),
        }
    }
}

/// Builder validation failed.
#[derive(Debug, Error)]
#[error("Invalid configuration: {0}")]
pub struct ConfigError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn conversion_error_has_stable_prefix() {
        let e = ConversionError::new(
            "data.tar",
            ExtractError::Delegate("tar archives are not documents".into()),
        );
        let msg = e.to_string();
        assert!(msg.starts_with("Conversion error: "), "got: {msg}");
        assert!(msg.contains("tar archives are not documents"));
    }

    #[test]
    fn write_error_display() {
        let e = WriteError {
            path: PathBuf::from("/ro/report.md"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("Error saving file"), "got: {msg}");
        assert!(msg.contains("/ro/report.md"));
        assert!(msg.contains("read-only"));
    }

    #[test]
    fn unsupported_format_display_with_hint() {
        let e = ExtractError::UnsupportedFormat {
            extension: "doc".into(),
            hint: Some("save it as .docx"),
        };
        assert_eq!(
            e.to_string(),
            "Unsupported file format '.doc' (save it as .docx)"
        );
    }

    #[test]
    fn unsupported_format_display_without_hint() {
        let e = ExtractError::UnsupportedFormat {
            extension: "tar".into(),
            hint: None,
        };
        assert_eq!(e.to_string(), "Unsupported file format '.tar'");
    }

    #[test]
    fn workflow_error_kind_and_transparent_display() {
        let inner = ConversionError::new(
            "x.pdf",
            ExtractError::FileNotFound {
                path: PathBuf::from("x.pdf"),
            },
        );
        let e = WorkflowError::from(inner);
        assert_eq!(e.kind(), FailureKind::Conversion);
        assert!(e.to_string().starts_with("Conversion error: No such file"));
        assert_eq!(FailureKind::Write.to_string(), "WriteError");
    }
}
