//! Document formats recognised by the built-in converter.
//!
//! Detection is by file extension only. [`SUPPORTED_EXTENSIONS`] is the
//! advisory allow-list shown in file pickers; it is never used to reject a
//! conversion; that decision belongs to the converter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Extensions offered by file pickers, in display order.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "html", "htm", "txt", "json", "xml",
];

/// Detected source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Pptx,
    Xlsx,
    Html,
    /// Plain text passed through unchanged (txt, md, json, xml, csv, no extension).
    Text,
    /// Pre-2007 binary Office formats (doc, ppt, xls).
    LegacyOffice,
    /// Anything else.
    Unknown,
}

impl DocumentFormat {
    /// Detect the format from a lower- or mixed-case extension (without dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            "pptx" => DocumentFormat::Pptx,
            "xlsx" => DocumentFormat::Xlsx,
            "html" | "htm" | "xhtml" => DocumentFormat::Html,
            "" | "txt" | "text" | "md" | "markdown" | "json" | "xml" | "csv" | "log" => {
                DocumentFormat::Text
            }
            "doc" | "ppt" | "xls" => DocumentFormat::LegacyOffice,
            _ => DocumentFormat::Unknown,
        }
    }

    /// Detect the format of a path.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&ext)
    }

    /// Human-readable name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "Word",
            DocumentFormat::Pptx => "PowerPoint",
            DocumentFormat::Xlsx => "Excel",
            DocumentFormat::Html => "HTML",
            DocumentFormat::Text => "text",
            DocumentFormat::LegacyOffice => "legacy Office",
            DocumentFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether `path` has an extension on the advisory allow-list.
pub fn is_listed(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Filter label for file dialogs, e.g. `Supported Files (*.pdf *.doc ...)`.
pub fn dialog_filter_label() -> String {
    let globs: Vec<String> = SUPPORTED_EXTENSIONS
        .iter()
        .map(|e| format!("*.{e}"))
        .collect();
    format!("Supported Files ({})", globs.join(" "))
}
