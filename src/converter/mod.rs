//! Conversion delegates: turn a source document into Markdown text.
//!
//! The workflow only ever sees the narrow [`DocumentConverter`] seam, so any
//! extractor (the bundled [`BuiltinConverter`], a wrapper around an external
//! service, or a closure in a test) can be plugged in through
//! [`crate::config::ConversionConfigBuilder::converter`].
//!
//! ## Built-in strategies
//!
//! | Format | Module |
//! |--------|--------|
//! | PDF (text layer via pdfium) | [`pdf`] |
//! | Word `.docx` | [`docx`] |
//! | PowerPoint `.pptx` | [`pptx`] |
//! | Excel `.xlsx` | [`xlsx`] |
//! | HTML | [`html`] |
//! | Plain text, JSON, XML, Markdown | [`text`] |

pub mod docx;
pub mod html;
mod ooxml;
pub mod pdf;
pub mod pptx;
mod table;
pub mod text;
pub mod xlsx;

use crate::config::{ConversionConfig, PageSeparator};
use crate::error::ExtractError;
use crate::format::DocumentFormat;
use crate::pipeline::{input, postprocess};
use std::path::{Path, PathBuf};
use tracing::debug;

pub use table::markdown_table;

/// A capability that extracts Markdown from a file on disk.
///
/// Implementations must not modify the source file and must be
/// `Send + Sync` so a single converter can back every workflow run, including
/// runs offloaded to a blocking thread pool.
///
/// Any `Fn(&Path) -> Result<String, ExtractError>` closure is a converter:
///
/// ```
/// use anydoc2md::{DocumentConverter, ExtractError};
/// use std::path::Path;
///
/// let shouting = |path: &Path| -> Result<String, ExtractError> {
///     let text = std::fs::read_to_string(path)
///         .map_err(|e| ExtractError::Delegate(e.to_string()))?;
///     Ok(text.to_uppercase())
/// };
/// assert_eq!(shouting.name(), "custom");
/// ```
pub trait DocumentConverter: Send + Sync {
    /// Extract the document at `source` as Markdown.
    fn convert(&self, source: &Path) -> Result<String, ExtractError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> DocumentConverter for F
where
    F: Fn(&Path) -> Result<String, ExtractError> + Send + Sync,
{
    fn convert(&self, source: &Path) -> Result<String, ExtractError> {
        self(source)
    }
}

/// The converter used when no custom delegate is configured.
///
/// Dispatches on the (case-insensitive) file extension, then runs the shared
/// cleanup pass unless `clean_output` is off.
#[derive(Debug, Clone, Default)]
pub struct BuiltinConverter {
    /// Separator placed between PDF pages.
    pub page_separator: PageSeparator,
    /// Run [`postprocess::clean_markdown`] on the extracted text.
    pub clean_output: bool,
    /// Explicit pdfium shared library to bind.
    pub pdfium_library_path: Option<PathBuf>,
}

impl BuiltinConverter {
    /// Build a converter from the relevant configuration fields.
    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            page_separator: config.page_separator.clone(),
            clean_output: config.clean_output,
            pdfium_library_path: config.pdfium_library_path.clone(),
        }
    }
}

impl DocumentConverter for BuiltinConverter {
    fn convert(&self, source: &Path) -> Result<String, ExtractError> {
        let src = input::resolve_source(source)?;
        let format = DocumentFormat::from_extension(src.extension());
        debug!("Extracting {} as {}", src.path().display(), format);

        let markdown = match format {
            DocumentFormat::Pdf => pdf::extract(
                &src,
                self.pdfium_library_path.as_deref(),
                &self.page_separator,
            )?,
            DocumentFormat::Docx => docx::extract(&src)?,
            DocumentFormat::Pptx => pptx::extract(&src)?,
            DocumentFormat::Xlsx => xlsx::extract(&src)?,
            DocumentFormat::Html => html::extract(&src)?,
            DocumentFormat::Text => text::extract(&src)?,
            DocumentFormat::LegacyOffice => {
                return Err(ExtractError::UnsupportedFormat {
                    extension: src.extension().to_string(),
                    hint: Some("legacy binary Office format; re-save it as .docx, .pptx or .xlsx"),
                })
            }
            DocumentFormat::Unknown => {
                return Err(ExtractError::UnsupportedFormat {
                    extension: src.extension().to_string(),
                    hint: None,
                })
            }
        };

        debug!("Extracted {} chars from {}", markdown.len(), src.path().display());

        Ok(if self.clean_output {
            postprocess::clean_markdown(&markdown)
        } else {
            markdown
        })
    }

    fn name(&self) -> &str {
        "builtin"
    }
}
