//! Configuration types for document-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One config backs every workflow run of
//! a front-end, so it is cheap to clone and safe to share across threads.

use crate::converter::DocumentConverter;
use crate::error::ConfigError;
use crate::progress::SharedObserver;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a conversion workflow.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use anydoc2md::{ConversionConfig, PageSeparator};
///
/// let config = ConversionConfig::builder()
///     .page_separator(PageSeparator::HorizontalRule)
///     .clean_output(false)
///     .build()
///     .unwrap();
/// assert!(!config.clean_output);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Page separator between PDF pages. Default: None.
    pub page_separator: PageSeparator,

    /// Normalise whitespace in the built-in converter's output. Default: true.
    ///
    /// Custom delegates are never post-processed; their text is written as
    /// returned.
    pub clean_output: bool,

    /// Explicit pdfium shared library. If None, the library is looked up next
    /// to the executable, in the working directory, then system-wide.
    pub pdfium_library_path: Option<PathBuf>,

    /// Pre-constructed conversion delegate. Takes precedence over the
    /// built-in converter.
    pub converter: Option<Arc<dyn DocumentConverter>>,

    /// Receives workflow state transitions.
    pub observer: Option<SharedObserver>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            page_separator: PageSeparator::default(),
            clean_output: true,
            pdfium_library_path: None,
            converter: None,
            observer: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("page_separator", &self.page_separator)
            .field("clean_output", &self.clean_output)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "converter",
                &self.converter.as_ref().map(|c| c.name().to_string()),
            )
            .field(
                "observer",
                &self.observer.as_ref().map(|_| "<dyn WorkflowObserver>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn clean_output(mut self, v: bool) -> Self {
        self.config.clean_output = v;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn converter(mut self, converter: Arc<dyn DocumentConverter>) -> Self {
        self.config.converter = Some(converter);
        self
    }

    pub fn observer(mut self, observer: SharedObserver) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConfigError> {
        let c = &self.config;
        if let Some(lib) = &c.pdfium_library_path {
            if !lib.is_file() {
                return Err(ConfigError(format!(
                    "pdfium library '{}' does not exist",
                    lib.display()
                )));
            }
        }
        if let PageSeparator::Custom(s) = &c.page_separator {
            if s.trim().is_empty() {
                return Err(ConfigError(
                    "custom page separator must not be blank".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How to separate pages in PDF output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// No separator; pages joined with "\n\n". (default)
    #[default]
    None,
    /// Horizontal rule: "\n\n---\n\n"
    HorizontalRule,
    /// HTML comment with page number: "<!-- page N -->"
    Comment,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator string for the given page number (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::None => "\n\n".to_string(),
            PageSeparator::HorizontalRule => "\n\n---\n\n".to_string(),
            PageSeparator::Comment => format!("\n\n<!-- page {} -->\n\n", page_num),
            PageSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }
}
