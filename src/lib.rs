//! # anydoc2md
//!
//! Convert office documents, PDFs, web pages and text files to Markdown,
//! writing `<name>.md` next to the source.
//!
//! ## Workflow Overview
//!
//! ```text
//! user path
//!  │
//!  ├─ 1. Normalize  strip one pair of surrounding quotes
//!  ├─ 2. Convert    DocumentConverter (built-in or custom delegate)
//!  ├─ 3. Derive     replace the last extension with `.md`
//!  └─ 4. Persist    temp file + atomic rename beside the source
//! ```
//!
//! Both front-ends (the interactive `anydoc2md` prompt and the
//! `anydoc2md-gui` window) drive the same [`ConversionWorkflow`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use anydoc2md::{ConversionConfig, ConversionRequest, ConversionWorkflow};
//!
//! let workflow = ConversionWorkflow::new(&ConversionConfig::default());
//! let request = ConversionRequest::new("\"quarterly report.docx\"").unwrap();
//! let outcome = workflow.run(&request)?;
//! println!("wrote {}", outcome.output_path.display());
//! # Ok::<(), anydoc2md::WorkflowError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `anydoc2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `gui`   | off     | Enables the `anydoc2md-gui` binary (eframe + open) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! anydoc2md = { version = "0.1", default-features = false }
//! ```
//!
//! ## Built-in formats
//!
//! | Format | Extensions |
//! |--------|------------|
//! | PDF (text layer, needs libpdfium) | `pdf` |
//! | Word | `docx` |
//! | PowerPoint | `pptx` |
//! | Excel | `xlsx` |
//! | HTML | `html`, `htm`, `xhtml` |
//! | Text passthrough | `txt`, `md`, `json`, `xml`, `csv`, none |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod converter;
pub mod desktop;
pub mod error;
pub mod format;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod workflow;
pub mod writer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSeparator};
pub use convert::{convert, convert_async};
pub use converter::{BuiltinConverter, DocumentConverter};
pub use error::{
    ConfigError, ConversionError, ExtractError, FailureKind, WorkflowError, WriteError,
};
pub use format::{DocumentFormat, SUPPORTED_EXTENSIONS};
pub use output::ConversionOutcome;
pub use paths::{derive_output_path, normalize_path};
pub use progress::{NoopObserver, SharedObserver, WorkflowObserver};
pub use workflow::{ConversionRequest, ConversionWorkflow, WorkflowState};
pub use writer::write_markdown;
