//! The conversion workflow: normalize → convert → derive → persist.
//!
//! ```text
//! Idle ─path─▶ PathReceived ─normalize─▶ Normalized ─convert─▶ Converted
//!                                             │                   │
//!                                             ▼                   ▼ derive
//!                                   Failed(Conversion)       OutputDerived
//!                                                                 │ persist
//!                                                    ┌────────────┴───────────┐
//!                                                    ▼                        ▼
//!                                                Persisted             Failed(Write)
//! ```
//!
//! Both front-ends drive exactly this sequence. Nothing is written unless
//! conversion succeeded, and a failed write leaves any existing output file
//! as it was.

use crate::config::ConversionConfig;
use crate::convert::{convert_with, resolve_converter};
use crate::converter::DocumentConverter;
use crate::error::{ConversionError, ExtractError, FailureKind, WorkflowError};
use crate::format::DocumentFormat;
use crate::output::ConversionOutcome;
use crate::paths::{derive_output_path, normalize_path};
use crate::progress::{NoopObserver, SharedObserver};
use crate::writer::write_markdown;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A non-empty path typed by the user, before quote stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    raw: String,
}

impl ConversionRequest {
    /// Wrap user input. The empty string means "no work requested" and
    /// yields `None`; a line ending left by `read_line` is dropped first.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let mut raw = raw.into();
        if raw.ends_with('\n') {
            raw.pop();
            if raw.ends_with('\r') {
                raw.pop();
            }
        }
        if raw.is_empty() {
            None
        } else {
            Some(Self { raw })
        }
    }

    /// The text exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The source path with one pair of surrounding quotes removed.
    pub fn source_path(&self) -> &str {
        normalize_path(&self.raw)
    }
}

/// Where a workflow run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    PathReceived,
    Normalized,
    Converted,
    OutputDerived,
    Persisted,
    Failed(FailureKind),
}

impl WorkflowState {
    /// `Persisted` and `Failed` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Persisted | WorkflowState::Failed(_))
    }
}

/// Runs conversion requests against one configuration.
///
/// Cheap to clone; clones share the delegate and observer.
#[derive(Clone)]
pub struct ConversionWorkflow {
    converter: Arc<dyn DocumentConverter>,
    observer: SharedObserver,
}

impl std::fmt::Debug for ConversionWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionWorkflow")
            .field("converter", &self.converter.name())
            .finish_non_exhaustive()
    }
}

impl ConversionWorkflow {
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            converter: resolve_converter(config),
            observer: config
                .observer
                .clone()
                .unwrap_or_else(|| Arc::new(NoopObserver)),
        }
    }

    /// Convert the requested file and write `<stem>.md` beside it.
    pub fn run(&self, request: &ConversionRequest) -> Result<ConversionOutcome, WorkflowError> {
        self.run_with_output(request, None)
    }

    /// Like [`run`](Self::run), but `output` replaces the derived path.
    pub fn run_with_output(
        &self,
        request: &ConversionRequest,
        output: Option<&Path>,
    ) -> Result<ConversionOutcome, WorkflowError> {
        let result = self.execute(request, output);
        match &result {
            Ok(outcome) => {
                info!(
                    "Converted {} → {}",
                    outcome.source_path.display(),
                    outcome.output_path.display()
                );
                self.observer.on_complete(outcome);
            }
            Err(e) => {
                warn!("{}", e);
                self.enter(WorkflowState::Failed(e.kind()));
                self.observer.on_failure(&e.to_string());
            }
        }
        result
    }

    fn execute(
        &self,
        request: &ConversionRequest,
        output: Option<&Path>,
    ) -> Result<ConversionOutcome, WorkflowError> {
        let start = Instant::now();
        self.enter(WorkflowState::PathReceived);

        let source = request.source_path();
        self.enter(WorkflowState::Normalized);

        let source_path = Path::new(source);
        self.observer
            .on_convert_start(source_path, self.converter.name());
        let markdown = convert_with(self.converter.as_ref(), source_path)?;
        self.enter(WorkflowState::Converted);

        let output_path = match output {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(derive_output_path(source)),
        };
        self.enter(WorkflowState::OutputDerived);

        let bytes_written = write_markdown(&markdown, &output_path)?;
        self.enter(WorkflowState::Persisted);

        Ok(ConversionOutcome {
            source_path: source_path.to_path_buf(),
            output_path,
            bytes_written,
            format: DocumentFormat::from_path(source_path),
            converter: self.converter.name().to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn enter(&self, state: WorkflowState) {
        self.observer.on_transition(&state);
    }

    /// Run on Tokio's blocking pool so an async front-end stays responsive.
    pub async fn run_async(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionOutcome, WorkflowError> {
        let workflow = self.clone();
        let source = request.source_path().to_string();
        tokio::task::spawn_blocking(move || workflow.run(&request))
            .await
            .map_err(|e| {
                WorkflowError::Conversion(ConversionError::new(
                    source,
                    ExtractError::Delegate(format!("Conversion task panicked: {}", e)),
                ))
            })?
    }
}
