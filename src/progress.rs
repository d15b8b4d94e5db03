//! Observer trait for workflow state transitions.
//!
//! Inject an [`Arc<dyn WorkflowObserver>`] via
//! [`crate::config::ConversionConfigBuilder::observer`] to receive an event
//! each time a workflow run moves to a new [`WorkflowState`]. The CLI drives
//! its spinner from these events; a GUI could forward them to a status bar.
//!
//! # Example
//!
//! ```rust
//! use anydoc2md::{ConversionConfig, WorkflowObserver, WorkflowState};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<WorkflowState>>);
//!
//! impl WorkflowObserver for Recorder {
//!     fn on_transition(&self, state: &WorkflowState) {
//!         self.0.lock().unwrap().push(*state);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .observer(Arc::new(Recorder::default()))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConversionOutcome;
use crate::workflow::WorkflowState;
use std::path::Path;
use std::sync::Arc;

/// Receives workflow events.
///
/// Implementations must be `Send + Sync`: runs may execute on Tokio's
/// blocking pool. All methods have no-op defaults so callers only override
/// what they care about.
pub trait WorkflowObserver: Send + Sync {
    /// Called on every state change, including the initial `PathReceived`.
    fn on_transition(&self, state: &WorkflowState) {
        let _ = state;
    }

    /// Called right before the conversion delegate is invoked.
    ///
    /// # Arguments
    /// * `source`    — normalized source path
    /// * `converter` — the delegate's [`crate::DocumentConverter::name`]
    fn on_convert_start(&self, source: &Path, converter: &str) {
        let _ = (source, converter);
    }

    /// Called once the Markdown is on disk.
    fn on_complete(&self, outcome: &ConversionOutcome) {
        let _ = outcome;
    }

    /// Called when the run ends in `Failed`.
    ///
    /// # Arguments
    /// * `error` — the user-facing message
    fn on_failure(&self, error: &str) {
        let _ = error;
    }
}

/// The observer used when none is configured.
pub struct NoopObserver;

impl WorkflowObserver for NoopObserver {}

/// Shared observer handle, as stored in [`crate::config::ConversionConfig`].
pub type SharedObserver = Arc<dyn WorkflowObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        transitions: AtomicUsize,
        failures: AtomicUsize,
    }

    impl WorkflowObserver for Counting {
        fn on_transition(&self, _state: &WorkflowState) {
            self.transitions.fetch_add(1, Ordering::SeqCst);
        }

        fn on_failure(&self, _error: &str) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let obs = NoopObserver;
        obs.on_transition(&WorkflowState::Idle);
        obs.on_convert_start(Path::new("a.docx"), "builtin");
        obs.on_failure("boom");
    }

    #[test]
    fn overridden_methods_receive_events() {
        let obs = Counting::default();
        obs.on_transition(&WorkflowState::PathReceived);
        obs.on_transition(&WorkflowState::Failed(FailureKind::Conversion));
        obs.on_failure("Conversion error: nope");
        obs.on_convert_start(Path::new("x"), "custom");

        assert_eq!(obs.transitions.load(Ordering::SeqCst), 2);
        assert_eq!(obs.failures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_observer_works() {
        let obs: SharedObserver = Arc::new(NoopObserver);
        obs.on_transition(&WorkflowState::Persisted);
    }
}
