//! Toolkit-independent state for the desktop front-end.
//!
//! The `anydoc2md-gui` binary renders this state with egui; keeping it here
//! means selection, enablement and dialog rules are unit-tested without a
//! window.

use crate::error::WorkflowError;
use crate::format::is_listed;
use crate::output::ConversionOutcome;
use crate::workflow::ConversionRequest;
use std::path::{Path, PathBuf};
use tracing::debug;

// ── File browser ─────────────────────────────────────────────────────────

/// A single entry in the file browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// In-window file browser filtered to the advisory allow-list.
#[derive(Debug, Clone)]
pub struct FilePicker {
    /// Current directory being browsed.
    pub current_dir: PathBuf,
    /// Entries in the current directory (`..` first, then dirs, then files).
    pub entries: Vec<FileEntry>,
    /// List every file, not only supported ones.
    pub show_all: bool,
}

impl FilePicker {
    pub fn new(start: impl Into<PathBuf>) -> Self {
        let mut picker = Self {
            current_dir: start.into(),
            entries: Vec::new(),
            show_all: false,
        };
        picker.refresh_entries();
        picker
    }

    /// Start in the working directory.
    pub fn in_current_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Refresh the entries list from the current directory.
    pub fn refresh_entries(&mut self) {
        let mut entries = Vec::new();

        if let Some(parent) = self.current_dir.parent() {
            entries.push(FileEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
            });
        }

        if let Ok(read_dir) = std::fs::read_dir(&self.current_dir) {
            let mut dirs = Vec::new();
            let mut files = Vec::new();

            for entry in read_dir.flatten() {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().to_string();

                // Skip hidden files/dirs
                if name.starts_with('.') {
                    continue;
                }

                if path.is_dir() {
                    dirs.push(FileEntry {
                        name,
                        path,
                        is_dir: true,
                    });
                } else if self.show_all || is_listed(&path) {
                    files.push(FileEntry {
                        name,
                        path,
                        is_dir: false,
                    });
                }
            }

            dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

            entries.extend(dirs);
            entries.extend(files);
        }

        self.entries = entries;
    }

    /// Activate an entry: directories are entered, files are returned.
    pub fn activate(&mut self, entry: &FileEntry) -> Option<PathBuf> {
        if entry.is_dir {
            self.current_dir = entry.path.clone();
            self.refresh_entries();
            None
        } else {
            Some(entry.path.clone())
        }
    }

    pub fn set_show_all(&mut self, show_all: bool) {
        if self.show_all != show_all {
            self.show_all = show_all;
            self.refresh_entries();
        }
    }
}

// ── Window state ─────────────────────────────────────────────────────────

/// A modal dialog waiting to be dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Success { output_path: PathBuf },
    Error { message: String },
}

impl Dialog {
    pub fn title(&self) -> &'static str {
        match self {
            Dialog::Success { .. } => "Conversion Successful",
            Dialog::Error { .. } => "Error",
        }
    }

    pub fn text(&self) -> String {
        match self {
            Dialog::Success { output_path } => {
                format!("Successfully converted to:\n{}", output_path.display())
            }
            Dialog::Error { message } => format!("Error converting file:\n{message}"),
        }
    }
}

/// Everything the main window needs to render itself.
#[derive(Debug, Default)]
pub struct DesktopState {
    selected: Option<PathBuf>,
    busy: bool,
    dialog: Option<Dialog>,
}

impl DesktopState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    /// Select a file from the browser. Ignored while a conversion runs.
    pub fn select(&mut self, path: impl Into<PathBuf>) {
        if self.busy {
            return;
        }
        let path = path.into();
        debug!("Selected {}", path.display());
        self.selected = Some(path);
    }

    /// Select the first dropped path; only one file is converted at a time.
    pub fn select_dropped(&mut self, paths: &[PathBuf]) {
        if let Some(first) = paths.first() {
            self.select(first.clone());
        }
    }

    /// `No file selected` or `Selected: <file name>`.
    pub fn selection_label(&self) -> String {
        match &self.selected {
            None => "No file selected".to_string(),
            Some(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("Selected: {name}")
            }
        }
    }

    /// Whether "Convert to Markdown" is enabled.
    pub fn can_convert(&self) -> bool {
        self.selected.is_some() && !self.busy && self.dialog.is_none()
    }

    /// Mark a conversion as started and return its request.
    ///
    /// Returns `None` (and changes nothing) when the trigger is disabled.
    pub fn begin_conversion(&mut self) -> Option<ConversionRequest> {
        if !self.can_convert() {
            return None;
        }
        let path = self.selected.as_ref()?;
        let request = ConversionRequest::new(path.to_string_lossy())?;
        self.busy = true;
        Some(request)
    }

    /// Record the result of the in-flight conversion.
    ///
    /// The selection is kept either way so a failed file can be retried.
    pub fn finish_conversion(&mut self, result: Result<ConversionOutcome, WorkflowError>) {
        self.busy = false;
        self.dialog = Some(match result {
            Ok(outcome) => Dialog::Success {
                output_path: outcome.output_path,
            },
            Err(e) => Dialog::Error {
                message: e.to_string(),
            },
        });
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }
}

/// The folder "Open Folder" should reveal.
pub fn containing_folder(output_path: &Path) -> PathBuf {
    match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConversionError, ExtractError};
    use crate::format::DocumentFormat;
    use tempfile::TempDir;

    fn outcome(out: &str) -> ConversionOutcome {
        ConversionOutcome {
            source_path: "in.docx".into(),
            output_path: out.into(),
            bytes_written: 1,
            format: DocumentFormat::Docx,
            converter: "builtin".into(),
            duration_ms: 0,
        }
    }

    #[test]
    fn convert_disabled_until_selection() {
        let mut state = DesktopState::new();
        assert!(!state.can_convert());
        assert_eq!(state.selection_label(), "No file selected");
        assert!(state.begin_conversion().is_none());

        state.select("/docs/report.docx");
        assert!(state.can_convert());
        assert_eq!(state.selection_label(), "Selected: report.docx");
    }

    #[test]
    fn trigger_is_disabled_while_running() {
        let mut state = DesktopState::new();
        state.select("a.pdf");
        let req = state.begin_conversion().unwrap();
        assert_eq!(req.source_path(), "a.pdf");
        assert!(state.is_busy());
        assert!(!state.can_convert());
        assert!(state.begin_conversion().is_none());

        state.select("b.pdf");
        assert_eq!(state.selected(), Some(Path::new("a.pdf")));
    }

    #[test]
    fn success_shows_output_path() {
        let mut state = DesktopState::new();
        state.select("in.docx");
        state.begin_conversion();
        state.finish_conversion(Ok(outcome("/tmp/in.md")));
        let dialog = state.dialog().unwrap();
        assert_eq!(dialog.title(), "Conversion Successful");
        assert_eq!(dialog.text(), "Successfully converted to:\n/tmp/in.md");
    }

    #[test]
    fn failure_keeps_selection_for_retry() {
        let mut state = DesktopState::new();
        state.select("bad.xlsx");
        state.begin_conversion();
        let err = WorkflowError::from(ConversionError::new(
            "bad.xlsx",
            ExtractError::Delegate("corrupt".into()),
        ));
        state.finish_conversion(Err(err));

        assert_eq!(
            state.dialog().unwrap().text(),
            "Error converting file:\nConversion error: corrupt"
        );
        assert!(!state.can_convert());
        state.dismiss_dialog();
        assert!(state.can_convert());
        assert_eq!(state.selected(), Some(Path::new("bad.xlsx")));
    }

    #[test]
    fn only_first_dropped_file_is_taken() {
        let mut state = DesktopState::new();
        state.select_dropped(&[PathBuf::from("one.pdf"), PathBuf::from("two.pdf")]);
        assert_eq!(state.selected(), Some(Path::new("one.pdf")));
        state.select_dropped(&[]);
        assert_eq!(state.selected(), Some(Path::new("one.pdf")));
    }

    #[test]
    fn picker_lists_dirs_first_and_filters_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.docx"), b"").unwrap();
        std::fs::write(dir.path().join("A.PDF"), b"").unwrap();
        std::fs::write(dir.path().join("skip.rs"), b"").unwrap();
        std::fs::write(dir.path().join(".hidden.txt"), b"").unwrap();

        let mut picker = FilePicker::new(dir.path());
        let names: Vec<&str> = picker.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["..", "sub", "A.PDF", "b.docx"]);

        picker.set_show_all(true);
        assert!(picker.entries.iter().any(|e| e.name == "skip.rs"));
    }

    #[test]
    fn activating_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("x.txt"), b"").unwrap();

        let mut picker = FilePicker::new(dir.path());
        let sub = picker.entries.iter().find(|e| e.name == "sub").cloned().unwrap();
        assert_eq!(picker.activate(&sub), None);
        assert_eq!(picker.current_dir, dir.path().join("sub"));

        let file = picker.entries.iter().find(|e| e.name == "x.txt").cloned().unwrap();
        assert_eq!(picker.activate(&file), Some(dir.path().join("sub").join("x.txt")));
    }

    #[test]
    fn folder_of_output() {
        assert_eq!(containing_folder(Path::new("/a/b.md")), PathBuf::from("/a"));
        assert_eq!(containing_folder(Path::new("b.md")), PathBuf::from("."));
    }
}
