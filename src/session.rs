//! The interactive prompt loop behind `anydoc2md` with no arguments.
//!
//! Generic over `BufRead`/`Write` so the exact transcript can be asserted in
//! tests without a terminal.

use crate::error::WorkflowError;
use crate::output::ConversionOutcome;
use crate::workflow::{ConversionRequest, ConversionWorkflow};
use std::io::{self, BufRead, Write};
use tracing::debug;

pub const PROMPT: &str =
    "Enter the path to the file you want to convert to markdown (or press Enter to exit): ";

pub const EXIT_MESSAGE: &str = "Exiting...";

/// Counts of what a session did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub converted: usize,
    pub failed: usize,
}

/// The line printed after one workflow run.
pub fn report_line(result: &Result<ConversionOutcome, WorkflowError>) -> String {
    match result {
        Ok(outcome) => format!(
            "Successfully converted {} to {}",
            outcome.source_path.display(),
            outcome.output_path.display()
        ),
        Err(e) => format!("Error processing file: {e}"),
    }
}

/// Prompt for paths until an empty line or end of input.
///
/// Failures are reported and the loop continues; only I/O errors on the
/// terminal streams end the session early.
pub fn run_interactive<R: BufRead, W: Write>(
    workflow: &ConversionWorkflow,
    mut input: R,
    mut out: W,
) -> io::Result<SessionSummary> {
    let mut summary = SessionSummary::default();
    let mut line = String::new();

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("End of input");
            writeln!(out, "{EXIT_MESSAGE}")?;
            break;
        }

        let Some(request) = ConversionRequest::new(line.as_str()) else {
            writeln!(out, "{EXIT_MESSAGE}")?;
            break;
        };

        let result = workflow.run(&request);
        match result {
            Ok(_) => summary.converted += 1,
            Err(_) => summary.failed += 1,
        }
        writeln!(out, "{}", report_line(&result))?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;
    use crate::error::ExtractError;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn transcript(workflow: &ConversionWorkflow, input: &str) -> (String, SessionSummary) {
        let mut out = Vec::new();
        let summary = run_interactive(workflow, Cursor::new(input), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn empty_line_exits_without_running() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let conv = move |_: &Path| -> Result<String, ExtractError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(String::new())
        };
        let config = ConversionConfig::builder()
            .converter(Arc::new(conv))
            .build()
            .unwrap();
        let wf = ConversionWorkflow::new(&config);

        let (out, summary) = transcript(&wf, "\n");
        assert_eq!(out, format!("{PROMPT}{EXIT_MESSAGE}\n"));
        assert_eq!(summary, SessionSummary::default());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn end_of_input_exits() {
        let wf = ConversionWorkflow::new(&ConversionConfig::default());
        let (out, _) = transcript(&wf, "");
        assert_eq!(out, format!("{PROMPT}{EXIT_MESSAGE}\n"));
    }

    #[test]
    fn reports_each_run_and_keeps_looping() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("notes.txt");
        std::fs::write(&good, "hi").unwrap();
        let bad = dir.path().join("gone.txt");

        let wf = ConversionWorkflow::new(&ConversionConfig::default());
        let input = format!("'{}'\n{}\n\n", good.display(), bad.display());
        let (out, summary) = transcript(&wf, &input);

        let lines: Vec<&str> = out.split(PROMPT).filter(|s| !s.is_empty()).collect();
        assert_eq!(lines.len(), 3, "{out}");
        assert_eq!(
            lines[0],
            format!(
                "Successfully converted {} to {}\n",
                good.display(),
                dir.path().join("notes.md").display()
            )
        );
        assert!(lines[1].starts_with("Error processing file: Conversion error: No such file"));
        assert_eq!(lines[2], format!("{EXIT_MESSAGE}\n"));
        assert_eq!(summary, SessionSummary { converted: 1, failed: 1 });
    }
}
