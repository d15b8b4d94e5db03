//! CLI binary for anydoc2md.
//!
//! With no arguments it runs the interactive prompt loop; with paths it
//! converts each one and exits. Either way the library's
//! `ConversionWorkflow` does the work; this file maps flags to
//! `ConversionConfig` and prints results.

use anydoc2md::session::{report_line, run_interactive};
use anydoc2md::{
    convert, normalize_path, ConversionConfig, ConversionOutcome, ConversionRequest,
    ConversionWorkflow, PageSeparator, SharedObserver, WorkflowObserver, WorkflowState,
    SUPPORTED_EXTENSIONS,
};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Terminal observer: shows a spinner on stderr while a run is in flight and
/// clears it before the result line is printed.
struct SpinnerObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerObserver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn start_bar() -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl WorkflowObserver for SpinnerObserver {
    fn on_transition(&self, state: &WorkflowState) {
        match state {
            WorkflowState::PathReceived => {
                if let Ok(mut guard) = self.bar.lock() {
                    *guard = Some(Self::start_bar());
                }
            }
            WorkflowState::Converted => self.with_bar(|b| b.set_prefix("Converted")),
            WorkflowState::OutputDerived => self.with_bar(|b| b.set_prefix("Saving")),
            _ => {}
        }
    }

    fn on_convert_start(&self, source: &Path, converter: &str) {
        self.with_bar(|b| {
            b.set_prefix("Converting");
            b.set_message(format!("{}  {}", source.display(), dim(converter)));
        });
    }

    fn on_complete(&self, _outcome: &ConversionOutcome) {
        self.clear();
    }

    fn on_failure(&self, _error: &str) {
        self.clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive: prompt for paths until an empty line
  anydoc2md

  # Convert files in place (writes report.md, deck.md)
  anydoc2md report.docx deck.pptx

  # Choose the destination
  anydoc2md budget.xlsx -o /tmp/budget.md

  # Print Markdown instead of writing a file
  anydoc2md --stdout page.html

  # Machine-readable results
  anydoc2md --json *.pdf > results.jsonl

  # PDF with page markers
  anydoc2md --separator comment paper.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium used for PDF text extraction
  RUST_LOG                Override the log filter (e.g. anydoc2md=debug)

PDF SUPPORT:
  PDF text extraction needs the pdfium shared library. It is looked up at
  PDFIUM_LIB_PATH / --pdfium-lib, next to the executable, in the current
  directory, then on the system library path.
"#;

/// Convert documents to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "anydoc2md",
    version,
    about = "Convert PDF, Word, PowerPoint, Excel, HTML and text files to Markdown",
    long_about = "Convert documents to Markdown, writing <name>.md next to each source. \
Run without arguments for an interactive prompt.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Files to convert. Omit to be prompted interactively.
    inputs: Vec<String>,

    /// Write Markdown to this file instead of next to the source.
    #[arg(short, long, env = "ANYDOC2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Print Markdown to stdout instead of writing files.
    #[arg(long, env = "ANYDOC2MD_STDOUT", conflicts_with_all = ["output", "json"])]
    stdout: bool,

    /// Print one JSON result object per converted file.
    #[arg(long, env = "ANYDOC2MD_JSON")]
    json: bool,

    /// PDF page separator: none, hr, comment, or custom string.
    #[arg(long, env = "ANYDOC2MD_SEPARATOR", default_value = "none")]
    separator: String,

    /// Keep extracted text as-is (no whitespace cleanup).
    #[arg(long, env = "ANYDOC2MD_RAW")]
    raw: bool,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// List the extensions offered by file pickers and exit.
    #[arg(long)]
    list_formats: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "ANYDOC2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ANYDOC2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ANYDOC2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the spinner is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.stdout;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.list_formats {
        for ext in SUPPORTED_EXTENSIONS {
            println!("{ext}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    if cli.output.is_some() && cli.inputs.len() != 1 {
        anyhow::bail!("--output requires exactly one input file");
    }

    let observer: Option<SharedObserver> = if show_progress {
        Some(SpinnerObserver::new() as SharedObserver)
    } else {
        None
    };
    let config = build_config(&cli, observer)?;

    // ── Interactive mode ─────────────────────────────────────────────────
    if cli.inputs.is_empty() {
        let workflow = ConversionWorkflow::new(&config);
        let summary = tokio::task::block_in_place(|| {
            run_interactive(&workflow, io::stdin().lock(), io::stdout())
        })
        .context("Interactive session failed")?;
        tracing::debug!(
            "Session ended: {} converted, {} failed",
            summary.converted,
            summary.failed
        );
        return Ok(ExitCode::SUCCESS);
    }

    // ── Stdout mode ──────────────────────────────────────────────────────
    if cli.stdout {
        let mut failed = 0usize;
        let stdout = io::stdout();
        for input in &cli.inputs {
            match convert(normalize_path(input), &config) {
                Ok(markdown) => {
                    let mut handle = stdout.lock();
                    handle
                        .write_all(markdown.as_bytes())
                        .context("Failed to write to stdout")?;
                    if !markdown.ends_with('\n') {
                        handle
                            .write_all(b"\n")
                            .context("Failed to write to stdout")?;
                    }
                }
                Err(e) => {
                    failed += 1;
                    eprintln!("Error processing file: {e}");
                }
            }
        }
        return Ok(exit_code(failed));
    }

    // ── Batch mode ───────────────────────────────────────────────────────
    let workflow = ConversionWorkflow::new(&config);
    let mut failed = 0usize;
    for input in &cli.inputs {
        let Some(request) = ConversionRequest::new(input.as_str()) else {
            continue;
        };
        let result = workflow.run_with_output(&request, cli.output.as_deref());
        match &result {
            Ok(outcome) if cli.json => {
                let json =
                    serde_json::to_string(outcome).context("Failed to serialise result")?;
                println!("{json}");
            }
            Ok(_) if cli.quiet => {}
            Ok(_) => println!("{}", report_line(&result)),
            Err(_) => {
                failed += 1;
                eprintln!("{}", report_line(&result));
            }
        }
    }

    Ok(exit_code(failed))
}

fn exit_code(failed: usize) -> ExitCode {
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, observer: Option<SharedObserver>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .page_separator(parse_separator(&cli.separator))
        .clean_output(!cli.raw);

    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib);
    }
    if let Some(obs) = observer {
        builder = builder.observer(obs);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.trim().to_lowercase().as_str() {
        "none" | "" => PageSeparator::None,
        "hr" | "---" => PageSeparator::HorizontalRule,
        "comment" => PageSeparator::Comment,
        _ => PageSeparator::Custom(s.to_string()),
    }
}
