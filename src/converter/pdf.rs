//! PDF text extraction via pdfium.
//!
//! Only the embedded text layer is read; scanned pages without text come
//! out empty. The pdfium shared library is bound at call time, first from an
//! explicit path, then next to the executable, then the working directory,
//! then the system library search path.

use crate::config::PageSeparator;
use crate::error::ExtractError;
use crate::pipeline::input::SourceFile;
use pdfium_render::prelude::*;
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PDF_MAGIC: &[u8] = b"%PDF";

/// Extract the text layer of a PDF, one block per page.
pub fn extract(
    source: &SourceFile,
    library_path: Option<&Path>,
    separator: &PageSeparator,
) -> Result<String, ExtractError> {
    let head = source.read_magic::<1024>()?;
    if !has_pdf_magic(&head) {
        return Err(ExtractError::Malformed {
            path: source.path().to_path_buf(),
            format: "PDF",
            detail: "missing %PDF header".into(),
        });
    }

    let pdfium = Pdfium::new(bind_pdfium(library_path)?);

    let document = pdfium
        .load_pdf_from_file(source.path(), None)
        .map_err(|e| {
            let err_str = format!("{:?}", e);
            let detail = if err_str.contains("Password") || err_str.contains("password") {
                "document is encrypted".to_string()
            } else {
                err_str
            };
            ExtractError::Malformed {
                path: source.path().to_path_buf(),
                format: "PDF",
                detail,
            }
        })?;

    let mut pages = Vec::new();
    for (idx, page) in document.pages().iter().enumerate() {
        let text = page.text().map_err(|e| ExtractError::Malformed {
            path: source.path().to_path_buf(),
            format: "PDF",
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;
        let text = text.all();
        debug!("Page {} → {} chars", idx + 1, text.len());
        pages.push(text);
    }
    info!("PDF loaded: {} pages", pages.len());

    Ok(assemble_pages(&pages, separator))
}

/// Some producers emit junk before the header; pdfium tolerates it within
/// the first kilobyte, so we do too.
fn has_pdf_magic(head: &[u8]) -> bool {
    head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

/// Join page texts, inserting `separator` before every page but the first.
fn assemble_pages(pages: &[String], separator: &PageSeparator) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            parts.push(separator.render(i + 1));
        }
        parts.push(page.trim_end().to_string());
    }
    parts.join("")
}

fn platform_library_name() -> String {
    format!("{DLL_PREFIX}pdfium{DLL_SUFFIX}")
}

/// Candidate library files, in the order they are tried.
fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = explicit {
        candidates.push(path.to_path_buf());
    }
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(platform_library_name()));
    }
    candidates.push(PathBuf::from(".").join(platform_library_name()));
    candidates
}

fn bind_pdfium(
    explicit: Option<&Path>,
) -> Result<Box<dyn PdfiumLibraryBindings>, ExtractError> {
    let mut tried = Vec::new();
    for candidate in candidate_paths(explicit) {
        if explicit.is_none() && !candidate.exists() {
            continue;
        }
        match Pdfium::bind_to_library(candidate.to_string_lossy().into_owned()) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(bindings);
            }
            Err(e) => tried.push(format!("{}: {:?}", candidate.display(), e)),
        }
        if explicit.is_some() {
            // An explicit library that fails to load is an error, not a hint.
            return Err(ExtractError::PdfEngineUnavailable(tried.join("; ")));
        }
    }

    Pdfium::bind_to_system_library().map_err(|e| {
        tried.push(format!("system library: {:?}", e));
        ExtractError::PdfEngineUnavailable(tried.join("; "))
    })
}
