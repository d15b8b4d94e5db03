//! Input resolution: validate a source path and read it for an extractor.
//!
//! Every extractor needs the same pre-flight checks (the file exists, it is
//! a regular file, and we may read it), so they live here and produce typed
//! [`ExtractError`]s instead of bare `io::Error`s. The checks open the file
//! read-only; the source is never modified.

use crate::error::ExtractError;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A source file that passed the pre-flight checks.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    /// Lower-cased extension without the dot; empty when the name has none.
    extension: String,
}

impl SourceFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Open the file for reading.
    pub fn open(&self) -> Result<File, ExtractError> {
        File::open(&self.path).map_err(|e| map_io_error(&self.path, e))
    }

    /// Read the whole file into memory.
    pub fn read_bytes(&self) -> Result<Vec<u8>, ExtractError> {
        std::fs::read(&self.path).map_err(|e| map_io_error(&self.path, e))
    }

    /// Read the file as UTF-8 text, dropping a leading byte-order mark.
    pub fn read_text(&self) -> Result<String, ExtractError> {
        let bytes = self.read_bytes()?;
        let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        String::from_utf8(body.to_vec()).map_err(|e| ExtractError::InvalidEncoding {
            path: self.path.clone(),
            detail: e.utf8_error().to_string(),
        })
    }

    /// Read the first `N` bytes, or fewer if the file is shorter.
    pub fn read_magic<const N: usize>(&self) -> Result<Vec<u8>, ExtractError> {
        let mut head = Vec::with_capacity(N);
        self.open()?
            .take(N as u64)
            .read_to_end(&mut head)
            .map_err(|e| map_io_error(&self.path, e))?;
        Ok(head)
    }
}

/// Resolve a local file path, validating existence and read permission.
pub fn resolve_source(path: &Path) -> Result<SourceFile, ExtractError> {
    let path = path.to_path_buf();

    let meta = match std::fs::metadata(&path) {
        Ok(meta) => meta,
        Err(e) => return Err(map_io_error(&path, e)),
    };
    if meta.is_dir() {
        return Err(ExtractError::IsADirectory { path });
    }

    // Check read permission by attempting to open
    if let Err(e) = File::open(&path) {
        return Err(map_io_error(&path, e));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    debug!("Resolved source: {} (.{})", path.display(), extension);
    Ok(SourceFile { path, extension })
}

fn map_io_error(path: &Path, e: io::Error) -> ExtractError {
    match e.kind() {
        io::ErrorKind::NotFound => ExtractError::FileNotFound {
            path: path.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ExtractError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = resolve_source(&dir.path().join("nope.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }), "{err:?}");
    }

    #[test]
    fn directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = resolve_source(dir.path()).unwrap_err();
        assert!(matches!(err, ExtractError::IsADirectory { .. }), "{err:?}");
    }

    #[test]
    fn extension_is_lowercased() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("Report.DOCX");
        std::fs::write(&p, b"x").unwrap();
        let src = resolve_source(&p).unwrap();
        assert_eq!(src.extension(), "docx");
        assert_eq!(src.path(), p.as_path());
    }

    #[test]
    fn no_extension_is_empty() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("README");
        std::fs::write(&p, b"x").unwrap();
        assert_eq!(resolve_source(&p).unwrap().extension(), "");
    }

    #[test]
    fn read_text_strips_bom() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("bom.txt");
        std::fs::write(&p, b"\xEF\xBB\xBFhello").unwrap();
        assert_eq!(resolve_source(&p).unwrap().read_text().unwrap(), "hello");
    }

    #[test]
    fn read_text_rejects_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("latin1.txt");
        std::fs::write(&p, b"caf\xE9").unwrap();
        let err = resolve_source(&p).unwrap().read_text().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidEncoding { .. }), "{err:?}");
    }

    #[test]
    fn read_magic_on_short_file() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("tiny.pdf");
        std::fs::write(&p, b"%P").unwrap();
        assert_eq!(resolve_source(&p).unwrap().read_magic::<4>().unwrap(), b"%P");
    }
}
