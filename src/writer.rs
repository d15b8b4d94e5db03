//! Persist Markdown next to its source.
//!
//! The content is staged in a temporary file inside the destination
//! directory and renamed over the destination, so readers never observe a
//! partially written file and a failed write leaves any existing file
//! untouched. Missing directories are not created.

use crate::error::WriteError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `content` to `output`, replacing any existing file.
///
/// Returns the number of bytes written.
pub fn write_markdown(content: &str, output: impl AsRef<Path>) -> Result<u64, WriteError> {
    let output = output.as_ref();
    let fail = |source: std::io::Error| WriteError {
        path: output.to_path_buf(),
        source,
    };

    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(fail(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("directory '{}' does not exist", dir.display()),
        )));
    }

    let previous = fs::metadata(output).ok().filter(|m| m.is_file());

    let mut tmp = NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(content.as_bytes()).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;

    match previous {
        Some(meta) => fs::set_permissions(tmp.path(), meta.permissions()).map_err(fail)?,
        None => set_new_file_permissions(tmp.path()).map_err(fail)?,
    }

    tmp.persist(output).map_err(|e| fail(e.error))?;

    debug!("Wrote {} bytes to {}", content.len(), output.display());
    Ok(content.len() as u64)
}

#[cfg(unix)]
fn set_new_file_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_new_file_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
