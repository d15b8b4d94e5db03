//! Shared helpers for Office Open XML containers (.docx, .pptx, .xlsx).

use crate::error::ExtractError;
use crate::pipeline::input::SourceFile;
use quick_xml::events::BytesStart;
use std::fs::File;
use std::io::Read;
use zip::result::ZipError;
use zip::ZipArchive;

/// An opened OOXML package.
pub(crate) struct Package<'a> {
    source: &'a SourceFile,
    format: &'static str,
    archive: ZipArchive<File>,
}

impl<'a> Package<'a> {
    /// Open `source` as a ZIP package; a non-ZIP file is reported as malformed.
    pub(crate) fn open(source: &'a SourceFile, format: &'static str) -> Result<Self, ExtractError> {
        let file = source.open()?;
        let archive = ZipArchive::new(file).map_err(|e| ExtractError::Malformed {
            path: source.path().to_path_buf(),
            format,
            detail: format!("not an Office Open XML package ({e})"),
        })?;
        Ok(Self {
            source,
            format,
            archive,
        })
    }

    /// Names of every entry in the package.
    pub(crate) fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Read a UTF-8 part, or `None` when the package does not contain it.
    pub(crate) fn read_part(&mut self, name: &str) -> Result<Option<String>, ExtractError> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(ExtractError::Malformed {
                    path: self.source.path().to_path_buf(),
                    format: self.format,
                    detail: format!("cannot open part '{name}': {e}"),
                })
            }
        };
        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|e| ExtractError::Malformed {
                path: self.source.path().to_path_buf(),
                format: self.format,
                detail: format!("cannot read part '{name}': {e}"),
            })?;
        Ok(Some(xml))
    }

    /// Read a part that every valid package of this format must contain.
    pub(crate) fn require_part(&mut self, name: &str) -> Result<String, ExtractError> {
        match self.read_part(name)? {
            Some(xml) => Ok(xml),
            None => Err(self.malformed(format!("missing part '{name}'"))),
        }
    }

    pub(crate) fn malformed(&self, detail: impl Into<String>) -> ExtractError {
        ExtractError::Malformed {
            path: self.source.path().to_path_buf(),
            format: self.format,
            detail: detail.into(),
        }
    }
}

/// Value of the attribute whose local name is `local`, ignoring its prefix.
pub(crate) fn attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Whether a boolean toggle element such as `<w:b/>` is on.
///
/// An absent `val` means on; `0`, `false` and `none` mean off.
pub(crate) fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(
        attr(e, b"val").as_deref(),
        Some("0") | Some("false") | Some("none")
    )
}
