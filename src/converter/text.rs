//! Plain-text passthrough for txt, md, json, xml, csv and extensionless files.

use crate::error::ExtractError;
use crate::pipeline::input::SourceFile;

/// Return the file's UTF-8 contents unchanged (minus a byte-order mark).
pub fn extract(source: &SourceFile) -> Result<String, ExtractError> {
    source.read_text()
}
