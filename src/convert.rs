//! Conversion service: run the configured delegate over one source file.
//!
//! This layer knows nothing about output paths; it resolves which
//! [`DocumentConverter`] to use and wraps whatever it reports into a
//! [`ConversionError`]. Persisting the result is the workflow's job.

use crate::config::ConversionConfig;
use crate::converter::{BuiltinConverter, DocumentConverter};
use crate::error::{ConversionError, ExtractError};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a document to Markdown without writing anything.
///
/// # Errors
/// Returns [`ConversionError`] carrying the delegate's [`ExtractError`] as its
/// cause; the source file is never modified.
///
/// # Example
/// ```rust,no_run
/// use anydoc2md::{convert, ConversionConfig};
///
/// let markdown = convert("slides.pptx", &ConversionConfig::default())?;
/// println!("{markdown}");
/// # Ok::<(), anydoc2md::ConversionError>(())
/// ```
pub fn convert(
    source: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<String, ConversionError> {
    let source = source.as_ref();
    let converter = resolve_converter(config);
    convert_with(converter.as_ref(), source)
}

/// Run a specific delegate over `source`.
pub(crate) fn convert_with(
    converter: &dyn DocumentConverter,
    source: &Path,
) -> Result<String, ConversionError> {
    let start = Instant::now();
    info!("Converting {} with '{}'", source.display(), converter.name());

    let markdown = converter
        .convert(source)
        .map_err(|cause| ConversionError::new(source, cause))?;

    debug!(
        "Converted {} ({} bytes) in {} ms",
        source.display(),
        markdown.len(),
        start.elapsed().as_millis()
    );
    Ok(markdown)
}

/// Async wrapper around [`convert`].
///
/// Extraction is blocking file and CPU work, so it runs on Tokio's blocking
/// pool.
pub async fn convert_async(
    source: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<String, ConversionError> {
    let source = source.as_ref().to_path_buf();
    let config = config.clone();
    let task_source = source.clone();

    tokio::task::spawn_blocking(move || convert(&task_source, &config))
        .await
        .map_err(|e| {
            ConversionError::new(
                source,
                ExtractError::Delegate(format!("Conversion task panicked: {}", e)),
            )
        })?
}

/// The configured delegate, or the built-in converter when none is set.
pub(crate) fn resolve_converter(config: &ConversionConfig) -> Arc<dyn DocumentConverter> {
    if let Some(ref converter) = config.converter {
        debug!("Using pre-configured converter '{}'", converter.name());
        return Arc::clone(converter);
    }
    Arc::new(BuiltinConverter::from_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn custom_converter_takes_precedence() {
        let conv = |_: &Path| -> Result<String, ExtractError> { Ok("from delegate".into()) };
        let config = ConversionConfig::builder()
            .converter(Arc::new(conv))
            .build()
            .unwrap();
        assert_eq!(convert("anything.xyz", &config).unwrap(), "from delegate");
    }

    #[test]
    fn delegate_failure_is_wrapped() {
        let conv = |_: &Path| -> Result<String, ExtractError> {
            Err(ExtractError::Delegate("cannot read archives".into()))
        };
        let config = ConversionConfig::builder()
            .converter(Arc::new(conv))
            .build()
            .unwrap();
        let err = convert("data.tar", &config).unwrap_err();
        assert_eq!(err.path, Path::new("data.tar"));
        assert_eq!(err.to_string(), "Conversion error: cannot read archives");
    }

    #[test]
    fn builtin_is_the_default() {
        assert_eq!(resolve_converter(&ConversionConfig::default()).name(), "builtin");
    }

    #[tokio::test]
    async fn async_wrapper_converts_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello\n").unwrap();
        let md = convert_async(&path, &ConversionConfig::default())
            .await
            .unwrap();
        assert_eq!(md, "hello\n");
    }
}
