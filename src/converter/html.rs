//! HTML extraction via `html2md`.

use crate::error::ExtractError;
use crate::pipeline::input::SourceFile;
use once_cell::sync::Lazy;
use regex::Regex;

/// `html2md` keeps the text of `<script>` and `<style>` elements, so they
/// are removed before parsing.
static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static RE_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());

/// Extract an HTML file as Markdown.
pub fn extract(source: &SourceFile) -> Result<String, ExtractError> {
    let html = source.read_text()?;
    Ok(html_to_markdown(&html))
}

pub(crate) fn html_to_markdown(html: &str) -> String {
    let html = RE_SCRIPT.replace_all(html, "");
    let html = RE_STYLE.replace_all(&html, "");
    html2md::parse_html(&html)
}
