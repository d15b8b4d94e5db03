//! Path handling for user-supplied input.
//!
//! Users paste paths from file managers and terminals, which frequently wrap
//! them in quotes (`"C:\My Files\report.docx"`, `'~/notes.txt'`). Both
//! helpers here work on plain strings so front-ends can echo back exactly what
//! the workflow used.

/// Strip one matching pair of surrounding quotes from `raw`.
///
/// Only a *matching* pair is removed: `"a"` and `'a'` become `a`, while
/// `"a'` is returned unchanged. No other trimming happens: whitespace and
/// slashes are preserved, and a lone quote character is not a pair.
pub fn normalize_path(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

/// Replace the final extension of `source` with `.md`.
///
/// The split happens at the last `.` anywhere in `source`, directories
/// included: a string with no `.` keeps the whole string as the base, and a
/// trailing bare `.` is dropped.
///
/// ```
/// use anydoc2md::derive_output_path;
///
/// assert_eq!(derive_output_path("report.docx"), "report.md");
/// assert_eq!(derive_output_path("archive.tar.gz"), "archive.tar.md");
/// assert_eq!(derive_output_path("README"), "README.md");
/// assert_eq!(derive_output_path("notes."), "notes.md");
/// assert_eq!(derive_output_path("dir.v2/README"), "dir.md");
/// ```
pub fn derive_output_path(source: &str) -> String {
    let base = match source.rfind('.') {
        Some(dot) => &source[..dot],
        None => source,
    };

    format!("{base}.md")
}
