//! Post-processing: deterministic cleanup of extracted Markdown.
//!
//! Extractors emit whatever whitespace the source document carried: Windows
//! line endings from HTML files, trailing spaces from PDF text layers, long
//! runs of blank paragraphs from Word documents, zero-width characters from
//! copy-pasted web content. These rules fix that without touching content.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the per-line rules see `\n` only;
//! trailing whitespace is trimmed before blank-line collapsing so lines made
//! only of spaces count as blank.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to extracted Markdown.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Trim trailing whitespace per line
/// 3. Collapse 3+ consecutive newlines down to one blank line
/// 4. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, etc.)
/// 5. Ensure non-empty output ends with exactly one newline
pub fn clean_markdown(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .split('\n')
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 3: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 4: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 5: Ensure file ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end_matches('\n');
    if trimmed.trim().is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello   \nworld  \n"),
            "  hello\nworld\n"
        );
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn test_ensure_final_newline() {
        assert_eq!(ensure_final_newline("hello"), "hello\n");
        assert_eq!(ensure_final_newline("hello\n\n\n"), "hello\n");
        assert_eq!(ensure_final_newline(""), "");
        assert_eq!(ensure_final_newline("\n\n"), "");
    }

    #[test]
    fn test_leading_indentation_is_kept() {
        let input = "    code block\n\tindented";
        assert_eq!(clean_markdown(input), "    code block\n\tindented\n");
    }

    #[test]
    fn test_clean_markdown_full_pipeline() {
        let input = "# Title\r\n\r\nSome text   \r\n  \n\n\n\n## Section\u{200B}\n\n";
        assert_eq!(clean_markdown(input), "# Title\n\nSome text\n\n## Section\n");
    }

    #[test]
    fn test_clean_markdown_is_idempotent() {
        let once = clean_markdown("a  \r\n\r\n\r\n\r\nb\u{FEFF}");
        assert_eq!(clean_markdown(&once), once);
    }
}
