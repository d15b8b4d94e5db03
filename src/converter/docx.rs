//! Word (`.docx`) extraction.
//!
//! Walks `word/document.xml` with a streaming `quick-xml` reader and maps
//! the WordprocessingML structure onto Markdown:
//!
//! | WordprocessingML | Markdown |
//! |------------------|----------|
//! | `<w:pStyle w:val="Heading2"/>` | `## text` |
//! | `<w:pStyle w:val="Title"/>` | `# text` |
//! | `<w:numPr>` (numbered / bulleted paragraph) | `- text`, indented by `w:ilvl` |
//! | `<w:b/>`, `<w:i/>` run properties | `**text**`, `*text*` |
//! | `<w:tab/>`, `<w:br/>` inside a run | tab, line break |
//! | `<w:tbl>` | GFM table (first row is the header) |
//!
//! Nested tables are flattened into the enclosing cell. Deleted text
//! (`w:delText`) and field codes (`w:instrText`) are skipped because only
//! `w:t` contributes text.

use super::ooxml::{attr, toggle_on, Package};
use super::table::markdown_table;
use crate::error::ExtractError;
use crate::pipeline::input::SourceFile;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract a `.docx` file as Markdown.
pub fn extract(source: &SourceFile) -> Result<String, ExtractError> {
    let mut package = Package::open(source, "Word")?;
    let xml = package.require_part(DOCUMENT_PART)?;
    document_to_markdown(&xml).map_err(|detail| package.malformed(detail))
}

/// A finished top-level block.
enum Block {
    Paragraph(String),
    ListItem(String),
    Table(String),
}

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: Vec<String>,
}

#[derive(Default)]
struct RunState {
    text: String,
    bold: bool,
    italic: bool,
}

/// Convert the XML of `word/document.xml` to Markdown.
///
/// Errors are returned as plain detail strings; the caller attaches the path.
pub(crate) fn document_to_markdown(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut blocks: Vec<Block> = Vec::new();

    let mut para = String::new();
    let mut heading: Option<usize> = None;
    let mut list_level: Option<usize> = None;

    let mut run = RunState::default();
    let mut in_run = false;
    let mut in_run_props = false;
    let mut in_text = false;

    let mut table_depth = 0usize;
    let mut table = TableState::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML error at byte {}: {e}", reader.buffer_position()))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"p" if !is_empty => {
                        para.clear();
                        heading = None;
                        list_level = None;
                    }
                    b"pStyle" => heading = attr(e, b"val").and_then(|v| heading_level(&v)),
                    b"numPr" => list_level = Some(list_level.unwrap_or(0)),
                    b"ilvl" => {
                        let level = attr(e, b"val").and_then(|v| v.parse().ok()).unwrap_or(0);
                        list_level = Some(level);
                    }
                    b"r" if !is_empty => {
                        run = RunState::default();
                        in_run = true;
                    }
                    b"rPr" if in_run && !is_empty => in_run_props = true,
                    b"b" if in_run_props => run.bold = toggle_on(e),
                    b"i" if in_run_props => run.italic = toggle_on(e),
                    b"t" if in_run && !is_empty => in_text = true,
                    b"tab" if in_run => run.text.push('\t'),
                    b"br" | b"cr" if in_run => run.text.push('\n'),
                    b"tbl" if !is_empty => {
                        table_depth += 1;
                        if table_depth == 1 {
                            table = TableState::default();
                        }
                    }
                    b"tr" if table_depth == 1 && !is_empty => table.row.clear(),
                    b"tc" if table_depth == 1 && !is_empty => table.cell.clear(),
                    _ => {}
                }
            }
            Event::Text(ref t) if in_text => {
                let text = t.unescape().map_err(|e| format!("bad text escape: {e}"))?;
                run.text.push_str(&text);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPr" => in_run_props = false,
                b"r" => {
                    in_run = false;
                    if heading.is_some() {
                        para.push_str(&run.text);
                    } else {
                        para.push_str(&emphasize(&run.text, run.bold, run.italic));
                    }
                }
                b"p" => {
                    let text = para.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let rendered = match (heading, list_level) {
                        (Some(level), _) => {
                            Block::Paragraph(format!("{} {}", "#".repeat(level), text))
                        }
                        (None, Some(level)) => {
                            Block::ListItem(format!("{}- {}", "  ".repeat(level), text))
                        }
                        (None, None) => Block::Paragraph(text.to_string()),
                    };
                    if table_depth > 0 {
                        let cell_text = match rendered {
                            Block::Paragraph(s) | Block::ListItem(s) | Block::Table(s) => s,
                        };
                        table.cell.push(cell_text);
                    } else {
                        blocks.push(rendered);
                    }
                }
                b"tc" if table_depth == 1 => {
                    let cell = table.cell.join("\n");
                    table.row.push(cell);
                }
                b"tr" if table_depth == 1 => {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
                b"tbl" => {
                    if table_depth == 1 {
                        let rendered = markdown_table(&table.rows);
                        if !rendered.is_empty() {
                            blocks.push(Block::Table(rendered));
                        }
                    }
                    table_depth = table_depth.saturating_sub(1);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    debug!("docx: {} blocks", blocks.len());
    Ok(join_blocks(&blocks))
}

/// Map a paragraph style id to a heading level.
fn heading_level(style: &str) -> Option<usize> {
    let lower = style.to_ascii_lowercase();
    if lower == "title" {
        return Some(1);
    }
    if lower == "subtitle" {
        return Some(2);
    }
    let digits = lower.strip_prefix("heading")?.trim();
    match digits.parse::<usize>() {
        Ok(n) if (1..=6).contains(&n) => Some(n),
        _ => None,
    }
}

/// Wrap the non-whitespace core of `text` in emphasis markers.
fn emphasize(text: &str, bold: bool, italic: bool) -> String {
    let marker = match (bold, italic) {
        (true, true) => "***",
        (true, false) => "**",
        (false, true) => "*",
        (false, false) => return text.to_string(),
    };
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let start = text.len() - text.trim_start().len();
    let end = start + core.len();
    format!("{}{marker}{core}{marker}{}", &text[..start], &text[end..])
}

/// Join blocks with blank lines, keeping consecutive list items tight.
fn join_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut prev_was_item = false;
    for (i, block) in blocks.iter().enumerate() {
        let (text, is_item) = match block {
            Block::Paragraph(s) | Block::Table(s) => (s, false),
            Block::ListItem(s) => (s, true),
        };
        if i > 0 {
            out.push_str(if prev_was_item && is_item { "\n" } else { "\n\n" });
        }
        out.push_str(text);
        prev_was_item = is_item;
    }
    out
}
