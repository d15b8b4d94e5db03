//! Excel (`.xlsx`) extraction.
//!
//! Each worksheet becomes a `## <sheet name>` section followed by a GFM
//! table of its used range. The sheet list and order come from
//! `xl/workbook.xml`; the relationship file maps each sheet's `r:id` to its
//! part. Cell values are rendered as stored: shared strings are resolved,
//! booleans print as `TRUE`/`FALSE` and numbers keep their stored text.
//! Formulas are not evaluated; the cached value is used. Rows and columns
//! without any value are left out of the table.

use super::ooxml::{attr, Package};
use super::table::markdown_table;
use crate::error::ExtractError;
use crate::pipeline::input::SourceFile;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Columns `A` through `XFD`.
const MAX_COLUMNS: usize = 16_384;
/// Upper bound on rendered cells per sheet.
const MAX_TABLE_CELLS: usize = 1_000_000;

/// A sheet declared in the workbook.
#[derive(Debug, Clone, PartialEq)]
struct SheetRef {
    name: String,
    rel_id: String,
}

/// Extract a `.xlsx` file as Markdown.
pub fn extract(source: &SourceFile) -> Result<String, ExtractError> {
    let mut package = Package::open(source, "Excel")?;

    let workbook = package.require_part(WORKBOOK_PART)?;
    let sheets = parse_workbook(&workbook).map_err(|d| package.malformed(d))?;

    let rels = package.require_part(WORKBOOK_RELS_PART)?;
    let targets = parse_relationships(&rels).map_err(|d| package.malformed(d))?;

    let shared = match package.read_part(SHARED_STRINGS_PART)? {
        Some(xml) => parse_shared_strings(&xml).map_err(|d| package.malformed(d))?,
        None => Vec::new(),
    };
    debug!(
        "xlsx: {} sheets, {} shared strings",
        sheets.len(),
        shared.len()
    );

    let mut sections = Vec::with_capacity(sheets.len());
    for sheet in &sheets {
        let Some(part) = targets.get(&sheet.rel_id) else {
            warn!("Sheet '{}' has no relationship target; skipped", sheet.name);
            continue;
        };
        let Some(xml) = package.read_part(part)? else {
            warn!("Sheet '{}' part '{}' is missing; skipped", sheet.name, part);
            continue;
        };
        let rows = parse_sheet(&xml, &shared)
            .map_err(|d| package.malformed(format!("sheet '{}': {d}", sheet.name)))?;
        let table = markdown_table(&rows);
        sections.push(if table.is_empty() {
            format!("## {}", sheet.name)
        } else {
            format!("## {}\n\n{table}", sheet.name)
        });
    }
    Ok(sections.join("\n\n"))
}

fn reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader
}

fn xml_error(reader: &Reader<&[u8]>, e: quick_xml::Error) -> String {
    format!("XML error at byte {}: {e}", reader.buffer_position())
}

fn parse_workbook(xml: &str) -> Result<Vec<SheetRef>, String> {
    let mut reader = reader(xml);
    let mut sheets = Vec::new();
    loop {
        match reader.read_event().map_err(|e| xml_error(&reader, e))? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"sheet" => {
                let name = attr(e, b"name").unwrap_or_default();
                match attr(e, b"id") {
                    Some(rel_id) => sheets.push(SheetRef { name, rel_id }),
                    None => warn!("Sheet '{name}' has no r:id; skipped"),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(sheets)
}

/// Map relationship ids to package part names.
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, String> {
    let mut reader = reader(xml);
    let mut targets = HashMap::new();
    loop {
        match reader.read_event().map_err(|e| xml_error(&reader, e))? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) = (attr(e, b"Id"), attr(e, b"Target")) {
                    targets.insert(id, resolve_target(&target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(targets)
}

/// Targets are relative to `xl/` unless they start with `/`.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = reader(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_item = false;
    let mut in_text = false;
    // Phonetic runs (<rPh>) repeat the text as furigana.
    let mut in_phonetic = false;

    loop {
        match reader.read_event().map_err(|e| xml_error(&reader, e))? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    current.clear();
                    in_item = true;
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_item && !in_phonetic => in_text = true,
                _ => {}
            },
            Event::Empty(ref e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(ref t) if in_text => {
                let text = t.unescape().map_err(|e| format!("bad text escape: {e}"))?;
                current.push_str(&text);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                b"si" => {
                    strings.push(std::mem::take(&mut current));
                    in_item = false;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(strings)
}

/// Cell under construction.
#[derive(Default)]
struct CellState {
    col: Option<usize>,
    kind: String,
    value: String,
}

/// Read a worksheet into dense rows covering its used range.
fn parse_sheet(xml: &str, shared: &[String]) -> Result<Vec<Vec<String>>, String> {
    let mut reader = reader(xml);
    let mut grid: BTreeMap<usize, BTreeMap<usize, String>> = BTreeMap::new();

    let mut row_index = 0usize;
    let mut next_col = 0usize;
    let mut cell = CellState::default();
    let mut in_cell = false;
    let mut in_value = false;

    loop {
        match reader.read_event().map_err(|e| xml_error(&reader, e))? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"row" => {
                    row_index = attr(e, b"r")
                        .and_then(|r| r.parse::<usize>().ok())
                        .map(|r| r.saturating_sub(1))
                        .unwrap_or(row_index);
                    next_col = 0;
                }
                b"c" => {
                    cell = CellState {
                        col: attr(e, b"r").and_then(|r| column_index(&r)),
                        kind: attr(e, b"t").unwrap_or_default(),
                        value: String::new(),
                    };
                    in_cell = true;
                }
                b"v" | b"t" if in_cell => in_value = true,
                _ => {}
            },
            Event::Empty(ref e) if e.local_name().as_ref() == b"row" => {
                row_index = attr(e, b"r")
                    .and_then(|r| r.parse::<usize>().ok())
                    .unwrap_or(row_index.saturating_add(1));
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"c" => {
                // Styled but empty cell: only advances the column cursor.
                next_col = attr(e, b"r")
                    .and_then(|r| column_index(&r))
                    .unwrap_or(next_col)
                    + 1;
            }
            Event::Text(ref t) if in_value => {
                let text = t.unescape().map_err(|e| format!("bad text escape: {e}"))?;
                cell.value.push_str(&text);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    in_cell = false;
                    let col = cell.col.unwrap_or(next_col);
                    next_col = col + 1;
                    let value = cell_value(&cell.kind, &cell.value, shared);
                    if !value.is_empty() {
                        grid.entry(row_index).or_default().insert(col, value);
                    }
                }
                b"row" => row_index = row_index.saturating_add(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    compact_rows(&grid)
}

/// Render a raw cell value according to its `t` attribute.
fn cell_value(kind: &str, raw: &str, shared: &[String]) -> String {
    match kind {
        "s" => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i).cloned())
            .unwrap_or_default(),
        "b" => match raw.trim() {
            "1" => "TRUE".to_string(),
            "0" => "FALSE".to_string(),
            other => other.to_string(),
        },
        // inlineStr, str (formula string), e (error like #DIV/0!), n and default.
        _ => raw.to_string(),
    }
}

/// `"BC12"` → `Some(54)` (zero-based column of the reference).
///
/// References past column `XFD` are treated as missing.
fn column_index(reference: &str) -> Option<usize> {
    let letters = reference
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .map(|b| usize::from(b.to_ascii_uppercase() - b'A' + 1));
    let mut col = 0usize;
    for digit in letters {
        col = col.checked_mul(26)?.checked_add(digit)?;
        if col > MAX_COLUMNS {
            return None;
        }
    }
    col.checked_sub(1)
}

/// Turn the sparse grid into table rows.
///
/// Only rows and columns holding at least one value are kept, in sheet
/// order. Sheets whose compacted table would exceed [`MAX_TABLE_CELLS`] are
/// rejected.
fn compact_rows(
    grid: &BTreeMap<usize, BTreeMap<usize, String>>,
) -> Result<Vec<Vec<String>>, String> {
    let columns: BTreeSet<usize> = grid.values().flat_map(|row| row.keys().copied()).collect();
    let cells = grid.len().saturating_mul(columns.len());
    if cells > MAX_TABLE_CELLS {
        return Err(format!(
            "sheet too large to render ({} rows x {} columns)",
            grid.len(),
            columns.len()
        ));
    }

    Ok(grid
        .values()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or_default())
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const WORKBOOK: &str = r#"<?xml version="1.0"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets><sheet name="Budget" sheetId="1" r:id="rId1"/><sheet name="Notes &amp; Misc" sheetId="2" r:id="rId2"/></sheets>
</workbook>"#;

    const RELS: &str = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="worksheet" Target="/xl/worksheets/sheet2.xml"/>
</Relationships>"#;

    const SHARED: &str = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <si><t>Item</t></si><si><t>Cost</t></si><si><r><t>Rent</t></r><r><t xml:space="preserve"> (monthly)</t></r></si>
  <si><t>東京</t><rPh sb="0" eb="2"><t>トウキョウ</t></rPh></si>
</sst>"#;

    const SHEET1: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
  <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
  <row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>1200.5</v></c></row>
  <row r="3"><c r="A3" t="s"><v>3</v></c><c r="B3" t="b"><v>1</v></c></row>
</sheetData></worksheet>"#;

    const SHEET2: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
  <row r="2"><c r="B2" t="inlineStr"><is><t>hello</t></is></c><c r="D2" t="e"><v>#DIV/0!</v></c></row>
</sheetData></worksheet>"#;

    fn workbook_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("book.xlsx");
        let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
        let opts = SimpleFileOptions::default();
        for (name, body) in [
            (WORKBOOK_PART, WORKBOOK),
            (WORKBOOK_RELS_PART, RELS),
            (SHARED_STRINGS_PART, SHARED),
            ("xl/worksheets/sheet1.xml", SHEET1),
            ("xl/worksheets/sheet2.xml", SHEET2),
        ] {
            zip.start_file(name, opts).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("Z9"), Some(25));
        assert_eq!(column_index("AA3"), Some(26));
        assert_eq!(column_index("BC12"), Some(54));
        assert_eq!(column_index("12"), None);
        assert_eq!(column_index("XFD1"), Some(16_383));
    }

    #[test]
    fn overlong_column_reference_is_ignored() {
        assert_eq!(column_index("XFE1"), None);
        assert_eq!(column_index("ZZZZZZZZZZZZZZZZ1"), None);

        let xml = r#"<worksheet><sheetData>
  <row r="1"><c r="ZZZZZZZZZZZZZZZZ1" t="inlineStr"><is><t>odd</t></is></c></row>
</sheetData></worksheet>"#;
        let rows = parse_sheet(xml, &[]).unwrap();
        assert_eq!(rows, vec![vec!["odd".to_string()]]);
    }

    #[test]
    fn distant_cells_stay_compact() {
        let xml = r#"<worksheet><sheetData>
  <row r="1"><c r="A1"><v>1</v></c></row>
  <row r="200"><c r="XFD200"><v>2</v></c></row>
  <row r="1048576"><c r="XFD1048576"><v>3</v></c></row>
</sheetData></worksheet>"#;
        let rows = parse_sheet(xml, &[]).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["1".to_string(), String::new()],
                vec![String::new(), "2".to_string()],
                vec![String::new(), "3".to_string()],
            ]
        );
        assert_eq!(markdown_table(&rows), "| 1 |  |\n| --- | --- |\n|  | 2 |\n|  | 3 |");
    }

    #[test]
    fn oversized_sheet_is_rejected() {
        let mut xml = String::from("<worksheet><sheetData>");
        for i in 0..1_001usize {
            let col = i % MAX_COLUMNS;
            let letters = letters_for_column(col);
            xml.push_str(&format!(
                r#"<row r="{r}"><c r="{letters}{r}"><v>{i}</v></c></row>"#,
                r = i + 1
            ));
        }
        xml.push_str("</sheetData></worksheet>");
        let err = parse_sheet(&xml, &[]).unwrap_err();
        assert!(err.contains("too large"), "{err}");
    }

    fn letters_for_column(mut col: usize) -> String {
        let mut out = Vec::new();
        loop {
            out.push(b'A' + (col % 26) as u8);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        out.reverse();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn relationship_targets() {
        assert_eq!(resolve_target("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn shared_strings_join_rich_runs_and_skip_phonetics() {
        let strings = parse_shared_strings(SHARED).unwrap();
        assert_eq!(strings, vec!["Item", "Cost", "Rent (monthly)", "東京"]);
    }

    #[test]
    fn whole_workbook() {
        let dir = TempDir::new().unwrap();
        let src = crate::pipeline::input::resolve_source(&workbook_file(&dir)).unwrap();
        let md = extract(&src).unwrap();
        assert_eq!(
            md,
            "## Budget\n\n\
             | Item | Cost |\n| --- | --- |\n| Rent (monthly) | 1200.5 |\n| 東京 | TRUE |\n\n\
             ## Notes & Misc\n\n\
             | hello | #DIV/0! |\n| --- | --- |"
        );
    }

    #[test]
    fn empty_sheet_has_only_heading() {
        let rows = parse_sheet("<worksheet><sheetData/></worksheet>", &[]).unwrap();
        assert!(rows.is_empty());
    }
}
