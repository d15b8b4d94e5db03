//! PowerPoint (`.pptx`) extraction.
//!
//! Every `ppt/slides/slideN.xml` part is read in slide-number order. Each
//! slide is introduced by an HTML comment (`<!-- Slide number: N -->`) so
//! the output keeps slide boundaries without adding visible text. Title
//! placeholders become `#` headings, other text frames become paragraphs
//! and `a:tbl` graphic frames become GFM tables.

use super::ooxml::{attr, Package};
use super::table::markdown_table;
use crate::error::ExtractError;
use crate::pipeline::input::SourceFile;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Extract a `.pptx` file as Markdown.
pub fn extract(source: &SourceFile) -> Result<String, ExtractError> {
    let mut package = Package::open(source, "PowerPoint")?;

    let mut slides: Vec<(u32, String)> = package
        .entry_names()
        .into_iter()
        .filter_map(|name| slide_number(&name).map(|n| (n, name)))
        .collect();
    slides.sort_by_key(|(n, _)| *n);

    if slides.is_empty() {
        return Err(package.malformed("presentation has no slides"));
    }
    debug!("pptx: {} slides", slides.len());

    let mut sections = Vec::with_capacity(slides.len());
    for (index, (_, part)) in slides.iter().enumerate() {
        let xml = package.require_part(part)?;
        let body = slide_to_markdown(&xml)
            .map_err(|detail| package.malformed(format!("{part}: {detail}")))?;
        let header = format!("<!-- Slide number: {} -->", index + 1);
        sections.push(if body.is_empty() {
            header
        } else {
            format!("{header}\n\n{body}")
        });
    }
    Ok(sections.join("\n\n"))
}

/// `ppt/slides/slide12.xml` → `Some(12)`; layouts, masters and rels → `None`.
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Convert one slide part to Markdown blocks joined by blank lines.
pub(crate) fn slide_to_markdown(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut blocks: Vec<String> = Vec::new();

    // Shape state.
    let mut shape_is_title = false;
    let mut shape_paragraphs: Vec<String> = Vec::new();

    let mut para = String::new();
    let mut in_text = false;

    // Table state.
    let mut in_table = false;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Vec<String> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML error at byte {}: {e}", reader.buffer_position()))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"sp" if !is_empty => {
                        shape_is_title = false;
                        shape_paragraphs.clear();
                    }
                    b"ph" => {
                        shape_is_title = matches!(
                            attr(e, b"type").as_deref(),
                            Some("title") | Some("ctrTitle")
                        );
                    }
                    b"tbl" if !is_empty => {
                        in_table = true;
                        rows.clear();
                    }
                    b"tr" if in_table && !is_empty => row.clear(),
                    b"tc" if in_table && !is_empty => cell.clear(),
                    b"p" if !is_empty => para.clear(),
                    b"t" if !is_empty => in_text = true,
                    b"br" => para.push('\n'),
                    _ => {}
                }
            }
            Event::Text(ref t) if in_text => {
                let text = t.unescape().map_err(|e| format!("bad text escape: {e}"))?;
                para.push_str(&text);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let text = para.trim();
                    if !text.is_empty() {
                        if in_table {
                            cell.push(text.to_string());
                        } else {
                            shape_paragraphs.push(text.to_string());
                        }
                    }
                }
                b"tc" if in_table => row.push(cell.join("\n")),
                b"tr" if in_table => rows.push(std::mem::take(&mut row)),
                b"tbl" => {
                    in_table = false;
                    let rendered = markdown_table(&rows);
                    if !rendered.is_empty() {
                        blocks.push(rendered);
                    }
                }
                b"sp" => {
                    if shape_paragraphs.is_empty() {
                        continue;
                    }
                    if shape_is_title {
                        let title = shape_paragraphs.join(" ").replace('\n', " ");
                        blocks.push(format!("# {title}"));
                    } else {
                        blocks.push(shape_paragraphs.join("\n"));
                    }
                    shape_paragraphs.clear();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(blocks.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const NS: &str = r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#;

    fn slide(shapes: &str) -> String {
        format!(r#"<p:sld {NS}><p:cSld><p:spTree>{shapes}</p:spTree></p:cSld></p:sld>"#)
    }

    fn title(text: &str) -> String {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:txBody><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
        )
    }

    fn body(paras: &[&str]) -> String {
        let ps: String = paras
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{p}</a:t></a:r></a:p>"))
            .collect();
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Content"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:txBody>{ps}</p:txBody></p:sp>"#
        )
    }

    #[test]
    fn slide_number_parsing() {
        assert_eq!(slide_number("ppt/slides/slide1.xml"), Some(1));
        assert_eq!(slide_number("ppt/slides/slide10.xml"), Some(10));
        assert_eq!(slide_number("ppt/slides/_rels/slide1.xml.rels"), None);
        assert_eq!(slide_number("ppt/slideLayouts/slideLayout1.xml"), None);
    }

    #[test]
    fn title_and_body_shapes() {
        let xml = slide(&format!("{}{}", title("Roadmap"), body(&["Q1: ship", "Q2: grow"])));
        assert_eq!(
            slide_to_markdown(&xml).unwrap(),
            "# Roadmap\n\nQ1: ship\nQ2: grow"
        );
    }

    #[test]
    fn table_frame() {
        let tc = |t: &str| format!("<a:tc><a:txBody><a:p><a:r><a:t>{t}</a:t></a:r></a:p></a:txBody></a:tc>");
        let xml = slide(&format!(
            "<p:graphicFrame><a:graphic><a:graphicData><a:tbl><a:tr>{}{}</a:tr><a:tr>{}{}</a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>",
            tc("k"), tc("v"), tc("a"), tc("1")
        ));
        assert_eq!(
            slide_to_markdown(&xml).unwrap(),
            "| k | v |\n| --- | --- |\n| a | 1 |"
        );
    }

    #[test]
    fn slides_in_numeric_order_with_markers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deck.pptx");
        let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
        let opts = SimpleFileOptions::default();
        // Written out of order on purpose: slide10 sorts after slide2.
        for (n, text) in [(10, "last"), (1, "first"), (2, "second")] {
            zip.start_file(format!("ppt/slides/slide{n}.xml"), opts).unwrap();
            zip.write_all(slide(&body(&[text])).as_bytes()).unwrap();
        }
        zip.start_file("ppt/presentation.xml", opts).unwrap();
        zip.write_all(b"<p:presentation/>").unwrap();
        zip.finish().unwrap();

        let src = crate::pipeline::input::resolve_source(&path).unwrap();
        let md = extract(&src).unwrap();
        assert_eq!(
            md,
            "<!-- Slide number: 1 -->\n\nfirst\n\n<!-- Slide number: 2 -->\n\nsecond\n\n<!-- Slide number: 3 -->\n\nlast"
        );
    }

    #[test]
    fn package_without_slides_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.pptx");
        let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
        zip.start_file("ppt/presentation.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<p:presentation/>").unwrap();
        zip.finish().unwrap();

        let src = crate::pipeline::input::resolve_source(&path).unwrap();
        let err = extract(&src).unwrap_err();
        assert!(matches!(err, ExtractError::Malformed { .. }), "{err:?}");
    }
}
