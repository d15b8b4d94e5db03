//! GitHub-flavoured Markdown table rendering shared by the Office extractors.

/// Render `rows` as a GFM table; the first row becomes the header.
///
/// Short rows are padded with empty cells, pipes are escaped and line breaks
/// inside a cell become `<br>` so every row stays on one line. Returns an
/// empty string when there are no rows.
pub fn markdown_table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let render_row = |row: &[String]| -> String {
        let mut line = String::from("|");
        for i in 0..width {
            let cell = row.get(i).map(|c| escape_cell(c)).unwrap_or_default();
            line.push(' ');
            line.push_str(&cell);
            line.push_str(" |");
        }
        line
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_row(&rows[0]));
    lines.push(format!("|{}", " --- |".repeat(width)));
    for row in &rows[1..] {
        lines.push(render_row(row));
    }
    lines.join("\n")
}

fn escape_cell(cell: &str) -> String {
    cell.trim()
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn renders_header_separator_and_body() {
        let rows = vec![row(&["Name", "Qty"]), row(&["apple", "3"])];
        assert_eq!(
            markdown_table(&rows),
            "| Name | Qty |\n| --- | --- |\n| apple | 3 |"
        );
    }

    #[test]
    fn pads_ragged_rows() {
        let rows = vec![row(&["a"]), row(&["b", "c"])];
        assert_eq!(markdown_table(&rows), "| a |  |\n| --- | --- |\n| b | c |");
    }

    #[test]
    fn escapes_pipes_and_newlines() {
        let rows = vec![row(&["x|y", "line1\nline2"])];
        assert_eq!(
            markdown_table(&rows),
            "| x\\|y | line1<br>line2 |\n| --- | --- |"
        );
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(markdown_table(&[]), "");
        assert_eq!(markdown_table(&[vec![]]), "");
    }
}
