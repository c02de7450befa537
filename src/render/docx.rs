//! Word-processor writer via `docx-rs`.

use std::io::Cursor;

use docx_rs::{
    Docx, Paragraph, Run, Style, StyleType, Table as DocxTable, TableBorders, TableCell, TableRow,
};

use crate::error::{Error, Result};
use crate::model::{FlowBlock, FlowDocument, NormalizedGrid};

/// Heading styles defined in every written document: (style id, name, half-point size).
const HEADING_STYLES: [(&str, &str, usize); 3] = [
    ("Heading1", "Heading 1", 32),
    ("Heading2", "Heading 2", 26),
    ("Heading3", "Heading 3", 24),
];

/// Serialize a flow document to DOCX bytes.
///
/// Headings use `HeadingN` paragraph styles so they read back as headings.
/// Tables get single-line borders on every edge; header rows are bold. A
/// grid without rows is written as one empty cell.
pub fn write_docx(doc: &FlowDocument) -> Result<Vec<u8>> {
    let mut docx = Docx::new().add_style(
        Style::new("Title", StyleType::Paragraph)
            .name("Title")
            .size(48)
            .bold(),
    );
    for (id, name, size) in HEADING_STYLES {
        docx = docx.add_style(Style::new(id, StyleType::Paragraph).name(name).size(size).bold());
    }

    for block in &doc.blocks {
        docx = match block {
            FlowBlock::Title(text) => docx.add_paragraph(text_paragraph(text).style("Title")),
            FlowBlock::Heading { text, level } => docx.add_paragraph(
                text_paragraph(text).style(&format!("Heading{}", (*level).min(3))),
            ),
            FlowBlock::Paragraph(text) => docx.add_paragraph(text_paragraph(text)),
            FlowBlock::Table(grid) => docx.add_table(grid_table(grid)),
        };
    }

    let mut out = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut out)
        .map_err(|e| Error::Write(format!("DOCX packaging failed: {}", e)))?;
    Ok(out.into_inner())
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn grid_table(grid: &NormalizedGrid) -> DocxTable {
    if grid.is_empty() {
        let row = TableRow::new(vec![TableCell::new().add_paragraph(Paragraph::new())]);
        return DocxTable::new(vec![row]).set_borders(TableBorders::new());
    }

    let header_rows = grid.header().len();
    let rows = grid
        .rows()
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let bold = r < header_rows;
            TableRow::new(row.iter().map(|value| cell(value, bold)).collect())
        })
        .collect();

    DocxTable::new(rows).set_borders(TableBorders::new())
}

/// One paragraph per line of the value.
fn cell(value: &str, bold: bool) -> TableCell {
    let mut cell = TableCell::new();
    for line in value.split('\n') {
        let mut run = Run::new().add_text(line);
        if bold {
            run = run.bold();
        }
        cell = cell.add_paragraph(Paragraph::new().add_run(run));
    }
    cell
}
