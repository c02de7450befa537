//! Word-processor reading via `docx-rs`.

use std::path::Path;

use super::clean_text;
use super::options::ExtractOptions;
use crate::error::Result;
use crate::model::{normalize, FlowBlock, FlowDocument, Table, TableLocation};

/// A parsed DOCX body.
pub struct DocxReader {
    docx: docx_rs::Docx,
}

impl DocxReader {
    /// Open a DOCX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse a DOCX package held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let docx = docx_rs::read_docx(data)?;
        Ok(Self { docx })
    }

    /// Every top-level table in document order, located as `Body(n)`.
    pub fn tables(&self, options: &ExtractOptions) -> Vec<Table> {
        let mut tables = Vec::new();
        for child in &self.docx.document.children {
            if let docx_rs::DocumentChild::Table(table) = child {
                let location = TableLocation::Body(tables.len() + 1);
                tables.push(read_table(table, location, options));
            }
        }
        log::debug!("DOCX: {} tables", tables.len());
        tables
    }

    /// Paragraphs, headings and tables in document order.
    ///
    /// Empty paragraphs and tables without rows are dropped.
    pub fn flow(&self, options: &ExtractOptions) -> FlowDocument {
        let mut flow = FlowDocument::new();
        let mut table_count = 0;

        for child in &self.docx.document.children {
            match child {
                docx_rs::DocumentChild::Paragraph(para) => {
                    let text = clean_text(&paragraph_text(para));
                    if text.is_empty() {
                        continue;
                    }
                    let block = match paragraph_style(para) {
                        ParagraphStyle::Title => FlowBlock::Title(text),
                        ParagraphStyle::Heading(level) => FlowBlock::heading(text, level),
                        ParagraphStyle::Body => FlowBlock::Paragraph(text),
                    };
                    flow.push(block);
                }
                docx_rs::DocumentChild::Table(table) => {
                    table_count += 1;
                    let table = read_table(table, TableLocation::Body(table_count), options);
                    if table.is_empty() {
                        continue;
                    }
                    flow.push(FlowBlock::Table(normalize(&table)));
                }
                _ => {}
            }
        }

        flow
    }
}

enum ParagraphStyle {
    Title,
    Heading(u8),
    Body,
}

fn paragraph_style(para: &docx_rs::Paragraph) -> ParagraphStyle {
    let Some(style) = &para.property.style else {
        return ParagraphStyle::Body;
    };
    let val = style.val.as_str();

    if val.eq_ignore_ascii_case("title") {
        return ParagraphStyle::Title;
    }
    match (val.get(..7), val.get(7..)) {
        (Some(prefix), Some(rest)) if prefix.eq_ignore_ascii_case("heading") => {
            ParagraphStyle::Heading(rest.trim().parse().unwrap_or(1))
        }
        _ => ParagraphStyle::Body,
    }
}

fn read_table(table: &docx_rs::Table, location: TableLocation, options: &ExtractOptions) -> Table {
    let mut result = Table::new(location);
    result.header_rows = options.header.header_rows();

    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;
        let cells = row.cells.iter().map(|row_child| {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            cell_text(cell)
        });
        result.add_row(cells);
    }

    result
}

/// Cell paragraphs joined by newlines.
fn cell_text(cell: &docx_rs::TableCell) -> String {
    let paragraphs: Vec<String> = cell
        .children
        .iter()
        .filter_map(|content| match content {
            docx_rs::TableCellContent::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();
    clean_text(&paragraphs.join("\n"))
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();

    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run_text(&mut text, run),
            docx_rs::ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let docx_rs::InsertChild::Run(run) = child {
                        push_run_text(&mut text, run);
                    }
                }
            }
            // Deletions (tracked changes) are not part of the visible text.
            _ => {}
        }
    }

    text
}

fn push_run_text(text: &mut String, run: &docx_rs::Run) {
    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(t) => text.push_str(&t.text),
            docx_rs::RunChild::Tab(_) => text.push('\t'),
            docx_rs::RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}
