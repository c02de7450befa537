//! One function per conversion kind, from input bytes to output bytes.

use super::{ConversionKind, ConvertOptions};
use crate::error::{Error, Result};
use crate::model::{normalize, sheet_name, FlowBlock, FlowDocument, Table, Workbook};
use crate::parser::{xlsx, DocxReader, PdfReader, PptxReader};
use crate::render::{render_pdf, write_docx, write_xlsx, LayoutOptions};

/// Run the pipeline for `kind` over an input already known to be of its source format.
pub(crate) fn run(kind: ConversionKind, data: &[u8], options: &ConvertOptions) -> Result<Vec<u8>> {
    match kind {
        ConversionKind::PdfToExcel => {
            let tables = PdfReader::from_bytes(data)?.tables(&options.extract)?;
            tables_to_xlsx(&tables, "PDF")
        }
        ConversionKind::DocxToExcel => {
            let tables = DocxReader::from_bytes(data)?.tables(&options.extract);
            tables_to_xlsx(&tables, "document")
        }
        ConversionKind::PptToExcel => {
            let tables = PptxReader::from_bytes(data)?.tables(&options.extract)?;
            tables_to_xlsx(&tables, "presentation")
        }
        ConversionKind::ExcelToPdf => excel_to_pdf(data, options),
        ConversionKind::ExcelToDocx => excel_to_docx(data, options),
        ConversionKind::DocxToPdf => {
            let flow = DocxReader::from_bytes(data)?.flow(&options.extract);
            log::debug!("DOCX flow: {} blocks, {} tables", flow.len(), flow.table_count());
            let layout = LayoutOptions::document().with_orientation(options.orientation);
            render_pdf(&flow, &layout)
        }
    }
}

fn tables_to_xlsx(tables: &[Table], source: &str) -> Result<Vec<u8>> {
    if tables.is_empty() {
        return Err(Error::EmptyResult(format!("no tables found in {}", source)));
    }
    let workbook = Workbook::from_tables(tables);
    log::debug!("Workbook sheets: {:?}", workbook.sheet_names());
    write_xlsx(&workbook)
}

fn excel_to_pdf(data: &[u8], options: &ConvertOptions) -> Result<Vec<u8>> {
    let tables = xlsx::read_sheets_from_bytes(data, &options.extract)?;

    let mut flow = FlowDocument::new();
    for table in &tables {
        if table.is_blank() {
            log::warn!("Skipping empty sheet {:?}", sheet_name(&table.location));
            continue;
        }
        flow.push(FlowBlock::Title(sheet_name(&table.location)));
        flow.push(FlowBlock::Table(normalize(table)));
    }
    if flow.is_empty() {
        return Err(Error::EmptyResult("workbook has no data".into()));
    }

    let layout = LayoutOptions::sheet_report().with_orientation(options.orientation);
    render_pdf(&flow, &layout)
}

fn excel_to_docx(data: &[u8], options: &ConvertOptions) -> Result<Vec<u8>> {
    let tables = xlsx::read_sheets_from_bytes(data, &options.extract)?;
    if tables.is_empty() {
        return Err(Error::EmptyResult("workbook has no sheets".into()));
    }
    let workbook = Workbook::from_tables(&tables);
    write_docx(&FlowDocument::from_workbook(&workbook))
}
