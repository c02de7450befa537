//! # docshift
//!
//! Table-preserving document conversion between PDF, DOCX, PPTX and XLSX.
//!
//! Tables are read out of one format, normalized into rectangular grids and
//! written back out as spreadsheets, word-processor documents or paginated
//! PDF reports.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docshift::{ConversionKind, Converter};
//!
//! fn main() -> docshift::Result<()> {
//!     let converter = Converter::new("/tmp/docshift");
//!     let xlsx = converter.convert(ConversionKind::PdfToExcel, "invoice.pdf")?;
//!     println!("Wrote {}", xlsx.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Conversions
//!
//! - **PDF to Excel**: one sheet per page holding a table (`Page_1`, ...)
//! - **DOCX to Excel**: one sheet per document table (`Table_1`, ...)
//! - **PPT to Excel**: one sheet per slide table (`Table_Slide_1`, ...)
//! - **Excel to PDF**: every sheet as a titled, paginated grid
//! - **Excel to DOCX**: every sheet as a heading and a bordered table
//! - **DOCX to PDF**: paragraphs, headings and tables, paginated

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
#[cfg(feature = "async")]
pub use convert::convert_async;
pub use convert::{ConversionKind, ConvertOptions, Converter, TargetFormat};
pub use detect::{detect_format_from_bytes, detect_format_from_path, SourceFormat};
pub use error::{Error, Result};
pub use model::{
    normalize, FlowBlock, FlowDocument, MergeRegion, NormalizedGrid, Table, TableLocation,
    Workbook,
};
pub use parser::{ErrorMode, ExtractOptions, HeaderPolicy};
pub use render::{LayoutOptions, Orientation};

use std::path::Path;

/// Extract the tables of a document without writing anything.
///
/// The result is a workbook with one normalized sheet per table, named the
/// way a conversion to Excel would name them.
///
/// # Example
///
/// ```no_run
/// use docshift::{extract_tables, SourceFormat};
///
/// let workbook = extract_tables("slides.pptx", SourceFormat::Pptx).unwrap();
/// println!("{}", workbook.to_json(true).unwrap());
/// ```
pub fn extract_tables<P: AsRef<Path>>(path: P, format: SourceFormat) -> Result<Workbook> {
    extract_tables_with_options(path, format, &ExtractOptions::default())
}

/// Extract tables with custom reading options.
pub fn extract_tables_with_options<P: AsRef<Path>>(
    path: P,
    format: SourceFormat,
    options: &ExtractOptions,
) -> Result<Workbook> {
    let tables = parser::extract(path, format, options)?;
    Ok(Workbook::from_tables(&tables))
}

/// Detect the format of a document and extract its tables.
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<(SourceFormat, Workbook)> {
    let path = path.as_ref();
    let format = detect_format_from_path(path)?;
    let workbook = extract_tables(path, format)?;
    Ok((format, workbook))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_missing_file() {
        let err = extract_tables("does-not-exist.pdf", SourceFormat::Pdf).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_inspect_rejects_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();
        assert!(matches!(
            inspect(&path).unwrap_err(),
            Error::UnreadableSource(_)
        ));
    }
}
