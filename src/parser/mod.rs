//! Source document readers.
//!
//! Each reader turns one source format into [`Table`]s (and, for DOCX, a
//! [`FlowDocument`](crate::model::FlowDocument)). Readers only read; they never write files.

pub mod docx;
mod options;
pub mod pdf;
pub mod pptx;
pub mod table_detector;
pub mod xlsx;

use std::path::Path;

use unicode_normalization::UnicodeNormalization;

use crate::detect::SourceFormat;
use crate::error::Result;
use crate::model::Table;

pub use docx::DocxReader;
pub use options::{ErrorMode, ExtractOptions, HeaderPolicy};
pub use pdf::{PdfReader, TextSpan};
pub use pptx::PptxReader;
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig, TableRowData};

/// Extract the tables of a source document, in document order.
///
/// - PDF: at most one table per page, located as `Page(n)`
/// - DOCX: every top-level table, located as `Body(n)`
/// - PPTX: every table shape on every slide, located as `Slide(n)`
/// - XLSX: every worksheet, located as `Sheet(name)`, merges included
///
/// Finding no tables is not an error; the result is simply empty.
pub fn extract<P: AsRef<Path>>(
    path: P,
    format: SourceFormat,
    options: &ExtractOptions,
) -> Result<Vec<Table>> {
    let path = path.as_ref();
    log::debug!("Extracting tables from {} as {}", path.display(), format);

    match format {
        SourceFormat::Pdf => PdfReader::open(path)?.tables(options),
        SourceFormat::Docx => Ok(DocxReader::open(path)?.tables(options)),
        SourceFormat::Pptx => PptxReader::open(path)?.tables(options),
        SourceFormat::Xlsx => xlsx::read_sheets(path, options),
    }
}

/// NFC-normalize, turn non-breaking spaces into spaces, trim.
pub(crate) fn clean_text(text: &str) -> String {
    text.nfc()
        .map(|c| if c == '\u{00A0}' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}
