//! Source format detection and validation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Document formats docshift can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Portable Document Format
    Pdf,
    /// Word-processor document (Office Open XML)
    Docx,
    /// Presentation (Office Open XML)
    Pptx,
    /// Spreadsheet workbook (Office Open XML)
    Xlsx,
}

impl SourceFormat {
    /// Human-readable name of the format.
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Pdf => "PDF",
            SourceFormat::Docx => "DOCX",
            SourceFormat::Pptx => "PPTX",
            SourceFormat::Xlsx => "XLSX",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
/// Local file header of a ZIP container.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Main part of each Office Open XML package.
const OOXML_MAIN_PARTS: &[(&str, SourceFormat)] = &[
    ("word/document.xml", SourceFormat::Docx),
    ("ppt/presentation.xml", SourceFormat::Pptx),
    ("xl/workbook.xml", SourceFormat::Xlsx),
];

/// Detect the source format of a file.
///
/// # Example
/// ```no_run
/// use docshift::detect::{detect_format_from_path, SourceFormat};
///
/// let format = detect_format_from_path("report.pdf").unwrap();
/// assert_eq!(format, SourceFormat::Pdf);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 8];
    let read = reader.read(&mut header)?;
    let header = &header[..read];

    if header.starts_with(PDF_MAGIC) {
        return Ok(SourceFormat::Pdf);
    }
    if header.starts_with(ZIP_MAGIC) {
        reader.rewind()?;
        return detect_package(reader);
    }

    Err(Error::UnreadableSource(
        "not a PDF or Office Open XML document".into(),
    ))
}

/// Detect the source format from in-memory bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SourceFormat> {
    if data.starts_with(PDF_MAGIC) {
        return Ok(SourceFormat::Pdf);
    }
    if data.starts_with(ZIP_MAGIC) {
        return detect_package(Cursor::new(data));
    }

    Err(Error::UnreadableSource(
        "not a PDF or Office Open XML document".into(),
    ))
}

fn detect_package<R: Read + Seek>(reader: R) -> Result<SourceFormat> {
    let archive = ZipArchive::new(reader)?;
    let names: Vec<&str> = archive.file_names().collect();

    OOXML_MAIN_PARTS
        .iter()
        .find(|(part, _)| names.contains(part))
        .map(|(_, format)| *format)
        .ok_or_else(|| {
            Error::UnreadableSource("ZIP container is not a DOCX, PPTX or XLSX package".into())
        })
}
