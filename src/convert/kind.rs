//! The closed set of supported conversions.

use std::fmt;
use std::str::FromStr;

use crate::detect::SourceFormat;
use crate::error::Error;

/// A supported conversion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    /// One sheet per page holding a table
    PdfToExcel,
    /// One sheet per document table
    DocxToExcel,
    /// One sheet per slide table
    PptToExcel,
    /// Every sheet as a titled grid in a PDF report
    ExcelToPdf,
    /// Every sheet as a headed grid in a word-processor document
    ExcelToDocx,
    /// Paragraphs and tables of a word-processor document, paginated
    DocxToPdf,
}

/// Output document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    Xlsx,
    Pdf,
    Docx,
}

impl TargetFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Xlsx => "xlsx",
            TargetFormat::Pdf => "pdf",
            TargetFormat::Docx => "docx",
        }
    }

    /// MIME type of the produced file.
    pub fn mime_type(self) -> &'static str {
        match self {
            TargetFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            TargetFormat::Pdf => "application/pdf",
            TargetFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl ConversionKind {
    /// Every kind, in display order.
    pub const ALL: [ConversionKind; 6] = [
        ConversionKind::PdfToExcel,
        ConversionKind::DocxToExcel,
        ConversionKind::PptToExcel,
        ConversionKind::ExcelToPdf,
        ConversionKind::ExcelToDocx,
        ConversionKind::DocxToPdf,
    ];

    /// Canonical request string.
    pub fn as_str(self) -> &'static str {
        self.names()[0]
    }

    /// Every accepted request string, canonical first.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            ConversionKind::PdfToExcel => &["pdf to excel"],
            ConversionKind::DocxToExcel => &["docx to excel", "docs to excel"],
            ConversionKind::PptToExcel => &["ppt to excel", "pptx to excel"],
            ConversionKind::ExcelToPdf => &["excel to pdf"],
            ConversionKind::ExcelToDocx => &["excel to docx"],
            ConversionKind::DocxToPdf => &["docx to pdf"],
        }
    }

    /// Format the input must have.
    pub fn source(self) -> SourceFormat {
        match self {
            ConversionKind::PdfToExcel => SourceFormat::Pdf,
            ConversionKind::DocxToExcel | ConversionKind::DocxToPdf => SourceFormat::Docx,
            ConversionKind::PptToExcel => SourceFormat::Pptx,
            ConversionKind::ExcelToPdf | ConversionKind::ExcelToDocx => SourceFormat::Xlsx,
        }
    }

    /// Format of the produced file.
    pub fn target(self) -> TargetFormat {
        match self {
            ConversionKind::PdfToExcel
            | ConversionKind::DocxToExcel
            | ConversionKind::PptToExcel => TargetFormat::Xlsx,
            ConversionKind::ExcelToPdf | ConversionKind::DocxToPdf => TargetFormat::Pdf,
            ConversionKind::ExcelToDocx => TargetFormat::Docx,
        }
    }
}

impl FromStr for ConversionKind {
    type Err = Error;

    /// Case-insensitive; runs of whitespace count as one space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        ConversionKind::ALL
            .into_iter()
            .find(|kind| kind.names().contains(&normalized.as_str()))
            .ok_or_else(|| Error::UnsupportedKind(s.to_string()))
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(
            "pdf to excel".parse::<ConversionKind>().unwrap(),
            ConversionKind::PdfToExcel
        );
        assert_eq!(
            "  Docs   TO excel ".parse::<ConversionKind>().unwrap(),
            ConversionKind::DocxToExcel
        );
        assert_eq!(
            "PPTX to Excel".parse::<ConversionKind>().unwrap(),
            ConversionKind::PptToExcel
        );
    }

    #[test]
    fn test_unknown_kind() {
        let err = "foo to bar".parse::<ConversionKind>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind(ref s) if s == "foo to bar"));
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for kind in ConversionKind::ALL {
            assert_eq!(kind.as_str().parse::<ConversionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_formats() {
        assert_eq!(ConversionKind::ExcelToPdf.source(), SourceFormat::Xlsx);
        assert_eq!(ConversionKind::ExcelToPdf.target().extension(), "pdf");
        assert_eq!(ConversionKind::PptToExcel.source(), SourceFormat::Pptx);
        assert_eq!(
            ConversionKind::DocxToExcel.target().mime_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }
}
