//! Conversion dispatch.
//!
//! A [`Converter`] maps a [`ConversionKind`] to its pipeline, reads exactly
//! one input file and writes exactly one output file into its working
//! directory.
//!
//! # Example
//!
//! ```no_run
//! use docshift::convert::{ConversionKind, Converter};
//!
//! fn main() -> docshift::Result<()> {
//!     let converter = Converter::new(std::env::temp_dir());
//!     let output = converter.convert(ConversionKind::PdfToExcel, "report.pdf")?;
//!     println!("{}", output.display());
//!     Ok(())
//! }
//! ```

mod kind;
mod pipeline;

pub use kind::{ConversionKind, TargetFormat};

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::parser::ExtractOptions;
use crate::render::Orientation;

/// Prefix of every file a converter writes.
pub const OUTPUT_PREFIX: &str = "docshift-";

/// Options for document conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertOptions {
    /// Page orientation of PDF output
    pub orientation: Orientation,

    /// Source reading options
    pub extract: ExtractOptions,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page orientation of PDF output.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set source reading options.
    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }
}

/// Runs conversions, writing results under a working directory.
#[derive(Debug, Clone)]
pub struct Converter {
    work_dir: PathBuf,
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter writing into `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            options: ConvertOptions::default(),
        }
    }

    /// Set conversion options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Directory output files are written to.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Conversion options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `input` and return the path of the written output.
    ///
    /// The output gets a unique name in the working directory, so concurrent
    /// conversions never clobber each other. Nothing is written on failure.
    pub fn convert<P: AsRef<Path>>(&self, kind: ConversionKind, input: P) -> Result<PathBuf> {
        let input = input.as_ref();
        let data = std::fs::read(input)?;
        let bytes = self.convert_bytes(kind, &data)?;
        let output = self.persist(kind.target(), &bytes)?;

        log::info!(
            "Converted {} ({}) -> {} ({} bytes)",
            input.display(),
            kind,
            output.display(),
            bytes.len()
        );
        Ok(output)
    }

    /// Convert with the kind given as a request string, e.g. `"pdf to excel"`.
    pub fn convert_str<P: AsRef<Path>>(&self, kind: &str, input: P) -> Result<PathBuf> {
        let kind: ConversionKind = kind.parse()?;
        self.convert(kind, input)
    }

    /// Convert an in-memory document and return the output bytes.
    ///
    /// Fails with [`Error::UnreadableSource`] if the input is not of the
    /// kind's source format and with [`Error::EmptyResult`] if there is
    /// nothing to write.
    pub fn convert_bytes(&self, kind: ConversionKind, data: &[u8]) -> Result<Vec<u8>> {
        let found = detect_format_from_bytes(data)?;
        if found != kind.source() {
            return Err(Error::UnreadableSource(format!(
                "{} expects a {} document, got {}",
                kind,
                kind.source(),
                found
            )));
        }
        pipeline::run(kind, data, &self.options)
    }

    fn persist(&self, target: TargetFormat, bytes: &[u8]) -> Result<PathBuf> {
        let suffix = format!(".{}", target.extension());
        let mut file = tempfile::Builder::new()
            .prefix(OUTPUT_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.work_dir)
            .map_err(|e| Error::Write(format!("{}: {}", self.work_dir.display(), e)))?;
        file.write_all(bytes)
            .map_err(|e| Error::Write(e.to_string()))?;

        let (_, path) = file.keep().map_err(|e| Error::Write(e.to_string()))?;
        Ok(path)
    }
}

/// Run a conversion on the blocking thread pool.
#[cfg(feature = "async")]
pub async fn convert_async(
    converter: Converter,
    kind: ConversionKind,
    input: PathBuf,
) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || converter.convert(kind, input))
        .await
        .map_err(|e| Error::Write(format!("conversion task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_orientation(Orientation::Landscape)
            .with_extract_options(ExtractOptions::new().lenient());

        assert_eq!(options.orientation, Orientation::Landscape);
        assert_eq!(options.extract, ExtractOptions::new().lenient());
    }

    #[test]
    fn test_unsupported_kind_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.pdf");
        std::fs::write(&input, b"%PDF-1.5").unwrap();

        let converter = Converter::new(dir.path());
        let err = converter.convert_str("foo to bar", &input).unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_wrong_source_format() {
        let converter = Converter::new(std::env::temp_dir());
        let err = converter
            .convert_bytes(ConversionKind::ExcelToPdf, b"%PDF-1.5\n")
            .unwrap_err();
        assert!(matches!(err, Error::UnreadableSource(_)));
    }

    #[test]
    fn test_persist_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let converter = Converter::new(dir.path());
        let a = converter.persist(TargetFormat::Pdf, b"a").unwrap();
        let b = converter.persist(TargetFormat::Pdf, b"b").unwrap();

        assert_ne!(a, b);
        assert!(a.file_name().unwrap().to_string_lossy().starts_with(OUTPUT_PREFIX));
        assert_eq!(a.extension().unwrap(), "pdf");
        assert_eq!(std::fs::read(b).unwrap(), b"b");
    }
}
