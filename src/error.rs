//! Error types for docshift.

use std::io;
use thiserror::Error;

/// Result type alias for docshift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during a conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input document is malformed or not of the expected format.
    #[error("Unreadable source document: {0}")]
    UnreadableSource(String),

    /// The PDF document is encrypted and cannot be read.
    #[error("Document is encrypted")]
    Encrypted,

    /// The requested conversion kind is not recognized.
    #[error("Unsupported conversion kind: {0:?}")]
    UnsupportedKind(String),

    /// The output document could not be produced or persisted.
    #[error("Failed to write output: {0}")]
    Write(String),

    /// The conversion found nothing to put into the output.
    #[error("No extractable content: {0}")]
    EmptyResult(String),

    /// Error serializing inspection output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Short machine-readable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::UnreadableSource(_) => "unreadable_source",
            Error::Encrypted => "encrypted",
            Error::UnsupportedKind(_) => "unsupported_kind",
            Error::Write(_) => "write",
            Error::EmptyResult(_) => "empty_result",
            Error::Json(_) => "json",
        }
    }

    /// Whether the error was caused by the request rather than the host.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::UnreadableSource(_)
                | Error::Encrypted
                | Error::UnsupportedKind(_)
                | Error::EmptyResult(_)
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::UnreadableSource(err.to_string()),
        }
    }
}

impl From<calamine::XlsxError> for Error {
    fn from(err: calamine::XlsxError) -> Self {
        match err {
            calamine::XlsxError::Io(e) => Error::Io(e),
            _ => Error::UnreadableSource(err.to_string()),
        }
    }
}

impl From<docx_rs::ReaderError> for Error {
    fn from(err: docx_rs::ReaderError) -> Self {
        Error::UnreadableSource(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::UnreadableSource(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedKind("foo to bar".into());
        assert_eq!(err.to_string(), "Unsupported conversion kind: \"foo to bar\"");

        let err = Error::EmptyResult("no tables found".into());
        assert_eq!(err.to_string(), "No extractable content: no tables found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::UnsupportedKind("x".into()).is_client_error());
        assert!(Error::EmptyResult("x".into()).is_client_error());
        assert!(Error::UnreadableSource("x".into()).is_client_error());
        assert!(!Error::Write("disk full".into()).is_client_error());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Error::Encrypted.kind(), "encrypted");
        assert_eq!(Error::Write("x".into()).kind(), "write");
    }
}
