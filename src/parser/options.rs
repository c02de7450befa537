//! Extraction options and configuration.

use super::table_detector::TableDetectorConfig;

/// Options for reading tables out of source documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether the first row of each table is a header
    pub header: HeaderPolicy,

    /// PDF table detector tuning
    pub detector: TableDetectorConfig,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip unreadable pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the header policy.
    pub fn with_header(mut self, header: HeaderPolicy) -> Self {
        self.header = header;
        self
    }

    /// Set the PDF table detector configuration.
    pub fn with_detector(mut self, detector: TableDetectorConfig) -> Self {
        self.detector = detector;
        self
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid content and continue
    Lenient,
}

/// How the leading row of an extracted table is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderPolicy {
    /// The first row holds column labels
    #[default]
    FirstRow,
    /// Every row is data
    None,
}

impl HeaderPolicy {
    /// Number of header rows under this policy.
    pub fn header_rows(self) -> u8 {
        match self {
            HeaderPolicy::FirstRow => 1,
            HeaderPolicy::None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new().lenient().with_header(HeaderPolicy::None);

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.header.header_rows(), 0);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.header, HeaderPolicy::FirstRow);
        assert_eq!(options.detector.min_columns, 2);
    }
}
