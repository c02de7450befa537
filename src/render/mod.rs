//! Output writers: spreadsheet, word-processor and paginated PDF.

mod docx;
pub mod layout;
pub mod metrics;
mod options;
mod pdf;
mod xlsx;

pub use docx::write_docx;
pub use layout::{measure_block, render, DrawOp, Page, PageLayoutState, Stroke};
pub use metrics::Font;
pub use options::{
    Color, LayoutOptions, Margins, Orientation, Padding, PageSize, Spacing, TableStyle,
};
pub use pdf::write_pdf;
pub use xlsx::{column_name, write_xlsx};

use crate::error::{Error, Result};
use crate::model::FlowDocument;

/// Lay a flow document out and serialize it as PDF.
///
/// A document with no blocks fails with [`Error::EmptyResult`] instead of
/// producing an empty file.
pub fn render_pdf(doc: &FlowDocument, options: &LayoutOptions) -> Result<Vec<u8>> {
    let pages = render(doc, options);
    if pages.is_empty() {
        return Err(Error::EmptyResult("document has no content blocks".into()));
    }
    write_pdf(&pages)
}
