//! Document model types.
//!
//! This module defines the intermediate representation shared by the
//! source readers and the output writers: ragged tables as extracted,
//! rectangular grids after normalization, workbooks of named sheets and
//! flow documents of headings, paragraphs and tables.

mod flow;
mod grid;
mod table;
mod workbook;

pub use flow::{FlowBlock, FlowDocument};
pub use grid::{normalize, NormalizedGrid};
pub use table::{MergeRegion, Table, TableLocation};
pub use workbook::{sanitize_sheet_name, sheet_name, Sheet, Workbook, MAX_SHEET_NAME_LEN};
