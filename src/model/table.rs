//! Table types.

use serde::{Deserialize, Serialize};

/// Where in the source document a table was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum TableLocation {
    /// PDF page (1-indexed)
    Page(u32),
    /// N-th table in a word-processor body (1-indexed)
    Body(usize),
    /// Presentation slide (1-indexed)
    Slide(usize),
    /// Spreadsheet worksheet
    Sheet(String),
}

/// A rectangular block of cells that logically holds one value.
///
/// Coordinates are 0-indexed and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRegion {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

impl MergeRegion {
    /// Create a merge region from its corners, in any order.
    pub fn new(first_row: usize, first_col: usize, last_row: usize, last_col: usize) -> Self {
        Self {
            first_row: first_row.min(last_row),
            first_col: first_col.min(last_col),
            last_row: first_row.max(last_row),
            last_col: first_col.max(last_col),
        }
    }

    /// Whether the cell at (row, col) lies inside the region.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    /// Whether (row, col) is the top-left cell of the region.
    pub fn is_anchor(&self, row: usize, col: usize) -> bool {
        row == self.first_row && col == self.first_col
    }

    /// Number of rows spanned.
    pub fn row_span(&self) -> usize {
        self.last_row - self.first_row + 1
    }

    /// Number of columns spanned.
    pub fn col_span(&self) -> usize {
        self.last_col - self.first_col + 1
    }
}

/// A table as read from a source document.
///
/// Rows may have unequal lengths until the table is normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Where the table came from
    pub location: TableLocation,

    /// Cell text, row by row
    pub rows: Vec<Vec<String>>,

    /// Number of header rows (0 = no header)
    pub header_rows: u8,

    /// Merged cell regions reported by the source
    pub merges: Vec<MergeRegion>,
}

impl Table {
    /// Create a new empty table.
    pub fn new(location: TableLocation) -> Self {
        Self {
            location,
            rows: Vec::new(),
            header_rows: 0,
            merges: Vec::new(),
        }
    }

    /// Create a table whose first row is a header.
    pub fn with_header(location: TableLocation) -> Self {
        Self {
            header_rows: 1,
            ..Self::new(location)
        }
    }

    /// Add a row of cell values.
    pub fn add_row<S: Into<String>>(&mut self, values: impl IntoIterator<Item = S>) {
        self.rows.push(values.into_iter().map(Into::into).collect());
    }

    /// Record a merged region.
    pub fn add_merge(&mut self, region: MergeRegion) {
        self.merges.push(region);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .all(|cell| cell.trim().is_empty())
    }

    /// Check whether rows have unequal lengths.
    pub fn is_ragged(&self) -> bool {
        let width = self.column_count();
        self.rows.iter().any(|row| row.len() != width)
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = Table::new(TableLocation::Page(1));
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_table_with_data() {
        let mut table = Table::with_header(TableLocation::Body(1));
        table.add_row(["Name", "Age"]);
        table.add_row(["Alice", "30"]);
        table.add_row(["Bob"]);

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.header_rows, 1);
        assert!(table.is_ragged());
        assert_eq!(table.plain_text(), "Name\tAge\nAlice\t30\nBob");
    }

    #[test]
    fn test_merge_region_geometry() {
        let region = MergeRegion::new(2, 3, 1, 1);
        assert_eq!(region.first_row, 1);
        assert_eq!(region.first_col, 1);
        assert_eq!(region.row_span(), 2);
        assert_eq!(region.col_span(), 3);
        assert!(region.contains(2, 3));
        assert!(!region.contains(0, 1));
        assert!(region.is_anchor(1, 1));
        assert!(!region.is_anchor(2, 2));
    }

    #[test]
    fn test_blank_table() {
        let mut table = Table::new(TableLocation::Slide(1));
        table.add_row(["", "  "]);
        assert!(table.is_blank());
    }
}
