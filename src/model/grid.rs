//! Rectangular cell grids and table normalization.

use super::{MergeRegion, Table};
use serde::{Deserialize, Serialize};

/// A rectangular grid of cell text.
///
/// Every row has exactly `columns` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedGrid {
    rows: Vec<Vec<String>>,
    columns: usize,

    /// Number of leading header rows
    pub header_rows: u8,
}

impl NormalizedGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from rows, right-padding short rows.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(columns, String::new());
                row
            })
            .collect();
        Self {
            rows,
            columns,
            header_rows: 0,
        }
    }

    /// Set the number of header rows and return self.
    pub fn with_header_rows(mut self, header_rows: u8) -> Self {
        self.header_rows = header_rows;
        self
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Check if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns == 0
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Header rows (clamped to the grid height).
    pub fn header(&self) -> &[Vec<String>] {
        let n = (self.header_rows as usize).min(self.rows.len());
        &self.rows[..n]
    }

    /// Body rows (everything after the header).
    pub fn body(&self) -> &[Vec<String>] {
        let n = (self.header_rows as usize).min(self.rows.len());
        &self.rows[n..]
    }

    /// Get a cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    /// Set a cell value. Out-of-range positions are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value.into();
        }
    }

    /// Keep the anchor value of a merged region and blank the covered cells.
    ///
    /// Parts of the region outside the grid are ignored.
    pub fn apply_merge(&mut self, region: &MergeRegion) {
        if region.first_row >= self.rows.len() || region.first_col >= self.columns {
            return;
        }

        let anchor = self.rows[region.first_row][region.first_col].clone();
        let last_row = region.last_row.min(self.rows.len() - 1);
        let last_col = region.last_col.min(self.columns - 1);

        for row in &mut self.rows[region.first_row..=last_row] {
            for cell in &mut row[region.first_col..=last_col] {
                cell.clear();
            }
        }
        self.rows[region.first_row][region.first_col] = anchor;
    }
}

/// Normalize a ragged table into a rectangular grid.
///
/// The column count is the longest row's length; short rows are padded with
/// empty strings. Merge regions keep their anchor value and blank the rest.
pub fn normalize(table: &Table) -> NormalizedGrid {
    let mut grid = NormalizedGrid::from_rows(table.rows.clone()).with_header_rows(table.header_rows);
    for region in &table.merges {
        grid.apply_merge(region);
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableLocation;

    #[test]
    fn test_normalize_pads_ragged_rows() {
        let mut table = Table::new(TableLocation::Body(1));
        table.add_row(["a"]);
        table.add_row(["b", "c", "d"]);
        table.add_row(Vec::<String>::new());

        let grid = normalize(&table);
        assert_eq!(grid.column_count(), 3);
        assert!(grid.rows().iter().all(|row| row.len() == 3));
        assert_eq!(grid.rows()[0], vec!["a", "", ""]);
        assert_eq!(grid.rows()[2], vec!["", "", ""]);
    }

    #[test]
    fn test_normalize_empty_table() {
        let grid = normalize(&Table::new(TableLocation::Page(1)));
        assert!(grid.is_empty());
        assert_eq!(grid.row_count(), 0);
    }

    #[test]
    fn test_merge_keeps_anchor_and_blanks_region() {
        let mut table = Table::new(TableLocation::Sheet("S".into()));
        table.add_row(["X", "x1", "z"]);
        table.add_row(["x2", "x3", "z"]);
        table.add_row(["y", "y", "y"]);
        table.add_merge(MergeRegion::new(0, 0, 1, 1));

        let grid = normalize(&table);
        assert_eq!(grid.get(0, 0), Some("X"));
        assert_eq!(grid.get(0, 1), Some(""));
        assert_eq!(grid.get(1, 0), Some(""));
        assert_eq!(grid.get(1, 1), Some(""));
        assert_eq!(grid.get(0, 2), Some("z"));
        assert_eq!(grid.get(2, 0), Some("y"));
    }

    #[test]
    fn test_merge_outside_grid_is_clamped() {
        let mut table = Table::new(TableLocation::Sheet("S".into()));
        table.add_row(["A", "B"]);
        table.add_merge(MergeRegion::new(0, 0, 5, 5));
        table.add_merge(MergeRegion::new(9, 9, 10, 10));

        let grid = normalize(&table);
        assert_eq!(grid.rows()[0], vec!["A", ""]);
    }

    #[test]
    fn test_header_and_body() {
        let grid = NormalizedGrid::from_rows(vec![
            vec!["h".into()],
            vec!["b1".into()],
            vec!["b2".into()],
        ])
        .with_header_rows(1);

        assert_eq!(grid.header().len(), 1);
        assert_eq!(grid.body().len(), 2);
    }
}
