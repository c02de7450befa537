//! Spreadsheet reading via `calamine`, merge regions included.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook, Data, Dimensions, Range, Reader, Xlsx};

use super::clean_text;
use super::options::ExtractOptions;
use crate::error::Result;
use crate::model::{MergeRegion, Table, TableLocation};

/// Read every worksheet of an XLSX file, in workbook order.
pub fn read_sheets<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Vec<Table>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    sheets_from(&mut workbook, options)
}

/// Read every worksheet of an XLSX package held in memory.
pub fn read_sheets_from_bytes(data: &[u8], options: &ExtractOptions) -> Result<Vec<Table>> {
    let mut workbook = Xlsx::new(Cursor::new(data))?;
    sheets_from(&mut workbook, options)
}

fn sheets_from<RS: Read + Seek>(
    workbook: &mut Xlsx<RS>,
    options: &ExtractOptions,
) -> Result<Vec<Table>> {
    workbook.load_merged_regions()?;

    let mut tables = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let merges = workbook
            .worksheet_merge_cells(&name)
            .unwrap_or(Ok(Vec::new()))?;

        let mut table = sheet_table(&range, &merges, TableLocation::Sheet(name.clone()));
        table.header_rows = options.header.header_rows();
        log::debug!(
            "Sheet {:?}: {} rows, {} merged regions",
            name,
            table.row_count(),
            table.merges.len()
        );
        tables.push(table);
    }

    Ok(tables)
}

/// Lay a worksheet range out on an absolute grid anchored at A1.
///
/// calamine trims leading empty rows and columns from the range while merge
/// regions stay in sheet coordinates, so the gap is padded back.
fn sheet_table(range: &Range<Data>, merges: &[Dimensions], location: TableLocation) -> Table {
    let mut table = Table::new(location);
    let Some((first_row, first_col)) = range.start() else {
        return table;
    };

    for _ in 0..first_row {
        table.add_row(Vec::<String>::new());
    }
    for row in range.rows() {
        let leading = std::iter::repeat(String::new()).take(first_col as usize);
        table.add_row(leading.chain(row.iter().map(cell_text)));
    }

    for region in merges {
        table.add_merge(MergeRegion::new(
            region.start.0 as usize,
            region.start.1 as usize,
            region.end.0 as usize,
            region.end.1 as usize,
        ));
    }

    table
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => clean_text(s),
        other => other.to_string(),
    }
}
