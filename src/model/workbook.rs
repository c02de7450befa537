//! Workbook types.

use super::{normalize, NormalizedGrid, Table, TableLocation};
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum sheet name length accepted by spreadsheet applications.
pub const MAX_SHEET_NAME_LEN: usize = 31;

static INVALID_SHEET_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\[\]:*?/\\]").unwrap());

/// A named worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name, unique within its workbook
    pub name: String,

    /// Sheet content
    pub grid: NormalizedGrid,
}

/// An ordered sequence of uniquely named sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a workbook with one sheet per table, named by location.
    pub fn from_tables<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Self {
        let mut workbook = Self::new();
        for table in tables {
            workbook.add_sheet(&sheet_name(&table.location), normalize(table));
        }
        workbook
    }

    /// Add a sheet and return the name it was stored under.
    ///
    /// The name is sanitized and suffixed (`_2`, `_3`, ...) if already taken.
    pub fn add_sheet(&mut self, name: &str, grid: NormalizedGrid) -> &str {
        let name = self.unique_name(name);
        self.sheets.push(Sheet { name, grid });
        &self.sheets[self.sheets.len() - 1].name
    }

    /// All sheets in insertion order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Sheet names in order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the workbook has no sheets.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Serialize the workbook to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    fn unique_name(&self, requested: &str) -> String {
        let base = sanitize_sheet_name(requested);
        let taken = |candidate: &str| {
            self.sheets
                .iter()
                .any(|s| s.name.eq_ignore_ascii_case(candidate))
        };

        if !taken(&base) {
            return base;
        }

        let mut n = 2;
        loop {
            let suffix = format!("_{}", n);
            let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.len());
            let candidate = format!("{}{}", truncate_chars(&base, keep), suffix);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Positional sheet naming: `Page_{n}` for PDF pages, `Table_{n}` for
/// document tables, `Table_Slide_{n}` for slides, the sheet's own name for
/// spreadsheet sources.
pub fn sheet_name(location: &TableLocation) -> String {
    match location {
        TableLocation::Page(n) => format!("Page_{}", n),
        TableLocation::Body(n) => format!("Table_{}", n),
        TableLocation::Slide(n) => format!("Table_Slide_{}", n),
        TableLocation::Sheet(name) => name.clone(),
    }
}

/// Strip characters spreadsheet applications reject and clamp the length.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned = INVALID_SHEET_CHARS.replace_all(name, "");
    let cleaned = cleaned.trim().trim_matches('\'');
    if cleaned.is_empty() {
        return "Sheet".to_string();
    }
    truncate_chars(cleaned, MAX_SHEET_NAME_LEN)
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_at(location: TableLocation) -> Table {
        let mut table = Table::with_header(location);
        table.add_row(["a", "b"]);
        table.add_row(["1", "2"]);
        table
    }

    #[test]
    fn test_from_tables_names_in_order() {
        let tables = vec![
            table_at(TableLocation::Page(1)),
            table_at(TableLocation::Page(3)),
            table_at(TableLocation::Page(4)),
        ];
        let workbook = Workbook::from_tables(&tables);

        assert_eq!(workbook.sheet_count(), 3);
        assert_eq!(workbook.sheet_names(), vec!["Page_1", "Page_3", "Page_4"]);
    }

    #[test]
    fn test_from_no_tables_is_empty() {
        let workbook = Workbook::from_tables(Vec::<Table>::new().iter());
        assert!(workbook.is_empty());
    }

    #[test]
    fn test_duplicate_slide_names_are_suffixed() {
        let tables = vec![
            table_at(TableLocation::Slide(2)),
            table_at(TableLocation::Slide(2)),
            table_at(TableLocation::Slide(2)),
        ];
        let workbook = Workbook::from_tables(&tables);
        assert_eq!(
            workbook.sheet_names(),
            vec!["Table_Slide_2", "Table_Slide_2_2", "Table_Slide_2_3"]
        );
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("Q1/Q2 [draft]"), "Q1Q2 draft");
        assert_eq!(sanitize_sheet_name("???"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_to_json() {
        let workbook = Workbook::from_tables(&[table_at(TableLocation::Body(1))]);
        let json = workbook.to_json(false).unwrap();
        assert!(json.contains("\"Table_1\""));
    }
}
