//! SpreadsheetML writer.
//!
//! Produces a minimal XLSX package: one worksheet per sheet, every value as
//! an inline string, header rows in bold.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{Error, Result};
use crate::model::{NormalizedGrid, Workbook};

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Style index of the bold header cell format in `styles.xml`.
const HEADER_STYLE: u32 = 1;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font><font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

/// Serialize a workbook to XLSX bytes.
///
/// A workbook without sheets still needs one to be a valid package, so an
/// empty `Sheet1` is written in that case.
pub fn write_xlsx(workbook: &Workbook) -> Result<Vec<u8>> {
    let placeholder = [("Sheet1", NormalizedGrid::new())];
    let sheets: Vec<(&str, &NormalizedGrid)> = if workbook.is_empty() {
        placeholder.iter().map(|(name, grid)| (*name, grid)).collect()
    } else {
        workbook
            .sheets()
            .iter()
            .map(|sheet| (sheet.name.as_str(), &sheet.grid))
            .collect()
    };

    let mut package = Package::new();
    package.add("[Content_Types].xml", &content_types_xml(sheets.len()))?;
    package.add("_rels/.rels", ROOT_RELS_XML)?;
    package.add("xl/workbook.xml", &workbook_xml(&sheets))?;
    package.add("xl/_rels/workbook.xml.rels", &workbook_rels_xml(sheets.len()))?;
    package.add("xl/styles.xml", STYLES_XML)?;
    for (i, (name, grid)) in sheets.iter().enumerate() {
        log::debug!("Writing sheet {:?} ({} rows)", name, grid.row_count());
        package.add(
            &format!("xl/worksheets/sheet{}.xml", i + 1),
            &worksheet_xml(grid),
        )?;
    }
    package.finish()
}

/// A ZIP package with fixed timestamps, so equal input gives equal bytes.
struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl Package {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(DateTime::default()),
        }
    }

    fn add(&mut self, name: &str, content: &str) -> Result<()> {
        self.zip
            .start_file(name, self.options)
            .map_err(|e| Error::Write(format!("{}: {}", name, e)))?;
        self.zip
            .write_all(content.as_bytes())
            .map_err(|e| Error::Write(format!("{}: {}", name, e)))
    }

    fn finish(self) -> Result<Vec<u8>> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| Error::Write(format!("XLSX package: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn workbook_xml(sheets: &[(&str, &NormalizedGrid)]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(
        r#"<workbook xmlns="{}" xmlns:r="{}"><sheets>"#,
        SPREADSHEET_NS, RELATIONSHIPS_NS
    ));
    for (i, (name, _)) in sheets.iter().enumerate() {
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(&xml_safe(name)),
            i + 1,
            i + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i, i
        ));
    }
    xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    ));
    xml.push_str("</Relationships>");
    xml
}

fn worksheet_xml(grid: &NormalizedGrid) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(r#"<worksheet xmlns="{}"><sheetData>"#, SPREADSHEET_NS));

    let header_rows = grid.header().len();
    for (r, row) in grid.rows().iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let style = if r < header_rows {
                format!(r#" s="{}""#, HEADER_STYLE)
            } else {
                String::new()
            };
            xml.push_str(&format!(
                r#"<c r="{}{}" t="inlineStr"{}><is><t xml:space="preserve">{}</t></is></c>"#,
                column_name(c),
                r + 1,
                style,
                escape(&xml_safe(value))
            ));
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Spreadsheet column letters for a 0-based index: 0 -> A, 26 -> AA.
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Drop control characters XML 1.0 cannot carry.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};

    fn grid(rows: &[&[&str]]) -> NormalizedGrid {
        NormalizedGrid::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .with_header_rows(1)
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("Page_1", grid(&[&["Name", "Note"], &["Ada", "a < b & c"]]));
        workbook.add_sheet("Page_2", grid(&[&["Only"]]));

        let bytes = write_xlsx(&workbook).unwrap();
        let mut xlsx = Xlsx::new(Cursor::new(bytes)).unwrap();
        assert_eq!(xlsx.sheet_names(), vec!["Page_1", "Page_2"]);

        let range = xlsx.worksheet_range("Page_1").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Name".into())));
        assert_eq!(
            range.get_value((1, 1)),
            Some(&Data::String("a < b & c".into()))
        );
    }

    #[test]
    fn test_empty_workbook_gets_placeholder_sheet() {
        let bytes = write_xlsx(&Workbook::new()).unwrap();
        let xlsx = Xlsx::new(Cursor::new(bytes)).unwrap();
        assert_eq!(xlsx.sheet_names(), vec!["Sheet1"]);
    }

    #[test]
    fn test_header_row_is_bold() {
        let xml = worksheet_xml(&grid(&[&["H"], &["v"]]));
        assert!(xml.contains(r#"<c r="A1" t="inlineStr" s="1">"#));
        assert!(xml.contains(r#"<c r="A2" t="inlineStr">"#));
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("S", grid(&[&["a", "b"]]));
        assert_eq!(write_xlsx(&workbook).unwrap(), write_xlsx(&workbook).unwrap());
    }

    #[test]
    fn test_xml_safe() {
        assert_eq!(xml_safe("a\u{0001}b\nc"), "ab\nc");
    }
}
