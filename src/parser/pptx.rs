//! Presentation reading: table shapes from slide XML.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use zip::ZipArchive;

use super::clean_text;
use super::options::ExtractOptions;
use crate::error::{Error, Result};
use crate::model::{MergeRegion, Table, TableLocation};

const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Slide XML parts of a PPTX package, ordered by slide number.
pub struct PptxReader {
    slides: Vec<(usize, String)>,
}

impl PptxReader {
    /// Open a PPTX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read a PPTX package held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut slides = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            if !name.starts_with(SLIDE_PREFIX) || !name.ends_with(".xml") {
                continue;
            }
            // slideN.xml only; skips the _rels directory entries.
            let Ok(number) = name[SLIDE_PREFIX.len()..name.len() - 4].parse::<usize>() else {
                continue;
            };

            let mut buffer = Vec::new();
            entry.read_to_end(&mut buffer)?;
            slides.push((number, String::from_utf8_lossy(&buffer).into_owned()));
        }

        slides.sort_by_key(|(number, _)| *number);
        Ok(Self { slides })
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Every table shape on every slide, located as `Slide(n)`.
    pub fn tables(&self, options: &ExtractOptions) -> Result<Vec<Table>> {
        let mut tables = Vec::new();
        for (number, xml) in &self.slides {
            let found = slide_tables(xml, *number)?;
            log::debug!("Slide {}: {} tables", number, found.len());
            tables.extend(found.into_iter().map(|mut table| {
                table.header_rows = options.header.header_rows();
                table
            }));
        }
        Ok(tables)
    }
}

/// Parse the `a:tbl` elements of one slide.
///
/// Cell text is the cell's paragraphs joined by newlines, trimmed. Cells
/// with `gridSpan` or `rowSpan` become merge regions; the cells they cover
/// are still present in the XML and keep the grid aligned.
fn slide_tables(xml: &str, slide: usize) -> Result<Vec<Table>> {
    let mut reader = XmlReader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    let mut tables = Vec::new();
    let mut table: Option<Table> = None;
    let mut row: Vec<String> = Vec::new();
    let mut cell: Option<String> = None;
    let mut paragraphs = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"tbl" => table = Some(Table::new(TableLocation::Slide(slide))),
                b"tr" => row.clear(),
                b"tc" => {
                    note_merge(table.as_mut(), row.len(), e);
                    cell = Some(String::new());
                    paragraphs = 0;
                }
                b"p" => {
                    if let Some(text) = cell.as_mut() {
                        if paragraphs > 0 {
                            text.push('\n');
                        }
                        paragraphs += 1;
                    }
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tc" => {
                    note_merge(table.as_mut(), row.len(), e);
                    row.push(String::new());
                }
                b"br" => {
                    if let Some(text) = cell.as_mut() {
                        text.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if in_text {
                    if let Some(text) = cell.as_mut() {
                        let value = t
                            .unescape()
                            .unwrap_or_else(|_| String::from_utf8_lossy(t.as_ref()));
                        text.push_str(&value);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"tc" => {
                    if let Some(text) = cell.take() {
                        row.push(clean_text(&text));
                    }
                }
                b"tr" => {
                    if let Some(table) = table.as_mut() {
                        table.add_row(std::mem::take(&mut row));
                    }
                }
                b"tbl" => {
                    if let Some(table) = table.take() {
                        tables.push(table);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::UnreadableSource(format!(
                    "slide {}: {}",
                    slide, e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(tables)
}

/// Record the merge a spanning cell opens at the current position.
fn note_merge(table: Option<&mut Table>, col: usize, e: &BytesStart) {
    let Some(table) = table else {
        return;
    };
    let cols = span_attr(e, "gridSpan");
    let rows = span_attr(e, "rowSpan");
    if cols > 1 || rows > 1 {
        let row = table.rows.len();
        table.add_merge(MergeRegion::new(row, col, row + rows - 1, col + cols - 1));
    }
}

fn span_attr(e: &BytesStart, name: &str) -> usize {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|attr| std::str::from_utf8(&attr.value).ok()?.parse().ok())
        .unwrap_or(1)
        .max(1)
}
