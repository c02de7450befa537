//! Table detection from positioned text.
//!
//! Tables without ruling lines are found from alignment alone. Spans are
//! grouped into lines by baseline, column anchors are the left edges shared
//! by many lines, and runs of consecutive lines that start their cells on
//! those anchors become table regions. Column count is not capped: a wide
//! sheet printed to PDF must come back with all of its columns.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use crate::model::{Table, TableLocation};

use super::pdf::TextSpan;

/// How far left of its anchor a cell may start and still belong to it (points).
const CELL_SLACK: f32 = 10.0;

/// Glyphs that open a bulleted list item.
const BULLETS: &[&str] = &[
    "-", "–", "—", "•", "·", "*", "○", "◦", "▪", "■", "□", "●", "◆", "◇", "▸", "▹", "►", "▶",
    "▷", "➤", "➜", "※", "☞",
];

/// A table region found on a page.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Column anchors, left to right
    pub columns: Vec<f32>,
    /// Lines of the region, top to bottom
    pub rows: Vec<TableRowData>,
    /// Baseline of the first line
    pub top: f32,
    /// Baseline of the last line
    pub bottom: f32,
    /// Rightmost estimated text edge
    pub right: f32,
}

impl DetectedTable {
    fn from_lines(rows: Vec<TableRowData>, columns: Vec<f32>) -> Self {
        let top = rows.first().map_or(0.0, |row| row.y);
        let bottom = rows.last().map_or(0.0, |row| row.y);
        let right = rows
            .iter()
            .flat_map(|row| row.spans.iter())
            .map(TextSpan::right)
            .fold(f32::NEG_INFINITY, f32::max);
        Self {
            columns,
            rows,
            top,
            bottom,
            right,
        }
    }

    /// Rows times columns.
    pub fn cell_count(&self) -> usize {
        self.rows.len() * self.columns.len()
    }
}

/// One line of text: spans sharing a baseline, left to right.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Mean baseline of the spans
    pub y: f32,
    /// Spans sorted by X
    pub spans: Vec<TextSpan>,
}

impl TableRowData {
    fn start(span: TextSpan) -> Self {
        Self {
            y: span.y,
            spans: vec![span],
        }
    }

    fn push(&mut self, span: TextSpan) {
        let n = self.spans.len() as f32;
        self.y = (self.y * n + span.y) / (n + 1.0);
        self.spans.push(span);
    }
}

/// Table detector tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDetectorConfig {
    /// Fewest lines a region needs
    pub min_rows: usize,
    /// Fewest columns a region needs
    pub min_columns: usize,
    /// Baseline tolerance within one line, as a fraction of the font size
    pub line_tolerance: f32,
    /// Left edges are snapped to buckets this wide (points)
    pub edge_snap: f32,
    /// Share of multi-cell lines a left edge must appear in to be an anchor
    pub min_anchor_support: f32,
    /// Share of a line's spans that must start on an anchor for the line to
    /// count as a table row
    pub min_line_alignment: f32,
    /// Anchors closer than this are the same column (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            line_tolerance: 0.4,
            edge_snap: 5.0,
            min_anchor_support: 0.3,
            min_line_alignment: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Finds table regions in the text of one page.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Detector with default tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector with custom tuning.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// All table regions on the page, top to bottom.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<DetectedTable> {
        let lines = self.lines(spans);
        if lines.len() < self.config.min_rows {
            return Vec::new();
        }

        let anchors = self.anchors(&lines);
        log::debug!(
            "TableDetector: {} lines, anchors at {:?}",
            lines.len(),
            anchors
        );
        if anchors.len() < self.config.min_columns {
            return Vec::new();
        }

        self.regions(&lines, &anchors)
            .into_iter()
            .filter_map(|range| self.region_table(&lines[range]))
            .collect()
    }

    /// The region with the most cells, as a table.
    ///
    /// Ties go to the region nearest the top of the page.
    pub fn best_table(
        &self,
        spans: Vec<TextSpan>,
        location: TableLocation,
        header_rows: u8,
    ) -> Option<Table> {
        let mut best: Option<DetectedTable> = None;
        for detected in self.detect(&spans) {
            if best
                .as_ref()
                .map_or(true, |b| detected.cell_count() > b.cell_count())
            {
                best = Some(detected);
            }
        }
        best.map(|detected| self.to_table(&detected, location, header_rows))
    }

    /// Lay a region's spans out as cells.
    ///
    /// A span goes to the rightmost column whose anchor it does not start
    /// before. Spans sharing a cell are joined with a space.
    pub fn to_table(
        &self,
        detected: &DetectedTable,
        location: TableLocation,
        header_rows: u8,
    ) -> Table {
        let mut table = Table::new(location);
        if detected.rows.len() > 1 {
            table.header_rows = header_rows;
        }

        for line in &detected.rows {
            let mut cells: Vec<Vec<&str>> = vec![Vec::new(); detected.columns.len()];
            for span in &line.spans {
                if let Some(cell) = cells.get_mut(column_of(span.x, &detected.columns)) {
                    cell.push(span.text.trim());
                }
            }
            table.add_row(cells.into_iter().map(|parts| parts.join(" ")));
        }

        table
    }

    /// Group spans into lines, top of the page first.
    fn lines(&self, spans: &[TextSpan]) -> Vec<TableRowData> {
        let mut sorted = spans.to_vec();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut lines: Vec<TableRowData> = Vec::new();
        for span in sorted {
            let tolerance = span.font_size * self.config.line_tolerance;
            match lines.last_mut() {
                Some(line) if (line.y - span.y).abs() <= tolerance => line.push(span),
                _ => lines.push(TableRowData::start(span)),
            }
        }
        for line in &mut lines {
            line.spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
        lines
    }

    fn snap(&self, x: f32) -> i32 {
        (x / self.config.edge_snap).round() as i32
    }

    /// Left edges shared by enough lines, merged when closer than a column gap.
    fn anchors(&self, lines: &[TableRowData]) -> Vec<f32> {
        let multi: Vec<&TableRowData> = lines.iter().filter(|l| l.spans.len() >= 2).collect();
        // Single-cell lines only vote when too few lines have several cells.
        let voters: Vec<&TableRowData> = if multi.len() >= self.config.min_rows {
            multi
        } else {
            lines.iter().collect()
        };

        let mut votes: BTreeMap<i32, usize> = BTreeMap::new();
        for line in &voters {
            let edges: BTreeSet<i32> = line.spans.iter().map(|s| self.snap(s.x)).collect();
            for edge in edges {
                *votes.entry(edge).or_default() += 1;
            }
        }

        let needed = ((voters.len() as f32 * self.config.min_anchor_support) as usize).max(2);
        let mut anchors: Vec<f32> = Vec::new();
        for (edge, count) in votes {
            if count < needed {
                continue;
            }
            let x = edge as f32 * self.config.edge_snap;
            if anchors
                .last()
                .map_or(true, |last| x - last >= self.config.min_column_gap)
            {
                anchors.push(x);
            }
        }
        anchors
    }

    /// Share of a line's spans that start on an anchor.
    fn alignment(&self, line: &TableRowData, anchors: &[f32]) -> f32 {
        if line.spans.is_empty() {
            return 0.0;
        }
        let on_anchor = line
            .spans
            .iter()
            .filter(|s| anchors.iter().any(|a| (s.x - a).abs() <= self.config.edge_snap))
            .count();
        on_anchor as f32 / line.spans.len() as f32
    }

    /// Runs of aligned lines at least `min_rows` long.
    fn regions(&self, lines: &[TableRowData], anchors: &[f32]) -> Vec<Range<usize>> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, line) in lines.iter().enumerate() {
            let aligned = self.alignment(line, anchors) >= self.config.min_line_alignment;
            match (aligned, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    if i - s >= self.config.min_rows {
                        regions.push(s..i);
                    }
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            if lines.len() - s >= self.config.min_rows {
                regions.push(s..lines.len());
            }
        }
        regions
    }

    /// Re-anchor a region on its own lines and reject it if it reads as a list.
    fn region_table(&self, lines: &[TableRowData]) -> Option<DetectedTable> {
        let columns = self.anchors(lines);
        if columns.len() < self.config.min_columns {
            return None;
        }
        if looks_like_list(lines, &columns) {
            log::debug!("TableDetector: region of {} lines is a list", lines.len());
            return None;
        }

        let detected = DetectedTable::from_lines(lines.to_vec(), columns);
        log::debug!(
            "TableDetector: region y={:.1}..{:.1}, right edge {:.1}, {} x {}",
            detected.top,
            detected.bottom,
            detected.right,
            detected.rows.len(),
            detected.columns.len()
        );
        Some(detected)
    }
}

fn column_of(x: f32, columns: &[f32]) -> usize {
    columns
        .iter()
        .rposition(|&anchor| x >= anchor - CELL_SLACK)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMarker {
    Bullet,
    Enumerator,
}

/// Classify the text of a line's first cell.
///
/// Enumerators need their punctuation ("1.", "12)", "b."). A bare number is
/// data, such as a year or an id.
fn list_marker(text: &str) -> Option<ListMarker> {
    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if BULLETS.contains(&text.as_str()) {
        return Some(ListMarker::Bullet);
    }

    let body = text.strip_suffix('.').or_else(|| text.strip_suffix(')'))?;
    let numeric = (1..=3).contains(&body.len()) && body.chars().all(|c| c.is_ascii_digit());
    let lettered = body.chars().count() == 1 && body.chars().all(char::is_alphabetic);
    (numeric || lettered).then_some(ListMarker::Enumerator)
}

/// Whether a region is a list whose markers landed in their own column.
///
/// Bullets give it away at any width. Enumerators only in two-column regions,
/// since a wider table may well number its rows.
fn looks_like_list(lines: &[TableRowData], columns: &[f32]) -> bool {
    let mut bullets = 0;
    let mut enumerators = 0;
    for line in lines {
        match line.spans.first().and_then(|s| list_marker(&s.text)) {
            Some(ListMarker::Bullet) => bullets += 1,
            Some(ListMarker::Enumerator) => enumerators += 1,
            None => {}
        }
    }

    let half = lines.len() as f32 / 2.0;
    bullets as f32 >= half || (columns.len() == 2 && (bullets + enumerators) as f32 >= half)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, 12.0, "Helvetica".to_string())
    }

    fn grid_spans(rows: &[&[&str]], x0: f32, pitch: f32) -> Vec<TextSpan> {
        let mut spans = Vec::new();
        for (r, cells) in rows.iter().enumerate() {
            let y = 700.0 - 15.0 * r as f32;
            for (c, text) in cells.iter().enumerate() {
                spans.push(make_span(text, x0 + pitch * c as f32, y));
            }
        }
        spans
    }

    fn line(y: f32, cells: &[(&str, f32)]) -> TableRowData {
        TableRowData {
            y,
            spans: cells.iter().map(|(t, x)| make_span(t, *x, y)).collect(),
        }
    }

    #[test]
    fn test_lines_group_by_baseline() {
        let detector = TableDetector::new();
        let spans = vec![
            make_span("B1", 60.0, 100.0),
            make_span("A1", 10.0, 101.0),
            make_span("A2", 10.0, 85.0),
            make_span("B2", 60.0, 85.0),
        ];

        let lines = detector.lines(&spans);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].text, "A1");
        assert_eq!(lines[0].spans[1].text, "B1");
        assert!((lines[0].y - 100.5).abs() < 0.01);
    }

    #[test]
    fn test_anchors_merge_nearby_edges() {
        let detector = TableDetector::new();
        let lines = vec![
            line(100.0, &[("A1", 10.0), ("B1", 60.0)]),
            line(85.0, &[("A2", 12.0), ("B2", 60.0)]),
            line(70.0, &[("A3", 10.0), ("B3", 61.0)]),
        ];

        assert_eq!(detector.anchors(&lines), vec![10.0, 60.0]);
    }

    #[test]
    fn test_detect_simple_table() {
        let detector = TableDetector::new();
        let spans = grid_spans(&[&["Name", "Age"], &["Alice", "30"], &["Bob", "25"]], 10.0, 50.0);

        let tables = detector.detect(&spans);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[0].columns.len(), 2);
        assert_eq!(tables[0].cell_count(), 6);
    }

    #[test]
    fn test_wide_table_keeps_every_column() {
        let detector = TableDetector::new();
        let header = ["Region", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Total"];
        let body: Vec<Vec<String>> = (0..4)
            .map(|r| {
                let mut row = vec![format!("Zone {}", r)];
                row.extend((1..8).map(|c| format!("{}", r * 100 + c)));
                row
            })
            .collect();
        let mut rows: Vec<Vec<&str>> = vec![header.to_vec()];
        rows.extend(body.iter().map(|row| row.iter().map(String::as_str).collect()));
        let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();

        let table = detector
            .best_table(grid_spans(&rows, 40.0, 65.0), TableLocation::Page(1), 1)
            .expect("table");
        assert_eq!(table.column_count(), 8);
        assert_eq!(table.row_count(), 5);
        assert_eq!(table.rows[0][7], "Total");
        assert_eq!(table.rows[4][7], "307");
    }

    #[test]
    fn test_numeric_first_column_is_data() {
        let detector = TableDetector::new();
        let spans = grid_spans(
            &[
                &["Year", "Revenue"],
                &["2021", "1200"],
                &["2022", "1350"],
                &["2023", "1500"],
            ],
            72.0,
            228.0,
        );

        let table = detector
            .best_table(spans, TableLocation::Page(1), 1)
            .expect("table");
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.rows[3], vec!["2023", "1500"]);

        let spans = grid_spans(&[&["1", "Ann"], &["2", "Ben"], &["3", "Cy"]], 72.0, 100.0);
        assert_eq!(detector.detect(&spans).len(), 1);
    }

    #[test]
    fn test_no_table_single_column() {
        let detector = TableDetector::new();
        let spans = vec![
            make_span("Line 1", 10.0, 100.0),
            make_span("Line 2", 10.0, 85.0),
            make_span("Line 3", 10.0, 70.0),
        ];

        assert!(detector.detect(&spans).is_empty());
        assert!(detector
            .best_table(spans, TableLocation::Page(1), 1)
            .is_none());
    }

    #[test]
    fn test_to_table_header_rows_follow_caller() {
        let detector = TableDetector::new();
        let detected = DetectedTable::from_lines(
            vec![
                line(100.0, &[("Name", 10.0), ("Age", 60.0)]),
                line(85.0, &[("Alice", 10.0), ("30", 60.0)]),
            ],
            vec![10.0, 60.0],
        );

        let table = detector.to_table(&detected, TableLocation::Page(2), 1);
        assert_eq!(table.location, TableLocation::Page(2));
        assert_eq!(table.header_rows, 1);
        assert_eq!(table.rows[1], vec!["Alice", "30"]);

        let table = detector.to_table(&detected, TableLocation::Page(2), 0);
        assert_eq!(table.header_rows, 0);
    }

    #[test]
    fn test_to_table_missing_cell_stays_empty() {
        let detector = TableDetector::new();
        let detected = DetectedTable::from_lines(
            vec![
                line(100.0, &[("Item", 10.0), ("Qty", 60.0)]),
                line(85.0, &[("Bolts", 10.0)]),
                line(70.0, &[("12", 58.0)]),
            ],
            vec![10.0, 60.0],
        );

        let table = detector.to_table(&detected, TableLocation::Page(1), 1);
        assert_eq!(table.rows[1], vec!["Bolts", ""]);
        assert_eq!(table.rows[2], vec!["", "12"]);
    }

    #[test]
    fn test_best_table_prefers_largest_region() {
        let detector = TableDetector::new();
        let mut spans = vec![
            make_span("Key", 50.0, 700.0),
            make_span("Value", 200.0, 700.0),
            make_span("Color", 50.0, 685.0),
            make_span("Blue", 200.0, 685.0),
        ];
        // Indented prose between the two tables ends the first region.
        spans.push(make_span(
            "The following figures are provisional",
            120.0,
            640.0,
        ));
        for (i, y) in [600.0, 585.0, 570.0, 555.0].iter().enumerate() {
            spans.push(make_span(&format!("Region {}", i), 50.0, *y));
            spans.push(make_span("North", 200.0, *y));
            spans.push(make_span("1200", 350.0, *y));
        }

        let table = detector
            .best_table(spans, TableLocation::Page(1), 1)
            .expect("table");
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[0][0], "Region 0");
    }

    #[test]
    fn test_numbered_list_not_detected_as_table() {
        let detector = TableDetector::new();
        let spans = vec![
            make_span("1.", 50.0, 400.0),
            make_span("Install the unit", 80.0, 400.0),
            make_span("2.", 50.0, 370.0),
            make_span("Connect power", 80.0, 370.0),
            make_span("3.", 50.0, 340.0),
            make_span("Run the self test", 80.0, 340.0),
        ];

        assert!(detector.detect(&spans).is_empty());
    }

    #[test]
    fn test_bullet_list_not_detected_as_table() {
        let detector = TableDetector::new();
        let spans = vec![
            make_span("•", 50.0, 400.0),
            make_span("Management", 80.0, 400.0),
            make_span("•", 50.0, 370.0),
            make_span("Interface/Service Option", 80.0, 370.0),
            make_span("•", 50.0, 340.0),
            make_span("Firmware", 80.0, 340.0),
        ];

        assert!(detector.detect(&spans).is_empty());
    }

    #[test]
    fn test_list_marker() {
        assert_eq!(list_marker("1."), Some(ListMarker::Enumerator));
        assert_eq!(list_marker("12)"), Some(ListMarker::Enumerator));
        assert_eq!(list_marker("1 ."), Some(ListMarker::Enumerator));
        assert_eq!(list_marker("b."), Some(ListMarker::Enumerator));
        assert_eq!(list_marker("•"), Some(ListMarker::Bullet));
        assert_eq!(list_marker("–"), Some(ListMarker::Bullet));

        assert_eq!(list_marker("3"), None);
        assert_eq!(list_marker("2021"), None);
        assert_eq!(list_marker("2021."), None);
        assert_eq!(list_marker("Name"), None);
        assert_eq!(list_marker(""), None);
    }
}
