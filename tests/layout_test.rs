//! Pagination tests through the public rendering API.

use docshift::model::{normalize, MergeRegion, Table, TableLocation};
use docshift::render::{
    measure_block, render, DrawOp, LayoutOptions, Margins, Orientation, PageLayoutState,
};
use docshift::{FlowBlock, FlowDocument, NormalizedGrid};

fn numbered_grid(rows: usize) -> NormalizedGrid {
    let rows = (0..rows)
        .map(|r| vec![format!("Row {}", r), format!("{}", r * 10)])
        .collect();
    NormalizedGrid::from_rows(rows).with_header_rows(1)
}

fn text_positions(doc: &FlowDocument, options: &LayoutOptions) -> Vec<(usize, f32, String)> {
    render(doc, options)
        .into_iter()
        .flat_map(|page| {
            page.ops
                .into_iter()
                .filter_map(move |op| match op {
                    DrawOp::Text { y, text, .. } => Some((page.number, y, text)),
                    _ => None,
                })
        })
        .collect()
}

#[test]
fn test_cumulative_overflow_emits_more_pages() {
    let options = LayoutOptions::document();
    let mut doc = FlowDocument::new();
    // Stop at the first block whose bottom edge passes the usable height.
    let mut used = 0.0;
    for n in 0.. {
        let block = FlowBlock::Paragraph(format!("Paragraph number {}", n));
        let height = measure_block(&block, &options);
        doc.push(block);
        if used + height > options.usable_height() {
            break;
        }
        used += height + options.spacing.after_paragraph;
    }

    let pages = render(&doc, &options);
    assert!(pages.len() > 1);
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.number, i + 1);
    }
}

#[test]
fn test_block_never_straddles_pages() {
    let options = LayoutOptions::sheet_report();
    let mut doc = FlowDocument::new();
    for i in 0..6 {
        doc.push(FlowBlock::Title(format!("Sheet{}", i)));
        doc.push(FlowBlock::Table(numbered_grid(12)));
    }

    // Each 12-row table fits on a page, so all its rows land on one page.
    let positions = text_positions(&doc, &options);
    for i in 0..6 {
        let title = format!("Sheet{}", i);
        let page = positions.iter().find(|(_, _, t)| *t == title).unwrap().0;
        let table_pages: Vec<usize> = positions
            .iter()
            .skip_while(|(_, _, t)| *t != title)
            .skip(1)
            .take(24)
            .map(|(p, _, _)| *p)
            .collect();
        assert!(table_pages.iter().all(|p| *p >= page));
        assert!(table_pages.windows(2).all(|w| w[0] == w[1]));
    }
}

#[test]
fn test_text_stays_inside_margins() {
    let options = LayoutOptions::document().with_margins(Margins::uniform(36.0));
    let mut doc = FlowDocument::new();
    doc.push(FlowBlock::heading("Inventory", 1));
    doc.push(FlowBlock::Table(numbered_grid(150)));
    doc.push(FlowBlock::Paragraph("End of report. ".repeat(200)));

    let page_height = options.page().height;
    for (_, y, _) in text_positions(&doc, &options) {
        assert!(y >= options.margins.bottom, "baseline {} below margin", y);
        assert!(y <= page_height - options.margins.top);
    }
}

#[test]
fn test_header_repeats_on_continuation_pages() {
    let options = LayoutOptions::sheet_report();
    let mut doc = FlowDocument::new();
    doc.push(FlowBlock::Table(numbered_grid(120)));

    let pages = render(&doc, &options);
    assert!(pages.len() >= 2);
    for page in &pages {
        assert_eq!(page.text_lines()[0], "Row 0");
    }

    let options = options.with_repeat_header(false);
    let pages = render(&doc, &options);
    assert_ne!(pages[1].text_lines()[0], "Row 0");
}

#[test]
fn test_landscape_fits_fewer_rows() {
    let mut doc = FlowDocument::new();
    doc.push(FlowBlock::Table(numbered_grid(200)));

    let portrait = render(&doc, &LayoutOptions::document());
    let landscape = render(
        &doc,
        &LayoutOptions::document().with_orientation(Orientation::Landscape),
    );
    assert!(landscape.len() > portrait.len());
}

#[test]
fn test_merged_sheet_renders_anchor_once() {
    let mut table = Table::new(TableLocation::Sheet("Merged".into()));
    table.add_row(["Region", "Q1", "Q2"]);
    table.add_row(["North", "5", "7"]);
    table.add_row(["stale", "6", "8"]);
    table.add_merge(MergeRegion::new(1, 0, 2, 0));

    let mut doc = FlowDocument::new();
    doc.push(FlowBlock::Table(normalize(&table)));
    let positions = text_positions(&doc, &LayoutOptions::sheet_report());

    assert!(positions.iter().any(|(_, _, t)| t == "North"));
    assert!(!positions.iter().any(|(_, _, t)| t == "stale"));
}

#[test]
fn test_state_is_single_use() {
    let options = LayoutOptions::document();
    let mut state = PageLayoutState::new(&options);
    let top = state.cursor();
    state.place(&FlowBlock::Paragraph("x".into()));
    assert!(state.cursor() < top);

    let pages = state.finish();
    assert_eq!(pages.len(), 1);
}
