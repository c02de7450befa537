//! Greedy vertical-fill pagination of flow documents.
//!
//! Blocks are placed top to bottom. A block that does not fit below the
//! cursor starts a new page first; only blocks taller than a whole page are
//! split, tables at row boundaries (header repeated) and paragraphs at line
//! boundaries.

use super::metrics::{max_line_width, text_width, wrap, Font};
use super::options::{Color, LayoutOptions, PageSize, TableStyle};
use crate::model::{FlowBlock, FlowDocument, NormalizedGrid};

/// Line height as a multiple of font size.
const LEADING_RATIO: f32 = 1.2;

/// A drawing instruction in page coordinates (origin bottom-left, points).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A single line of text; `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        size: f32,
        color: Color,
    },
    /// A rectangle with optional fill and outline; `y` is the bottom edge.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
}

/// Outline of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

/// A laid-out page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-indexed page number
    pub number: usize,
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text drawn on the page, one entry per line.
    pub fn text_lines(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Lay a flow document out on pages.
///
/// An empty document yields no pages.
pub fn render(doc: &FlowDocument, options: &LayoutOptions) -> Vec<Page> {
    let mut state = PageLayoutState::new(options);
    for block in &doc.blocks {
        state.place(block);
    }
    let pages = state.finish();
    log::debug!("Laid out {} blocks on {} pages", doc.len(), pages.len());
    pages
}

/// Height a block occupies at the usable width, excluding spacing after it.
pub fn measure_block(block: &FlowBlock, options: &LayoutOptions) -> f32 {
    match block {
        FlowBlock::Table(grid) => {
            TableLayout::measure(grid, &options.table_style, options.usable_width()).height()
        }
        _ => {
            let (text, style) = text_style(block, options);
            wrap(text, style.font, style.size, options.usable_width()).len() as f32 * style.leading
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    font: Font,
    size: f32,
    leading: f32,
    centered: bool,
}

fn text_style<'b>(block: &'b FlowBlock, options: &LayoutOptions) -> (&'b str, TextStyle) {
    let bold = |size: f32, leading: f32| TextStyle {
        font: Font::Bold,
        size,
        leading,
        centered: false,
    };

    match block {
        FlowBlock::Title(text) => (
            text,
            TextStyle {
                centered: true,
                ..bold(18.0, 22.0)
            },
        ),
        FlowBlock::Heading { text, level } => {
            let style = match level {
                1 => bold(18.0, 22.0),
                2 => bold(14.0, 18.0),
                3 => bold(12.0, 14.0),
                _ => bold(options.font_size, options.font_size * LEADING_RATIO),
            };
            (text, style)
        }
        FlowBlock::Paragraph(text) => (
            text,
            TextStyle {
                font: Font::Regular,
                size: options.font_size,
                leading: options.font_size * LEADING_RATIO,
                centered: false,
            },
        ),
        FlowBlock::Table(_) => ("", bold(0.0, 0.0)),
    }
}

/// Transient state of one render call: the cursor and the pages so far.
pub struct PageLayoutState<'a> {
    options: &'a LayoutOptions,
    page: PageSize,
    pages: Vec<Page>,
    ops: Vec<DrawOp>,
    cursor: f32,
}

impl<'a> PageLayoutState<'a> {
    /// Start at the top margin of page 1.
    pub fn new(options: &'a LayoutOptions) -> Self {
        let page = options.page();
        Self {
            options,
            page,
            pages: Vec::new(),
            ops: Vec::new(),
            cursor: page.height - options.margins.top,
        }
    }

    /// Current vertical position.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Place one block, breaking the page first if it does not fit.
    pub fn place(&mut self, block: &FlowBlock) {
        let spacing = self.options.spacing;
        match block {
            FlowBlock::Table(grid) => {
                if self.place_table(grid) {
                    self.cursor -= spacing.after_table;
                }
            }
            FlowBlock::Title(_) => self.place_text(block, spacing.after_title),
            FlowBlock::Heading { .. } => self.place_text(block, spacing.after_heading),
            FlowBlock::Paragraph(_) => self.place_text(block, spacing.after_paragraph),
        }
    }

    /// Close the last page and return all pages.
    pub fn finish(mut self) -> Vec<Page> {
        if !self.ops.is_empty() {
            self.break_page();
        }
        self.pages
    }

    fn top(&self) -> f32 {
        self.page.height - self.options.margins.top
    }

    fn fits(&self, height: f32) -> bool {
        self.cursor - height >= self.options.margins.bottom
    }

    fn break_page(&mut self) {
        self.pages.push(Page {
            number: self.pages.len() + 1,
            width: self.page.width,
            height: self.page.height,
            ops: std::mem::take(&mut self.ops),
        });
        self.cursor = self.top();
    }

    /// Break the page unless `height` fits below the cursor or the page is empty.
    fn ensure_room(&mut self, height: f32) {
        if !self.fits(height) && !self.ops.is_empty() {
            log::debug!(
                "Page {}: {:.1}pt block does not fit at {:.1}, breaking",
                self.pages.len() + 1,
                height,
                self.cursor
            );
            self.break_page();
        }
    }

    fn place_text(&mut self, block: &FlowBlock, space_after: f32) {
        let (text, style) = text_style(block, self.options);
        let usable = self.options.usable_width();
        let lines = wrap(text, style.font, style.size, usable);
        if lines.is_empty() {
            return;
        }

        self.ensure_room(lines.len() as f32 * style.leading);
        for line in lines {
            self.ensure_room(style.leading);
            let x = if style.centered {
                let width = text_width(&line, style.font, style.size);
                self.options.margins.left + (usable - width).max(0.0) / 2.0
            } else {
                self.options.margins.left
            };
            self.ops.push(DrawOp::Text {
                x,
                y: baseline(self.cursor, style.size, style.leading),
                text: line,
                font: style.font,
                size: style.size,
                color: Color::BLACK,
            });
            self.cursor -= style.leading;
        }
        self.cursor -= space_after;
    }

    /// Returns false if the grid had nothing to draw.
    fn place_table(&mut self, grid: &NormalizedGrid) -> bool {
        if grid.is_empty() {
            return false;
        }
        let style = &self.options.table_style;
        let layout = TableLayout::measure(grid, style, self.options.usable_width());
        let x0 = self.options.margins.left
            + (self.options.usable_width() - layout.width()).max(0.0) / 2.0;

        self.ensure_room(layout.height());

        let (header, body) = layout.rows.split_at(layout.header_rows);
        for row in header {
            self.ensure_room(row.height);
            self.draw_row(row, &layout.col_widths, x0);
        }
        for row in body {
            if !self.fits(row.height) && !self.ops.is_empty() {
                self.break_page();
                if self.options.repeat_header {
                    for header_row in header {
                        self.draw_row(header_row, &layout.col_widths, x0);
                    }
                }
            }
            self.draw_row(row, &layout.col_widths, x0);
        }
        true
    }

    fn draw_row(&mut self, row: &RowLayout, col_widths: &[f32], x0: f32) {
        let style = &self.options.table_style;
        let (font, size, fill, color, bottom_padding) = if row.header {
            (
                Font::Bold,
                style.header_font_size,
                style.header_background,
                style.header_text,
                style.header_bottom_padding,
            )
        } else {
            (
                Font::Regular,
                style.font_size,
                style.body_background,
                style.body_text,
                style.padding.bottom,
            )
        };
        let leading = size * LEADING_RATIO;
        let stroke = Some(Stroke {
            color: style.grid,
            width: style.grid_width,
        });

        let top = self.cursor;
        let mut x = x0;
        for (lines, &width) in row.cells.iter().zip(col_widths) {
            self.ops.push(DrawOp::Rect {
                x,
                y: top - row.height,
                width,
                height: row.height,
                fill,
                stroke,
            });

            // Vertically centered within the padded box.
            let inner = row.height - style.padding.top - bottom_padding;
            let mut line_top =
                top - style.padding.top - (inner - lines.len() as f32 * leading).max(0.0) / 2.0;
            for line in lines {
                let line_width = text_width(line, font, size);
                self.ops.push(DrawOp::Text {
                    x: x + (width - line_width) / 2.0,
                    y: baseline(line_top, size, leading),
                    text: line.clone(),
                    font,
                    size,
                    color,
                });
                line_top -= leading;
            }
            x += width;
        }
        self.cursor -= row.height;
    }
}

/// Baseline of a line whose box starts at `top`.
fn baseline(top: f32, size: f32, leading: f32) -> f32 {
    top - leading + size * 0.2
}

#[derive(Debug)]
struct RowLayout {
    cells: Vec<Vec<String>>,
    height: f32,
    header: bool,
}

#[derive(Debug)]
struct TableLayout {
    col_widths: Vec<f32>,
    rows: Vec<RowLayout>,
    header_rows: usize,
}

impl TableLayout {
    /// Size columns to their content, shrinking proportionally to fit `max_width`,
    /// then wrap every cell to its column.
    fn measure(grid: &NormalizedGrid, style: &TableStyle, max_width: f32) -> Self {
        let header_rows = grid.header().len();
        let h_padding = style.padding.left + style.padding.right;
        let font_for = |row: usize| {
            if row < header_rows {
                (Font::Bold, style.header_font_size)
            } else {
                (Font::Regular, style.font_size)
            }
        };

        let mut col_widths = vec![h_padding + 1.0; grid.column_count()];
        for (r, row) in grid.rows().iter().enumerate() {
            let (font, size) = font_for(r);
            for (c, cell) in row.iter().enumerate() {
                let width = max_line_width(cell, font, size) + h_padding;
                col_widths[c] = col_widths[c].max(width);
            }
        }

        let natural: f32 = col_widths.iter().sum();
        if natural > max_width {
            let scale = max_width / natural;
            for width in &mut col_widths {
                *width *= scale;
            }
        }

        let rows = grid
            .rows()
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let (font, size) = font_for(r);
                let header = r < header_rows;
                let cells: Vec<Vec<String>> = row
                    .iter()
                    .zip(&col_widths)
                    .map(|(cell, width)| wrap(cell, font, size, (width - h_padding).max(1.0)))
                    .collect();
                let line_count = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
                let bottom = if header {
                    style.header_bottom_padding
                } else {
                    style.padding.bottom
                };
                RowLayout {
                    height: line_count as f32 * size * LEADING_RATIO + style.padding.top + bottom,
                    cells,
                    header,
                }
            })
            .collect();

        Self {
            col_widths,
            rows,
            header_rows,
        }
    }

    fn width(&self) -> f32 {
        self.col_widths.iter().sum()
    }

    fn height(&self) -> f32 {
        self.rows.iter().map(|r| r.height).sum()
    }
}
