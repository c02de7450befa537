//! Page layout options and configuration.

use std::str::FromStr;

/// Page dimensions in points (1/72 inch), portrait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// ISO A4 (210 x 297 mm)
    pub const A4: PageSize = PageSize {
        width: 595.2756,
        height: 841.8898,
    };

    /// US Letter (8.5 x 11 in)
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    /// Dimensions after applying an orientation.
    pub fn oriented(self, orientation: Orientation) -> PageSize {
        let (short, long) = if self.width <= self.height {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        };
        match orientation {
            Orientation::Portrait => PageSize {
                width: short,
                height: long,
            },
            Orientation::Landscape => PageSize {
                width: long,
                height: short,
            },
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(format!("Invalid orientation: {}", other)),
        }
    }
}

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    /// The same margin on every side.
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Vertical space inserted after each kind of block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    pub after_title: f32,
    pub after_heading: f32,
    pub after_paragraph: f32,
    pub after_table: f32,
}

/// An RGB color with components in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const GREY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const WHITE_SMOKE: Color = Color::rgb(0.96, 0.96, 0.96);
    pub const BEIGE: Color = Color::rgb(0.96, 0.96, 0.86);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Cell padding in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Visual style of rendered grid tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    /// Font size of body cells
    pub font_size: f32,
    /// Font size of header cells (always bold)
    pub header_font_size: f32,
    /// Header row fill
    pub header_background: Option<Color>,
    /// Header text color
    pub header_text: Color,
    /// Extra padding below header text
    pub header_bottom_padding: f32,
    /// Body row fill
    pub body_background: Option<Color>,
    /// Body text color
    pub body_text: Color,
    /// Grid line color
    pub grid: Color,
    /// Grid line width
    pub grid_width: f32,
    /// Cell padding
    pub padding: Padding,
}

impl TableStyle {
    /// Grey header with light text over beige body, 1pt black grid.
    pub fn banded() -> Self {
        Self {
            font_size: 10.0,
            header_font_size: 12.0,
            header_background: Some(Color::GREY),
            header_text: Color::WHITE_SMOKE,
            header_bottom_padding: 12.0,
            body_background: Some(Color::BEIGE),
            body_text: Color::BLACK,
            grid: Color::BLACK,
            grid_width: 1.0,
            padding: Padding {
                top: 3.0,
                right: 6.0,
                bottom: 3.0,
                left: 6.0,
            },
        }
    }

    /// Grey header with white text, hairline grid, no body fill.
    pub fn plain() -> Self {
        Self {
            header_font_size: 10.0,
            header_text: Color::WHITE,
            header_bottom_padding: 3.0,
            body_background: None,
            grid_width: 0.25,
            ..Self::banded()
        }
    }
}

impl Default for TableStyle {
    fn default() -> Self {
        Self::plain()
    }
}

/// Options for laying flow documents out on pages.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Page size (portrait dimensions)
    pub page_size: PageSize,

    /// Page orientation
    pub orientation: Orientation,

    /// Page margins
    pub margins: Margins,

    /// Space after blocks
    pub spacing: Spacing,

    /// Grid table style
    pub table_style: TableStyle,

    /// Body text size
    pub font_size: f32,

    /// Repeat table header rows on every page a table spans
    pub repeat_header: bool,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Letter pages with one-inch margins and banded tables.
    pub fn sheet_report() -> Self {
        Self {
            page_size: PageSize::LETTER,
            orientation: Orientation::Portrait,
            margins: Margins::uniform(72.0),
            spacing: Spacing {
                after_title: 12.0,
                after_heading: 12.0,
                after_paragraph: 10.0,
                after_table: 24.0,
            },
            table_style: TableStyle::banded(),
            font_size: 10.0,
            repeat_header: true,
        }
    }

    /// A4 pages with 50pt margins and plain tables.
    pub fn document() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins: Margins::uniform(50.0),
            spacing: Spacing {
                after_title: 10.0,
                after_heading: 10.0,
                after_paragraph: 10.0,
                after_table: 20.0,
            },
            table_style: TableStyle::plain(),
            font_size: 10.0,
            repeat_header: true,
        }
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Set the block spacing.
    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the table style.
    pub fn with_table_style(mut self, style: TableStyle) -> Self {
        self.table_style = style;
        self
    }

    /// Enable or disable header repetition.
    pub fn with_repeat_header(mut self, repeat: bool) -> Self {
        self.repeat_header = repeat;
        self
    }

    /// Page dimensions with orientation applied.
    pub fn page(&self) -> PageSize {
        self.page_size.oriented(self.orientation)
    }

    /// Page width minus left and right margins.
    pub fn usable_width(&self) -> f32 {
        self.page().width - self.margins.left - self.margins.right
    }

    /// Page height minus top and bottom margins.
    pub fn usable_height(&self) -> f32 {
        self.page().height - self.margins.top - self.margins.bottom
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::document()
    }
}
