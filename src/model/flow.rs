//! Flow documents: headings, paragraphs and tables without fixed pagination.

use super::{NormalizedGrid, Workbook};
use serde::{Deserialize, Serialize};

/// A content block in a flow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum FlowBlock {
    /// Document title, larger than any heading
    Title(String),

    /// Section heading (level 1-6)
    Heading {
        /// Heading text
        text: String,
        /// Heading level
        level: u8,
    },

    /// Body paragraph
    Paragraph(String),

    /// Grid table
    Table(NormalizedGrid),
}

impl FlowBlock {
    /// Create a heading, clamping the level to 1-6.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        FlowBlock::Heading {
            text: text.into(),
            level: level.clamp(1, 6),
        }
    }

    /// Whether the block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, FlowBlock::Table(_))
    }
}

/// A sequence of content blocks in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    /// Blocks in order
    pub blocks: Vec<FlowBlock>,
}

impl FlowDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document with a heading and a grid per named table.
    ///
    /// `heading` decides how each name is introduced (e.g. a level-1 heading
    /// for word-processor output, a title for PDF reports).
    pub fn from_named_grids<I, S>(entries: I, heading: impl Fn(String) -> FlowBlock) -> Self
    where
        I: IntoIterator<Item = (S, NormalizedGrid)>,
        S: Into<String>,
    {
        let mut doc = Self::new();
        for (name, grid) in entries {
            doc.push(heading(name.into()));
            doc.push(FlowBlock::Table(grid));
        }
        doc
    }

    /// Build a document from the sheets of a workbook, headed by level-1 headings.
    pub fn from_workbook(workbook: &Workbook) -> Self {
        Self::from_named_grids(
            workbook
                .sheets()
                .iter()
                .map(|sheet| (sheet.name.clone(), sheet.grid.clone())),
            |name| FlowBlock::heading(name, 1),
        )
    }

    /// Append a block.
    pub fn push(&mut self, block: FlowBlock) {
        self.blocks.push(block);
    }

    /// Get the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of table blocks.
    pub fn table_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_table()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_named_grids_orders_heading_then_table() {
        let grid = NormalizedGrid::from_rows(vec![vec!["a".into()]]);
        let doc = FlowDocument::from_named_grids(
            vec![("First", grid.clone()), ("Second", grid)],
            |name| FlowBlock::heading(name, 1),
        );

        assert_eq!(doc.len(), 4);
        assert_eq!(doc.table_count(), 2);
        assert_eq!(doc.blocks[0], FlowBlock::heading("First", 1));
        assert!(doc.blocks[1].is_table());
        assert_eq!(doc.blocks[2], FlowBlock::heading("Second", 1));
    }

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(
            FlowBlock::heading("h", 9),
            FlowBlock::Heading {
                text: "h".into(),
                level: 6
            }
        );
    }
}
