//! Page-level types.

use super::Table;
use serde::{Deserialize, Serialize};

/// A single page in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Content blocks in reading order
    pub blocks: Vec<Block>,

    /// Number of images found on the page
    pub image_count: usize,

    /// Why the page could not be extracted, if it could not
    pub error: Option<String>,
}

impl Page {
    /// Create a page from recognized blocks.
    ///
    /// When the page carries images, an [`Block::ImageMarker`] is appended
    /// after the text content.
    pub fn new(number: u32, mut blocks: Vec<Block>, image_count: usize) -> Self {
        if image_count > 0 {
            blocks.push(Block::ImageMarker { count: image_count });
        }
        Self {
            number,
            blocks,
            image_count,
            error: None,
        }
    }

    /// Create the placeholder for a page whose extraction failed.
    pub fn failed(number: u32, reason: impl Into<String>) -> Self {
        Self {
            number,
            blocks: Vec::new(),
            image_count: 0,
            error: Some(reason.into()),
        }
    }

    /// Check if the page has no content blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether extraction failed for this page.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Tables on this page, in reading order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Number of characters of recognized text (whitespace excluded).
    pub fn text_len(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Heading { text, .. } | Block::Paragraph { text } => count_visible(text),
                Block::Table(table) => table
                    .rows()
                    .iter()
                    .flatten()
                    .map(|cell| count_visible(cell))
                    .sum(),
                Block::ImageMarker { .. } => 0,
            })
            .sum()
    }
}

fn count_visible(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// A structural unit of page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading; level is in 1..=6
    Heading {
        /// Heading level, 1 is the most prominent
        level: u8,
        /// Heading text
        text: String,
    },

    /// A run of body text
    Paragraph {
        /// Paragraph text
        text: String,
    },

    /// A detected table
    Table(Table),

    /// Placeholder for the images on a page
    ImageMarker {
        /// Number of images
        count: usize,
    },
}

impl Block {
    /// Create a heading, clamping the level into 1..=6.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }

    /// Create a paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new_appends_image_marker() {
        let page = Page::new(1, vec![Block::paragraph("text")], 2);
        assert_eq!(page.blocks.len(), 2);
        assert_eq!(page.blocks[1], Block::ImageMarker { count: 2 });

        let page = Page::new(2, vec![Block::paragraph("text")], 0);
        assert_eq!(page.blocks.len(), 1);
    }

    #[test]
    fn test_failed_page() {
        let page = Page::failed(4, "corrupt content stream");
        assert!(page.is_failed());
        assert!(page.is_empty());
        assert_eq!(page.image_count, 0);
    }

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(Block::heading(9, "x"), Block::heading(6, "x"));
        assert_eq!(Block::heading(0, "x"), Block::heading(1, "x"));
        assert!(Block::heading(2, "x").is_heading());
    }

    #[test]
    fn test_text_len() {
        let table = Table::new(vec![vec!["ab".into(), "c d".into()]]);
        let page = Page::new(
            1,
            vec![Block::heading(1, "Hi there"), Block::Table(table)],
            3,
        );
        assert_eq!(page.text_len(), 7 + 4);
        assert_eq!(page.tables().count(), 1);
    }
}
