//! Conversion statistics derived from the page list.

use super::Page;
use serde::{Deserialize, Serialize};

/// Totals for one converted document (or, merged, for a batch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Number of pages
    pub pages: u32,

    /// Number of table blocks
    pub tables: u32,

    /// Number of images counted on the pages
    pub images: u32,
}

impl ConversionStats {
    /// Sum the statistics over a page list.
    pub fn from_pages(pages: &[Page]) -> Self {
        pages.iter().fold(Self::default(), |mut stats, page| {
            stats.pages += 1;
            stats.tables += page.blocks.iter().filter(|b| b.is_table()).count() as u32;
            stats.images += page.image_count as u32;
            stats
        })
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.pages += other.pages;
        self.tables += other.tables;
        self.images += other.images;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Table};

    #[test]
    fn test_stats_from_pages() {
        let table = Table::new(vec![vec!["a".into(), "b".into()]]);
        let pages = vec![
            Page::new(1, vec![Block::Table(table.clone()), Block::Table(table)], 3),
            Page::new(2, vec![Block::paragraph("x")], 0),
            Page::failed(3, "bad"),
        ];
        let stats = ConversionStats::from_pages(&pages);
        assert_eq!(stats.pages, 3);
        assert_eq!(stats.tables, 2);
        assert_eq!(stats.images, 3);
    }

    #[test]
    fn test_stats_empty() {
        let pages = vec![Page::new(1, vec![Block::paragraph("only text")], 0)];
        let stats = ConversionStats::from_pages(&pages);
        assert_eq!(stats.tables, 0);
        assert_eq!(stats.images, 0);
    }

    #[test]
    fn test_stats_merge() {
        let mut total = ConversionStats {
            pages: 2,
            tables: 1,
            images: 0,
        };
        total.merge(&ConversionStats {
            pages: 3,
            tables: 2,
            images: 4,
        });
        assert_eq!(
            total,
            ConversionStats {
                pages: 5,
                tables: 3,
                images: 4
            }
        );
    }
}
