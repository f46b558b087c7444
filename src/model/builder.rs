//! Assembles per-page results into a [`Document`].

use super::{Document, Metadata, Page};
use crate::error::{Error, Result};

/// Collects pages in order and validates them into a [`Document`].
///
/// ```
/// use pdfcvt::model::{Block, DocumentBuilder, Metadata, Page};
///
/// let doc = DocumentBuilder::new(Metadata::new("a.pdf").with_page_count(1))
///     .page(Page::new(1, vec![Block::paragraph("Hello")], 0))
///     .build()
///     .unwrap();
/// assert_eq!(doc.page_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    metadata: Metadata,
    pages: Vec<Page>,
}

impl DocumentBuilder {
    /// Start a document with its metadata.
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            pages: Vec::new(),
        }
    }

    /// Append the next page.
    pub fn page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    /// Append several pages.
    pub fn pages(mut self, pages: impl IntoIterator<Item = Page>) -> Self {
        self.pages.extend(pages);
        self
    }

    /// Append a page in place.
    pub fn push(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Validate and build the document.
    ///
    /// Page numbers must run 1, 2, 3, ... without gaps, and their count must
    /// match the page count recorded in the metadata.
    pub fn build(self) -> Result<Document> {
        for (i, page) in self.pages.iter().enumerate() {
            let expected = i as u32 + 1;
            if page.number != expected {
                return Err(Error::Model(format!(
                    "expected page {} but found page {}",
                    expected, page.number
                )));
            }
        }

        let count = self.pages.len() as u32;
        if count != self.metadata.page_count {
            return Err(Error::Model(format!(
                "metadata declares {} pages but {} were built",
                self.metadata.page_count, count
            )));
        }

        Ok(Document::from_parts(self.metadata, self.pages))
    }
}
