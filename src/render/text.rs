//! Plain text rendering.

use crate::model::{Block, Document, Page};

use super::{assemble, failure_note, flatten_cell, image_note, RenderOptions};

/// Convert a document to plain text.
pub fn to_text(doc: &Document, options: &RenderOptions) -> String {
    TextRenderer::new(options.clone()).render(doc)
}

/// Plain text renderer.
///
/// Emits no Markdown syntax: headings are bare lines and tables are
/// tab-separated rows under a `[TABLE]` marker.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    options: RenderOptions,
}

impl TextRenderer {
    /// Create a new text renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to plain text.
    pub fn render(&self, doc: &Document) -> String {
        let mut chunks = vec![self.render_header(doc)];
        for page in doc.pages() {
            self.render_page(&mut chunks, page);
        }
        assemble(&chunks)
    }

    fn render_header(&self, doc: &Document) -> String {
        let metadata = doc.metadata();
        let rule = "=".repeat(self.options.rule_width);

        let mut lines = vec![
            rule.clone(),
            format!("Title: {}", metadata.display_title()),
            format!("Author: {}", metadata.display_author()),
            format!("Pages: {}", metadata.page_count),
        ];
        if self.options.include_source && !metadata.source_file.is_empty() {
            lines.push(format!("Source: {}", metadata.source_file));
        }
        lines.push(rule);
        lines.join("\n")
    }

    fn render_page(&self, chunks: &mut Vec<String>, page: &Page) {
        chunks.push(format!("[Page {}]", page.number));

        if let Some(reason) = &page.error {
            chunks.push(failure_note(reason));
        }
        for block in &page.blocks {
            let chunk = match block {
                Block::Heading { text, .. } | Block::Paragraph { text } => text.trim().to_string(),
                Block::Table(table) => {
                    let mut lines = vec!["[TABLE]".to_string()];
                    lines.extend(table.rows().iter().map(|row| {
                        row.iter().map(|c| flatten_cell(c)).collect::<Vec<_>>().join("\t")
                    }));
                    lines.join("\n")
                }
                Block::ImageMarker { count } => image_note(*count),
            };
            if !chunk.is_empty() {
                chunks.push(chunk);
            }
        }
    }
}
