//! Markdown rendering.

use crate::model::{Block, Document, Page, Table};

use super::{assemble, failure_note, flatten_cell, image_note, RenderOptions};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render(doc)
}

/// Markdown renderer.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(&self, doc: &Document) -> String {
        let mut chunks = vec![doc.metadata().to_yaml_frontmatter(self.options.include_source)];

        for (i, page) in doc.pages().iter().enumerate() {
            if i > 0 && self.options.page_separators {
                chunks.push("---".to_string());
            }
            self.render_page(&mut chunks, page);
        }

        assemble(&chunks)
    }

    fn render_page(&self, chunks: &mut Vec<String>, page: &Page) {
        chunks.push(format!("## Page {}", page.number));

        if let Some(reason) = &page.error {
            chunks.push(format!("*{}*", failure_note(reason)));
        }
        for block in &page.blocks {
            if let Some(chunk) = self.render_block(block) {
                chunks.push(chunk);
            }
        }
    }

    fn render_block(&self, block: &Block) -> Option<String> {
        match block {
            Block::Heading { level, text } => {
                let text = text.trim();
                (!text.is_empty()).then(|| {
                    format!("{} {}", "#".repeat(self.options.markdown_heading_depth(*level)), text)
                })
            }
            Block::Paragraph { text } => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Block::Table(table) => render_table(table),
            Block::ImageMarker { count } => Some(format!("*{}*", image_note(*count))),
        }
    }
}

/// Render a GitHub-flavored pipe table: header row, dash separator, data rows.
fn render_table(table: &Table) -> Option<String> {
    let header = table.header()?;

    let mut lines = Vec::with_capacity(table.row_count() + 1);
    lines.push(render_row(header));
    lines.push(format!("| {} |", vec!["---"; header.len()].join(" | ")));
    for row in table.body() {
        lines.push(render_row(row));
    }
    Some(lines.join("\n"))
}

fn render_row(cells: &[String]) -> String {
    let cells: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
    format!("| {} |", cells.join(" | "))
}

fn escape_cell(cell: &str) -> String {
    flatten_cell(cell).replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentBuilder, Metadata};

    fn document(pages: Vec<Page>) -> Document {
        let metadata = Metadata::new("sample.pdf").with_page_count(pages.len() as u32);
        DocumentBuilder::new(metadata).pages(pages).build().unwrap()
    }

    #[test]
    fn test_render_example_page() {
        let table = Table::new(vec![
            vec!["항목".into(), "값".into()],
            vec!["온도".into(), "98℃".into()],
        ]);
        let doc = document(vec![Page::new(
            1,
            vec![Block::heading(1, "Title Page"), Block::Table(table)],
            0,
        )]);

        let md = to_markdown(&doc, &RenderOptions::default());
        let expected = "---\n\
            title: \"sample\"\n\
            author: \"Unknown\"\n\
            pages: 1\n\
            source_file: \"sample.pdf\"\n\
            ---\n\
            \n\
            ## Page 1\n\
            \n\
            ### Title Page\n\
            \n\
            | 항목 | 값 |\n\
            | --- | --- |\n\
            | 온도 | 98℃ |\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_page_separators_and_images() {
        let doc = document(vec![
            Page::new(1, vec![Block::paragraph("One")], 2),
            Page::new(2, vec![Block::paragraph("Two")], 0),
        ]);
        let md = to_markdown(&doc, &RenderOptions::default());
        assert!(md.contains("One\n\n*[2 image(s) on this page]*\n\n---\n\n## Page 2\n\nTwo\n"));
        assert!(!md.ends_with("---\n"));

        let md = to_markdown(&doc, &RenderOptions::new().with_page_separators(false));
        assert!(md.contains("*[2 image(s) on this page]*\n\n## Page 2"));
    }

    #[test]
    fn test_cell_escaping() {
        let table = Table::new(vec![vec!["a|b".into(), "multi\nline".into()], vec!["1".into()]]);
        let rendered = render_table(&table).unwrap();
        assert_eq!(rendered, "| a\\|b | multi line |\n| --- | --- |\n| 1 |  |");
    }

    #[test]
    fn test_failed_page_note() {
        let doc = document(vec![Page::failed(1, "invalid content stream")]);
        let md = to_markdown(&doc, &RenderOptions::default());
        assert!(md.contains("## Page 1\n\n*[Page extraction failed: invalid content stream]*\n"));
    }

    #[test]
    fn test_deterministic_and_no_double_blank_lines() {
        let doc = document(vec![
            Page::new(1, vec![Block::heading(2, "Intro"), Block::paragraph("Body")], 1),
            Page::new(2, vec![], 0),
        ]);
        let first = to_markdown(&doc, &RenderOptions::default());
        let second = to_markdown(&doc, &RenderOptions::default());
        assert_eq!(first, second);
        assert!(!first.contains("\n\n\n"));
        assert!(first.ends_with('\n') && !first.ends_with("\n\n"));
        assert!(first.contains("#### Intro"));
    }
}
