//! Rendering of a [`Document`](crate::model::Document) to Markdown and
//! plain text.
//!
//! Both renderers are pure functions of the document: the same document and
//! options always produce byte-identical output.

mod markdown;
mod options;
mod text;

pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::RenderOptions;
pub use text::{to_text, TextRenderer};

/// Join output chunks with one blank line between them.
///
/// Runs of blank lines collapse to one, leading and trailing blank lines
/// are dropped, and the result ends with a single newline. Only trailing
/// spaces are trimmed: a tab-separated table row keeps its empty cells.
pub(crate) fn assemble(chunks: &[String]) -> String {
    let joined = chunks.join("\n\n");

    let mut output = String::with_capacity(joined.len() + 1);
    let mut prev_blank = true;
    for line in joined.lines() {
        let line = line.trim_end_matches([' ', '\r']);
        if line.is_empty() {
            if !prev_blank {
                output.push('\n');
            }
            prev_blank = true;
        } else {
            output.push_str(line);
            output.push('\n');
            prev_blank = false;
        }
    }

    while output.ends_with("\n\n") {
        output.pop();
    }
    if output.is_empty() {
        output.push('\n');
    }
    output
}

/// Flatten a table cell onto one line.
pub(crate) fn flatten_cell(cell: &str) -> String {
    cell.split(['\n', '\r', '\t'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Image annotation text shared by both renderers.
pub(crate) fn image_note(count: usize) -> String {
    format!("[{} image(s) on this page]", count)
}

/// Failed-page annotation text shared by both renderers.
pub(crate) fn failure_note(reason: &str) -> String {
    format!("[Page extraction failed: {}]", flatten_cell(reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_collapses_blank_lines() {
        let chunks = vec![
            "a".to_string(),
            "\n\nb\n\n\n\nc".to_string(),
            "   ".to_string(),
            "d\n\n".to_string(),
        ];
        assert_eq!(assemble(&chunks), "a\n\nb\n\nc\n\nd\n");
    }

    #[test]
    fn test_assemble_keeps_trailing_tabs() {
        let chunks = vec!["[TABLE]\na\tb\t\n\t\t".to_string(), "after  ".to_string()];
        assert_eq!(assemble(&chunks), "[TABLE]\na\tb\t\n\t\t\n\nafter\n");
    }

    #[test]
    fn test_assemble_empty() {
        assert_eq!(assemble(&[]), "\n");
    }

    #[test]
    fn test_flatten_cell() {
        assert_eq!(flatten_cell("a\nb\tc "), "a b c");
        assert_eq!(flatten_cell(""), "");
    }
}
