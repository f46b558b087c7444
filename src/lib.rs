//! # pdfcvt
//!
//! Converts PDF documents into two renderings at once: Markdown for reading
//! and publishing, and plain text for indexing and search.
//!
//! Each page is extracted into positioned text fragments, grouped into
//! headings, paragraphs and tables, and assembled into a read-only
//! [`Document`] that both renderers consume.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfcvt::{parse_file, render};
//!
//! fn main() -> pdfcvt::Result<()> {
//!     let doc = parse_file("document.pdf")?;
//!
//!     let options = render::RenderOptions::default();
//!     println!("{}", render::to_markdown(&doc, &options));
//!     println!("{}", render::to_text(&doc, &options));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Dual output**: Markdown with YAML front matter, and framed plain text
//! - **Structure recognition**: headings by relative font size and numbering cues, pipe tables
//! - **Page isolation**: a broken page is noted and skipped, the rest still converts
//! - **CJK support**: Korean, Chinese, Japanese text handling
//! - **Batch mode**: whole directories, optionally in parallel with Rayon

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

pub use convert::{
    BatchSummary, ConversionReport, ConvertObserver, ConvertOptions, Converter, DocumentOutcome,
    NoopObserver, OutputPaths,
};
pub use error::{Error, Result};
pub use model::{Block, ConversionStats, Document, DocumentBuilder, Metadata, Page, Table};
pub use parser::{Fragment, LayoutConfig, PdfParser};
pub use render::RenderOptions;

use std::path::Path;

/// Parse a PDF file into the document model.
///
/// # Example
///
/// ```no_run
/// use pdfcvt::parse_file;
///
/// let doc = parse_file("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    PdfParser::open(path)?.parse()
}

/// Parse a PDF held in memory. `source_file` names it in the metadata.
///
/// # Example
///
/// ```no_run
/// use pdfcvt::parse_bytes;
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let doc = parse_bytes(&data, "document.pdf").unwrap();
/// ```
pub fn parse_bytes(data: &[u8], source_file: &str) -> Result<Document> {
    PdfParser::from_bytes(data, source_file)?.parse()
}

/// Convert a PDF to Markdown.
///
/// ```no_run
/// let markdown = pdfcvt::to_markdown("document.pdf").unwrap();
/// std::fs::write("document.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::to_markdown(&doc, &RenderOptions::default()))
}

/// Convert a PDF to plain text.
pub fn to_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::to_text(&doc, &RenderOptions::default()))
}

/// Convert a PDF and write `<stem>.md` and `<stem>.txt` under `output_dir`.
///
/// ```no_run
/// let report = pdfcvt::convert_file("report.pdf", "output").unwrap();
/// println!("wrote {}", report.outputs.markdown.display());
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(path: P, output_dir: Q) -> Result<ConversionReport> {
    let options = ConvertOptions::new().with_output_dir(output_dir.as_ref());
    Converter::new(options).convert_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes_rejects_garbage() {
        assert!(matches!(parse_bytes(b"hello", "x.pdf"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_to_markdown_missing_file() {
        assert!(to_markdown("/no/such/file.pdf").is_err());
    }
}
