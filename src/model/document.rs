//! Document-level types.

use super::{ConversionStats, Page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author shown when the PDF does not name one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Pages inspected when deciding whether a document is a scan.
const SCAN_CHECK_PAGES: usize = 3;

/// Below this many visible characters in the inspected pages, the
/// document is treated as image-only.
const SCAN_TEXT_THRESHOLD: usize = 100;

/// A converted PDF document.
///
/// Built once by [`DocumentBuilder`](super::DocumentBuilder); there is no
/// way to mutate it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    metadata: Metadata,
    pages: Vec<Page>,
}

impl Document {
    pub(super) fn from_parts(metadata: Metadata, pages: Vec<Page>) -> Self {
        Self { metadata, pages }
    }

    /// Document metadata (title, author, etc.)
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Pages in reading order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn page(&self, number: u32) -> Option<&Page> {
        if number == 0 {
            return None;
        }
        self.pages.get((number - 1) as usize)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Table, image and page totals summed over all pages.
    pub fn stats(&self) -> ConversionStats {
        ConversionStats::from_pages(&self.pages)
    }

    /// Pages whose extraction failed.
    pub fn failed_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|p| p.is_failed())
    }

    /// Whether the document looks like a scan with no text layer.
    pub fn looks_scanned(&self) -> bool {
        if self.pages.is_empty() {
            return false;
        }
        let text_len: usize = self
            .pages
            .iter()
            .take(SCAN_CHECK_PAGES)
            .map(Page::text_len)
            .sum();
        text_len < SCAN_TEXT_THRESHOLD
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date recorded in the PDF
    pub created: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages
    pub page_count: u32,

    /// File name of the source PDF (e.g., "report.pdf")
    pub source_file: String,
}

impl Metadata {
    /// Create metadata for a source file.
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            ..Default::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the total page count.
    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = page_count;
        self
    }

    /// Title to display: the PDF title, else the source file stem.
    pub fn display_title(&self) -> String {
        match non_blank(&self.title) {
            Some(title) => title.to_string(),
            None => std::path::Path::new(&self.source_file)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
        }
    }

    /// Author to display: the PDF author, else [`UNKNOWN_AUTHOR`].
    pub fn display_author(&self) -> &str {
        non_blank(&self.author).unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self, include_source: bool) -> String {
        let mut lines = vec!["---".to_string()];

        lines.push(format!("title: \"{}\"", escape_yaml(&self.display_title())));
        lines.push(format!("author: \"{}\"", escape_yaml(self.display_author())));
        lines.push(format!("pages: {}", self.page_count));

        if let Some(ref created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }
        if include_source && !self.source_file.is_empty() {
            lines.push(format!("source_file: \"{}\"", escape_yaml(&self.source_file)));
        }

        lines.push("---".to_string());
        lines.join("\n")
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
