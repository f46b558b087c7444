//! Conversion orchestration: one PDF in, a Markdown file and a text file out.
//!
//! # Example
//!
//! ```no_run
//! use pdfcvt::convert::{ConvertOptions, Converter};
//!
//! fn main() -> pdfcvt::Result<()> {
//!     let converter = Converter::new(ConvertOptions::new().with_output_dir("out"));
//!     let report = converter.convert_file("report.pdf")?;
//!     println!("{} tables, {} images", report.stats.tables, report.stats.images);
//!     Ok(())
//! }
//! ```

mod batch;
mod progress;

pub use batch::{scan_pdfs, BatchSummary, DocumentOutcome};
pub use progress::{ConvertObserver, NoopObserver};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{ConversionStats, Document};
use crate::parser::{LayoutConfig, PdfParser};
use crate::render::{to_markdown, to_text, RenderOptions};

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Directory that receives the outputs
    pub output_dir: PathBuf,

    /// Place each document's outputs in `<output_dir>/<stem>/`
    pub per_document_dir: bool,

    /// Convert batch documents in parallel
    pub parallel: bool,

    /// Layout analysis options
    pub layout: LayoutConfig,

    /// Rendering options
    pub render: RenderOptions,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Write outputs directly into the output directory.
    pub fn flat(mut self) -> Self {
        self.per_document_dir = false;
        self
    }

    /// Enable or disable document-level parallelism.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set layout options.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            per_document_dir: true,
            parallel: false,
            layout: LayoutConfig::default(),
            render: RenderOptions::default(),
        }
    }
}

/// Where the two outputs of one document go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    /// Directory holding both files
    pub dir: PathBuf,
    /// Markdown output
    pub markdown: PathBuf,
    /// Plain text output
    pub text: PathBuf,
}

impl OutputPaths {
    /// Output locations for `source` under the given options.
    pub fn for_source(source: &Path, options: &ConvertOptions) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let dir = if options.per_document_dir {
            options.output_dir.join(&stem)
        } else {
            options.output_dir.clone()
        };
        Self {
            markdown: dir.join(format!("{}.md", stem)),
            text: dir.join(format!("{}.txt", stem)),
            dir,
        }
    }
}

/// Result of converting one document.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Input file
    pub source: PathBuf,
    /// Written files
    pub outputs: OutputPaths,
    /// Page, table and image totals
    pub stats: ConversionStats,
    /// Lines in the Markdown output
    pub markdown_lines: usize,
    /// Characters in the Markdown output
    pub markdown_chars: usize,
    /// Pages that failed to extract
    pub failed_pages: usize,
    /// The first pages carry almost no text
    pub likely_scanned: bool,
}

/// Drives extraction, recognition, rendering and writing for documents.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Conversion options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Parse a PDF into the document model.
    pub fn parse(&self, path: &Path, observer: &dyn ConvertObserver) -> Result<Document> {
        let parser = PdfParser::open_with_config(path, &self.options.layout)?;
        let name = parser.source_file().to_string();
        observer.on_document_start(&name, parser.page_count());
        parser.parse_with_progress(|page, total| observer.on_page_done(&name, page, total))
    }

    /// Render a document to Markdown and plain text.
    pub fn render(&self, doc: &Document) -> (String, String) {
        (
            to_markdown(doc, &self.options.render),
            to_text(doc, &self.options.render),
        )
    }

    /// Convert one PDF and write both outputs.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<ConversionReport> {
        self.convert_file_with_observer(path.as_ref(), &NoopObserver)
    }

    /// Convert one PDF, reporting progress to `observer`.
    pub fn convert_file_with_observer(
        &self,
        path: &Path,
        observer: &dyn ConvertObserver,
    ) -> Result<ConversionReport> {
        let name = file_name(path);
        let result = self.parse(path, observer).and_then(|doc| self.write(path, &doc));

        match &result {
            Ok(report) => log::info!(
                "Converted {}: {} pages, {} tables, {} images",
                name,
                report.stats.pages,
                report.stats.tables,
                report.stats.images
            ),
            Err(e) => log::warn!("Failed to convert {}: {}", name, e),
        }
        observer.on_document_finished(&name, result.as_ref());
        result
    }

    /// Render `doc` and write both files for `source`.
    ///
    /// Both renderings complete before anything touches the disk.
    pub fn write(&self, source: &Path, doc: &Document) -> Result<ConversionReport> {
        let (markdown, text) = self.render(doc);
        let outputs = OutputPaths::for_source(source, &self.options);

        fs::create_dir_all(&outputs.dir).map_err(|e| Error::Write {
            path: outputs.dir.clone(),
            source: e,
        })?;
        for (path, content) in [(&outputs.markdown, &markdown), (&outputs.text, &text)] {
            fs::write(path, content).map_err(|e| Error::Write {
                path: path.clone(),
                source: e,
            })?;
        }

        let likely_scanned = doc.looks_scanned();
        if likely_scanned {
            log::warn!(
                "{} appears to be a scanned PDF; OCR may be needed for usable text",
                file_name(source)
            );
        }

        Ok(ConversionReport {
            source: source.to_path_buf(),
            outputs,
            stats: doc.stats(),
            markdown_lines: markdown.lines().count(),
            markdown_chars: markdown.chars().count(),
            failed_pages: doc.failed_pages().count(),
            likely_scanned,
        })
    }

    /// Convert every PDF in `dir` (non-recursive).
    pub fn convert_dir(&self, dir: &Path, observer: &dyn ConvertObserver) -> Result<BatchSummary> {
        let files = scan_pdfs(dir)?;
        Ok(self.convert_batch(&files, observer))
    }

    /// Convert a list of PDFs. Failures are recorded, never propagated.
    pub fn convert_batch(&self, files: &[PathBuf], observer: &dyn ConvertObserver) -> BatchSummary {
        batch::run(self, files, observer)
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_output_dir("/tmp/out")
            .flat()
            .with_parallel(true);
        assert_eq!(options.output_dir, PathBuf::from("/tmp/out"));
        assert!(!options.per_document_dir);
        assert!(options.parallel);
    }

    #[test]
    fn test_output_paths() {
        let options = ConvertOptions::new().with_output_dir("out");
        let paths = OutputPaths::for_source(Path::new("in/report.PDF"), &options);
        assert_eq!(paths.dir, PathBuf::from("out/report"));
        assert_eq!(paths.markdown, PathBuf::from("out/report/report.md"));
        assert_eq!(paths.text, PathBuf::from("out/report/report.txt"));

        let paths = OutputPaths::for_source(Path::new("report.pdf"), &options.flat());
        assert_eq!(paths.markdown, PathBuf::from("out/report.md"));
    }

    #[test]
    fn test_convert_missing_file() {
        let converter = Converter::default();
        let err = converter.convert_file("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
