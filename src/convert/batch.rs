//! Batch conversion over a directory of PDFs.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use super::{file_name, ConversionReport, ConvertObserver, Converter, OutputPaths};
use crate::detect::has_pdf_extension;
use crate::error::{Error, Result};
use crate::model::ConversionStats;

/// List the PDF files directly inside `dir`, sorted by file name.
pub fn scan_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// What happened to one document of a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// Both outputs were written
    Converted {
        /// Input file name
        file_name: String,
        /// Conversion details
        report: ConversionReport,
    },
    /// The document could not be converted
    Failed {
        /// Input file name
        file_name: String,
        /// Why
        error: String,
    },
}

impl DocumentOutcome {
    fn from_result(source: &Path, result: Result<ConversionReport>) -> Self {
        let file_name = file_name(source);
        match result {
            Ok(report) => DocumentOutcome::Converted { file_name, report },
            Err(e) => DocumentOutcome::Failed {
                file_name,
                error: e.to_string(),
            },
        }
    }

    /// Input file name.
    pub fn file_name(&self) -> &str {
        match self {
            DocumentOutcome::Converted { file_name, .. } | DocumentOutcome::Failed { file_name, .. } => file_name,
        }
    }

    /// Whether the document converted.
    pub fn is_success(&self) -> bool {
        matches!(self, DocumentOutcome::Converted { .. })
    }

    /// The conversion report, when the document converted.
    pub fn report(&self) -> Option<&ConversionReport> {
        match self {
            DocumentOutcome::Converted { report, .. } => Some(report),
            DocumentOutcome::Failed { .. } => None,
        }
    }
}

/// Accumulated results of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    succeeded: usize,
    failed: usize,
    totals: ConversionStats,
    documents: Vec<DocumentOutcome>,
}

impl BatchSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one document.
    pub fn record(&mut self, outcome: DocumentOutcome) {
        match outcome.report() {
            Some(report) => {
                self.succeeded += 1;
                self.totals.merge(&report.stats);
            }
            None => self.failed += 1,
        }
        self.documents.push(outcome);
    }

    /// Documents converted.
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Documents that failed.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Documents seen.
    pub fn total(&self) -> usize {
        self.documents.len()
    }

    /// Summed statistics over converted documents.
    pub fn totals(&self) -> ConversionStats {
        self.totals
    }

    /// Per-document outcomes in input order.
    pub fn documents(&self) -> &[DocumentOutcome] {
        &self.documents
    }

    /// Serialize the summary as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Other(e.to_string()))
    }
}

/// Convert `files`, sequentially or in parallel per the converter options.
///
/// Outcomes are recorded in input order either way. A file whose outputs
/// would overwrite an earlier file's is failed without being converted.
pub(super) fn run(converter: &Converter, files: &[PathBuf], observer: &dyn ConvertObserver) -> BatchSummary {
    let mut claimed = HashSet::new();
    let jobs: Vec<(&PathBuf, bool)> = files
        .iter()
        .map(|f| {
            let paths = OutputPaths::for_source(f, converter.options());
            (f, claimed.insert(paths.markdown))
        })
        .collect();

    let convert = |(path, unique): &(&PathBuf, bool)| {
        let result = if *unique {
            converter.convert_file_with_observer(path, observer)
        } else {
            Err(Error::Other(format!(
                "outputs for {} collide with another file in the batch",
                file_name(path)
            )))
        };
        DocumentOutcome::from_result(path, result)
    };

    let outcomes: Vec<DocumentOutcome> = if converter.options().parallel {
        jobs.par_iter().map(convert).collect()
    } else {
        jobs.iter().map(convert).collect()
    };

    let mut summary = BatchSummary::new();
    for outcome in outcomes {
        summary.record(outcome);
    }
    log::info!(
        "Batch finished: {} converted, {} failed",
        summary.succeeded(),
        summary.failed()
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::OutputPaths;
    use tempfile::TempDir;

    fn report(tables: u32, images: u32) -> ConversionReport {
        ConversionReport {
            source: PathBuf::from("a.pdf"),
            outputs: OutputPaths {
                dir: PathBuf::from("out"),
                markdown: PathBuf::from("out/a.md"),
                text: PathBuf::from("out/a.txt"),
            },
            stats: ConversionStats {
                pages: 1,
                tables,
                images,
            },
            markdown_lines: 10,
            markdown_chars: 100,
            failed_pages: 0,
            likely_scanned: false,
        }
    }

    #[test]
    fn test_summary_accumulates() {
        let mut summary = BatchSummary::new();
        summary.record(DocumentOutcome::from_result(Path::new("a.pdf"), Ok(report(2, 1))));
        summary.record(DocumentOutcome::from_result(
            Path::new("b.pdf"),
            Err(Error::Model("gap".into())),
        ));
        summary.record(DocumentOutcome::from_result(Path::new("c.pdf"), Ok(report(1, 3))));

        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.totals().tables, 3);
        assert_eq!(summary.totals().images, 4);
        assert_eq!(summary.documents()[1].file_name(), "b.pdf");

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["succeeded"], 2);
        assert_eq!(json["documents"][1]["status"], "failed");
        assert_eq!(json["totals"]["images"], 4);
    }

    #[test]
    fn test_scan_pdfs_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf.bak"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let files = scan_pdfs(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_scan_missing_dir() {
        assert!(scan_pdfs(Path::new("/no/such/dir")).is_err());
    }
}
