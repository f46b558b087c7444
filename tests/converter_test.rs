//! Integration tests for single-file and batch conversion.

mod common;

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{body_page, title_and_table_pdf, PageContent, PdfBuilder};
use pdfcvt::convert::{ConvertObserver, ConvertOptions, Converter};
use pdfcvt::{ConversionReport, Error};
use tempfile::TempDir;

#[derive(Default)]
struct CountingObserver {
    started: AtomicUsize,
    pages: AtomicUsize,
    finished: AtomicUsize,
    failed: AtomicUsize,
}

impl ConvertObserver for CountingObserver {
    fn on_document_start(&self, _source: &str, _page_count: u32) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_page_done(&self, _source: &str, _page: u32, _total: u32) {
        self.pages.fetch_add(1, Ordering::SeqCst);
    }

    fn on_document_finished(&self, _source: &str, result: Result<&ConversionReport, &Error>) {
        self.finished.fetch_add(1, Ordering::SeqCst);
        if result.is_err() {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn write_sources(dir: &TempDir) {
    fs::write(dir.path().join("table.pdf"), title_and_table_pdf()).unwrap();
    let notes = PdfBuilder::new()
        .page(body_page("one"))
        .page(PageContent::WithImages(vec![common::text("Chart", 72, 700, 10)], 3))
        .build();
    fs::write(dir.path().join("notes.PDF"), notes).unwrap();
    fs::write(dir.path().join("corrupt.pdf"), b"this is not a pdf").unwrap();
    fs::write(dir.path().join("readme.txt"), b"ignored").unwrap();
}

#[test]
fn test_convert_file_writes_both_outputs() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let input = src.path().join("example.pdf");
    fs::write(&input, title_and_table_pdf()).unwrap();

    let report = pdfcvt::convert_file(&input, out.path()).unwrap();

    assert_eq!(report.outputs.markdown, out.path().join("example").join("example.md"));
    assert_eq!(report.outputs.text, out.path().join("example").join("example.txt"));
    assert_eq!(report.stats.pages, 1);
    assert_eq!(report.stats.tables, 1);
    assert_eq!(report.stats.images, 0);
    assert_eq!(report.failed_pages, 0);

    let md = fs::read_to_string(&report.outputs.markdown).unwrap();
    let txt = fs::read_to_string(&report.outputs.text).unwrap();
    assert_eq!(report.markdown_lines, md.lines().count());
    assert_eq!(report.markdown_chars, md.chars().count());
    assert!(md.contains("| 항목 | 값 |"));
    assert!(txt.contains("[TABLE]\n항목\t값\n온도\t98℃"));
    assert!(md.ends_with('\n') && !md.ends_with("\n\n"));
    assert!(txt.ends_with('\n') && !txt.ends_with("\n\n"));
}

#[test]
fn test_flat_output_layout() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let input = src.path().join("example.pdf");
    fs::write(&input, title_and_table_pdf()).unwrap();

    let converter = Converter::new(ConvertOptions::new().with_output_dir(out.path()).flat());
    let report = converter.convert_file(&input).unwrap();
    assert_eq!(report.outputs.markdown, out.path().join("example.md"));
    assert!(out.path().join("example.txt").is_file());
}

#[test]
fn test_conversion_is_repeatable() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let input = src.path().join("example.pdf");
    fs::write(&input, title_and_table_pdf()).unwrap();

    let converter = Converter::new(ConvertOptions::new().with_output_dir(out.path()));
    let first = converter.convert_file(&input).unwrap();
    let md1 = fs::read(&first.outputs.markdown).unwrap();
    let txt1 = fs::read(&first.outputs.text).unwrap();
    let second = converter.convert_file(&input).unwrap();
    assert_eq!(md1, fs::read(&second.outputs.markdown).unwrap());
    assert_eq!(txt1, fs::read(&second.outputs.text).unwrap());
}

#[test]
fn test_unwritable_output_is_write_error() {
    let src = TempDir::new().unwrap();
    let input = src.path().join("example.pdf");
    fs::write(&input, title_and_table_pdf()).unwrap();
    // A regular file where the output directory should be.
    let blocker = src.path().join("blocker");
    fs::write(&blocker, b"").unwrap();

    let converter = Converter::new(ConvertOptions::new().with_output_dir(&blocker));
    let err = converter.convert_file(&input).unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
}

#[test]
fn test_batch_continues_after_failure() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_sources(&src);

    let observer = CountingObserver::default();
    let converter = Converter::new(ConvertOptions::new().with_output_dir(out.path()));
    let summary = converter.convert_dir(src.path(), &observer).unwrap();

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.totals().tables, 1);
    assert_eq!(summary.totals().images, 3);

    let names: Vec<&str> = summary.documents().iter().map(|d| d.file_name()).collect();
    assert_eq!(names, vec!["corrupt.pdf", "notes.PDF", "table.pdf"]);
    assert!(!summary.documents()[0].is_success());

    assert!(out.path().join("notes").join("notes.md").is_file());
    assert!(out.path().join("table").join("table.txt").is_file());
    assert!(!out.path().join("corrupt").exists());

    assert_eq!(observer.finished.load(Ordering::SeqCst), 3);
    assert_eq!(observer.failed.load(Ordering::SeqCst), 1);
    assert_eq!(observer.started.load(Ordering::SeqCst), 2);
    assert_eq!(observer.pages.load(Ordering::SeqCst), 3);

    let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
    assert_eq!(json["failed"], 1);
    assert_eq!(json["documents"][2]["report"]["stats"]["tables"], 1);
}

#[test]
fn test_parallel_batch_matches_sequential() {
    let src = TempDir::new().unwrap();
    write_sources(&src);

    let seq_out = TempDir::new().unwrap();
    let par_out = TempDir::new().unwrap();
    let observer = pdfcvt::NoopObserver;

    let sequential = Converter::new(ConvertOptions::new().with_output_dir(seq_out.path()))
        .convert_dir(src.path(), &observer)
        .unwrap();
    let parallel = Converter::new(
        ConvertOptions::new()
            .with_output_dir(par_out.path())
            .with_parallel(true),
    )
    .convert_dir(src.path(), &observer)
    .unwrap();

    assert_eq!(sequential.succeeded(), parallel.succeeded());
    assert_eq!(sequential.totals(), parallel.totals());
    for name in ["notes", "table"] {
        for ext in ["md", "txt"] {
            let file = format!("{}/{}.{}", name, name, ext);
            assert_eq!(
                fs::read(seq_out.path().join(&file)).unwrap(),
                fs::read(par_out.path().join(&file)).unwrap()
            );
        }
    }
}

#[test]
fn test_colliding_outputs_fail_second_file() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let sub = src.path().join("other");
    fs::create_dir(&sub).unwrap();
    let first = src.path().join("same.pdf");
    let second = sub.join("same.pdf");
    fs::write(&first, title_and_table_pdf()).unwrap();
    fs::write(&second, title_and_table_pdf()).unwrap();

    let converter = Converter::new(ConvertOptions::new().with_output_dir(out.path()));
    let summary = converter.convert_batch(&[first, second], &pdfcvt::NoopObserver);
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 1);
    assert!(summary.documents()[0].is_success());
}
