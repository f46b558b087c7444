//! pdfcvt CLI - convert PDFs to Markdown and plain text

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfcvt::{
    BatchSummary, ConversionReport, ConvertObserver, ConvertOptions, Converter, DocumentOutcome, Error,
    LayoutConfig,
};

const RULE_WIDTH: usize = 60;

#[derive(Parser)]
#[command(name = "pdfcvt")]
#[command(version)]
#[command(about = "Convert PDF files into Markdown and plain text", long_about = None)]
struct Cli {
    /// PDF file or directory to convert (defaults to the source directory)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output directory (overrides --output-dir)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Directory scanned when no INPUT is given
    #[arg(long, env = "PDFCVT_SOURCE", default_value = "source", value_name = "DIR")]
    source: PathBuf,

    /// Directory that receives the converted files
    #[arg(long, env = "PDFCVT_OUTPUT", default_value = "output", value_name = "DIR")]
    output_dir: PathBuf,

    /// Write files directly into the output directory instead of one folder per PDF
    #[arg(long)]
    flat: bool,

    /// Convert documents in parallel
    #[arg(long)]
    parallel: bool,

    /// Treat aligned text as paragraphs instead of detecting tables
    #[arg(long)]
    no_tables: bool,

    /// Write a JSON batch summary to this file
    #[arg(long, value_name = "FILE")]
    summary_json: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn convert_options(&self) -> ConvertOptions {
        let mut layout = LayoutConfig::default();
        if self.no_tables {
            layout = layout.without_tables();
        }
        let mut options = ConvertOptions::new()
            .with_output_dir(self.output.clone().unwrap_or_else(|| self.output_dir.clone()))
            .with_parallel(self.parallel)
            .with_layout(layout);
        if self.flat {
            options = options.flat();
        }
        log::debug!("Conversion options: {:?}", options);
        options
    }
}

/// Drives an indicatif bar from conversion events.
///
/// In page mode the bar tracks pages of the current document; otherwise it
/// counts finished documents, which stays meaningful when documents run in
/// parallel.
struct ProgressObserver {
    bar: ProgressBar,
    per_page: bool,
}

impl ProgressObserver {
    fn pages() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(bar_style("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} pages {msg}"));
        Self { bar, per_page: true }
    }

    fn documents(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(bar_style("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files {msg}"));
        Self { bar, per_page: false }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConvertObserver for ProgressObserver {
    fn on_document_start(&self, source: &str, page_count: u32) {
        if self.per_page {
            self.bar.reset();
            self.bar.set_length(page_count as u64);
            self.bar.set_message(source.to_string());
        }
    }

    fn on_page_done(&self, _source: &str, page: u32, _total: u32) {
        if self.per_page {
            self.bar.set_position(page as u64);
        }
    }

    fn on_document_finished(&self, source: &str, result: Result<&ConversionReport, &Error>) {
        if !self.per_page {
            self.bar.inc(1);
            self.bar.set_message(source.to_string());
        }
        if let Ok(report) = result {
            if report.likely_scanned {
                self.bar.println(format!(
                    "{} {} appears to be a scanned PDF. OCR may be needed for better results.",
                    "Warning:".yellow().bold(),
                    source
                ));
            }
        }
    }
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match &cli.input {
        Some(input) if input.is_file() => cmd_single(&cli, input),
        Some(input) => cmd_batch(&cli, input, false),
        None => {
            println!("{}", "Batch conversion mode (default paths)".cyan());
            println!();
            cmd_batch(&cli, &cli.source, true)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_single(cli: &Cli, input: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let converter = Converter::new(cli.convert_options());
    let observer = ProgressObserver::pages();
    let result = converter.convert_file_with_observer(input, &observer);
    observer.finish();

    match result {
        Ok(report) => {
            print_success(&report);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{} {}", "Failed:".red().bold(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_batch(cli: &Cli, source: &Path, create_missing: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if !source.exists() {
        if !create_missing {
            return Err(format!("'{}' does not exist", source.display()).into());
        }
        println!(
            "{} Source directory '{}' does not exist.",
            "Error:".red().bold(),
            source.display()
        );
        fs::create_dir_all(source)?;
        log::info!("Created missing source directory {}", source.display());
        println!("{} Created: {}", "OK".green().bold(), source.display());
        println!("   Please place PDF files in this directory and run again.");
        return Ok(ExitCode::SUCCESS);
    }

    let files = pdfcvt::convert::scan_pdfs(source)?;
    if files.is_empty() {
        println!("{} No PDF files found in '{}'", "Warning:".yellow().bold(), source.display());
        println!("   Please place PDF files in this directory.");
        return Ok(ExitCode::SUCCESS);
    }

    let options = cli.convert_options();
    println!("Source: {}", source.display());
    println!("Output: {}", options.output_dir.display());
    println!("Found {} PDF file(s)", files.len());
    println!();

    let converter = Converter::new(options);
    let observer = if cli.parallel {
        ProgressObserver::documents(files.len())
    } else {
        ProgressObserver::pages()
    };
    let summary = converter.convert_batch(&files, &observer);
    observer.finish();

    let total = summary.total();
    for (i, outcome) in summary.documents().iter().enumerate() {
        print_outcome_header(&format!("[{}/{}] {}", i + 1, total, outcome.file_name()));
        match outcome {
            DocumentOutcome::Converted { report, .. } => print_success(report),
            DocumentOutcome::Failed { error, .. } => {
                println!("{} {}", "Failed:".red().bold(), error);
                println!();
            }
        }
    }

    print_summary(&summary, &converter.options().output_dir);

    if let Some(path) = &cli.summary_json {
        fs::write(path, summary.to_json()?)?;
        println!("Summary written to {}", path.display());
    }

    Ok(if summary.failed() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_outcome_header(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{}", rule);
    println!("{}", title.bold());
    println!("{}", rule);
}

fn print_success(report: &ConversionReport) {
    println!("{}", "Success!".green().bold());
    println!("   Markdown: {}", report.outputs.markdown.display());
    println!("   Text:     {}", report.outputs.text.display());
    println!(
        "   Pages: {}, Tables: {}, Images: {}",
        report.stats.pages, report.stats.tables, report.stats.images
    );
    println!("   Lines: {}, Size: {} chars", report.markdown_lines, report.markdown_chars);
    if report.failed_pages > 0 {
        println!(
            "   {} {} page(s) could not be extracted",
            "Warning:".yellow().bold(),
            report.failed_pages
        );
    }
    println!();
}

fn print_summary(summary: &BatchSummary, output_dir: &Path) {
    print_outcome_header("Conversion Summary");
    println!("{} {}", "Successful:".green(), summary.succeeded());
    println!("{} {}", "Failed:".red(), summary.failed());
    if summary.succeeded() > 0 {
        let totals = summary.totals();
        println!("Total tables: {}", totals.tables);
        println!("Total images detected: {}", totals.images);
    }
    println!();
    println!("All converted files are in: {}", output_dir.display());
}
