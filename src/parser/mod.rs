//! PDF parsing: page extraction and structure recognition.

mod extractor;
mod fragment;
mod options;
mod pdf_parser;
mod recognizer;
mod table_detector;

pub use extractor::{PageExtractor, RawPage};
pub use fragment::{estimate_text_width, is_spaceless_script_char, join_fragments, join_lines, Fragment};
pub use options::{LayoutConfig, RecognizerConfig, TableDetectorConfig};
pub use pdf_parser::PdfParser;
pub use recognizer::{FontStatistics, StructureRecognizer};
pub use table_detector::{DetectedTable, TableDetection, TableDetector};
