//! PDF document parser using lopdf.

use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::extractor::{decode_text_simple, PageExtractor, RawPage};
use super::options::LayoutConfig;
use super::recognizer::StructureRecognizer;
use crate::detect::{detect_version_from_bytes, detect_version_from_path};
use crate::error::{Error, Result};
use crate::model::{Document, DocumentBuilder, Metadata, Page};

/// PDF document parser.
///
/// Owns the loaded PDF for the duration of one conversion; the handle is
/// released when the parser is dropped.
pub struct PdfParser {
    doc: LopdfDocument,
    source_file: String,
    pdf_version: String,
    recognizer: StructureRecognizer,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, &LayoutConfig::default())
    }

    /// Open a PDF file with custom layout options.
    pub fn open_with_config<P: AsRef<Path>>(path: P, layout: &LayoutConfig) -> Result<Self> {
        let path = path.as_ref();
        let pdf_version = detect_version_from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        let source_file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        log::debug!("Opened {} (PDF {})", source_file, pdf_version);
        Ok(Self::from_parts(doc, source_file, pdf_version, layout))
    }

    /// Parse a PDF held in memory. `source_file` names it in the metadata.
    pub fn from_bytes(data: &[u8], source_file: impl Into<String>) -> Result<Self> {
        Self::from_bytes_with_config(data, source_file, &LayoutConfig::default())
    }

    /// Parse a PDF held in memory with custom layout options.
    pub fn from_bytes_with_config(
        data: &[u8],
        source_file: impl Into<String>,
        layout: &LayoutConfig,
    ) -> Result<Self> {
        let pdf_version = detect_version_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_parts(doc, source_file.into(), pdf_version, layout))
    }

    fn from_parts(doc: LopdfDocument, source_file: String, pdf_version: String, layout: &LayoutConfig) -> Self {
        if doc.is_encrypted() {
            log::warn!("{} is encrypted; extracted text may be unreadable", source_file);
        }
        Self {
            doc,
            source_file,
            pdf_version,
            recognizer: StructureRecognizer::with_config(layout),
        }
    }

    /// Total number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// File name of the source PDF.
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Read the document information dictionary.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new(self.source_file.clone()).with_page_count(self.page_count());
        metadata.pdf_version = self.pdf_version.clone();

        if let Some(info) = self.info_dictionary() {
            metadata.title = get_string_from_dict(info, b"Title");
            metadata.author = get_string_from_dict(info, b"Author");
            metadata.subject = get_string_from_dict(info, b"Subject");
            metadata.creator = get_string_from_dict(info, b"Creator");
            metadata.producer = get_string_from_dict(info, b"Producer");
            metadata.created = get_string_from_dict(info, b"CreationDate").and_then(|d| parse_pdf_date(&d));
        }

        metadata
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Extract the raw fragments and image count of a page (0-based index).
    pub fn extract_page(&self, index: u32) -> Result<RawPage> {
        PageExtractor::new(&self.doc).extract(index + 1)
    }

    /// Extract and recognize one page (0-based index).
    pub fn parse_page(&self, index: u32) -> Result<Page> {
        let raw = self.extract_page(index)?;
        let blocks = self.recognizer.recognize(&raw.fragments);
        Ok(Page::new(index + 1, blocks, raw.image_count))
    }

    /// Parse the whole document.
    pub fn parse(&self) -> Result<Document> {
        self.parse_with_progress(|_, _| {})
    }

    /// Parse the whole document, calling `on_page(page_number, total)` after
    /// each page.
    ///
    /// A page that fails to extract becomes an empty page carrying the
    /// failure reason; the other pages are unaffected.
    pub fn parse_with_progress<F>(&self, mut on_page: F) -> Result<Document>
    where
        F: FnMut(u32, u32),
    {
        let extractor = PageExtractor::new(&self.doc);
        let total = extractor.page_count();
        let mut builder = DocumentBuilder::new(self.metadata());

        for number in 1..=total {
            let page = match extractor.extract(number) {
                Ok(raw) => Page::new(number, self.recognizer.recognize(&raw.fragments), raw.image_count),
                Err(Error::Extraction { message, .. }) => {
                    log::warn!("{}: page {} could not be extracted: {}", self.source_file, number, message);
                    Page::failed(number, message)
                }
                Err(e) => return Err(e),
            };
            builder.push(page);
            on_page(number, total);
        }

        builder.build()
    }
}

/// Read a text string from an info dictionary entry.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let value = match dict.get(key).ok()? {
        Object::String(bytes, _) => decode_text_simple(bytes),
        Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        _ => return None,
    };
    let value = value.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let field = |range: std::ops::Range<usize>, default: u32| {
        s.get(range).and_then(|v| v.parse().ok()).unwrap_or(default)
    };
    let month = field(4..6, 1);
    let day = field(6..8, 1);
    let hour = field(8..10, 0);
    let minute = field(10..12, 0);
    let second = field(12..14, 0);

    let local = chrono::NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;

    // Timezone: Z, or +HH'mm' / -HH'mm'
    let offset_minutes = match s.get(14..15) {
        Some(sign @ ("+" | "-")) => {
            let hours: i64 = s.get(15..17).and_then(|v| v.parse().ok()).unwrap_or(0);
            let minutes: i64 = s.get(18..20).and_then(|v| v.parse().ok()).unwrap_or(0);
            let total = hours * 60 + minutes;
            if sign == "-" {
                -total
            } else {
                total
            }
        }
        _ => 0,
    };

    let utc = local - chrono::Duration::minutes(offset_minutes);
    Some(chrono::DateTime::from_naive_utc_and_offset(utc, chrono::Utc))
}
