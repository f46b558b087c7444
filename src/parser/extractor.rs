//! Page extraction: walks a page content stream and emits positioned
//! text fragments, plus the number of images the page references.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use unicode_normalization::UnicodeNormalization;

use super::fragment::{estimate_text_width, is_spaceless_script_char, Fragment};
use crate::error::{Error, Result};

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// TJ adjustment (thousandths of an em) treated as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Leading factor used by `T*` when the content never set `TL`.
const DEFAULT_LEADING_FACTOR: f32 = 1.2;

/// Maximum depth when walking inherited page attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Raw extraction result for one page.
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    /// Text fragments in content-stream order
    pub fragments: Vec<Fragment>,
    /// Number of image XObjects the page references
    pub image_count: usize,
}

/// Extracts fragments from the pages of a loaded PDF.
pub struct PageExtractor<'a> {
    doc: &'a LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl<'a> PageExtractor<'a> {
    /// Create an extractor over a loaded document.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self {
            doc,
            pages: doc.get_pages(),
        }
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Extract page `page_num` (1-based).
    ///
    /// Any failure is reported as [`Error::Extraction`] for that page.
    pub fn extract(&self, page_num: u32) -> Result<RawPage> {
        let page_id = *self
            .pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, self.page_count()))?;
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::extraction(page_num, e.to_string()))?;

        let [x0, y0, _, y1] = self.media_box(page_dict);
        let height = y1 - y0;

        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::extraction(page_num, e.to_string()))?;
        let content = self.page_content(page_num, page_dict)?;
        let operations = Content::decode(&content)
            .map_err(|e| Error::extraction(page_num, e.to_string()))?
            .operations;

        let mut walker = ContentWalker::new(Some(self.doc), &fonts);
        for op in &operations {
            walker.apply(&op.operator, &op.operands);
        }

        let fragments = walker
            .into_runs()
            .into_iter()
            .map(|run| {
                Fragment::from_baseline(run.text, run.x - x0, run.y - y0, run.size, height)
                    .on_page(page_num - 1)
            })
            .collect::<Vec<_>>();

        let image_count = self.image_count(page_dict);
        log::debug!(
            "Page {}: {} fragments, {} images",
            page_num,
            fragments.len(),
            image_count
        );

        Ok(RawPage { fragments, image_count })
    }

    /// Look up an attribute on the page or the nearest ancestor that has it.
    fn inherited(&self, page_dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut dict = page_dict;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn media_box(&self, page_dict: &'a Dictionary) -> [f32; 4] {
        let values: Option<Vec<f32>> = self
            .inherited(page_dict, b"MediaBox")
            .and_then(|obj| self.resolve(obj).as_array().ok())
            .map(|array| array.iter().filter_map(get_number).collect());

        match values.as_deref() {
            Some(&[x0, y0, x1, y1]) if x1 > x0 && y1 > y0 => [x0, y0, x1, y1],
            _ => DEFAULT_MEDIA_BOX,
        }
    }

    fn resolve<'o>(&'o self, obj: &'o Object) -> &'o Object {
        match obj {
            Object::Reference(r) => self.doc.get_object(*r).unwrap_or(obj),
            _ => obj,
        }
    }

    /// Get page content stream.
    fn page_content(&self, page_num: u32, page_dict: &Dictionary) -> Result<Vec<u8>> {
        let Ok(contents) = page_dict.get(b"Contents") else {
            // A page without content is blank, not broken.
            return Ok(Vec::new());
        };

        let invalid = || Error::extraction(page_num, "invalid content stream");
        match self.resolve(contents) {
            Object::Stream(s) => Ok(s.decompressed_content().unwrap_or_else(|_| s.content.clone())),
            Object::Array(parts) => {
                let mut content = Vec::new();
                for part in parts {
                    match self.resolve(part) {
                        Object::Stream(s) => {
                            let data = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                        _ => return Err(invalid()),
                    }
                }
                Ok(content)
            }
            _ => Err(invalid()),
        }
    }

    /// Count the image XObjects in the page resources.
    fn image_count(&self, page_dict: &'a Dictionary) -> usize {
        let Some(resources) = self
            .inherited(page_dict, b"Resources")
            .and_then(|obj| self.resolve(obj).as_dict().ok())
        else {
            return 0;
        };
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| self.resolve(obj).as_dict().ok())
        else {
            return 0;
        };

        xobjects
            .iter()
            .filter(|(_, obj)| match self.resolve(obj) {
                Object::Stream(stream) => matches!(
                    stream.dict.get(b"Subtype").and_then(Object::as_name_str),
                    Ok("Image")
                ),
                _ => false,
            })
            .count()
    }
}

/// An affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        Some(Self {
            a: get_number(&operands[0])?,
            b: get_number(&operands[1])?,
            c: get_number(&operands[2])?,
            d: get_number(&operands[3])?,
            e: get_number(&operands[4])?,
            f: get_number(&operands[5])?,
        })
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// `self × other`
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Length of the transformed y unit vector.
    fn vertical_scale(&self) -> f32 {
        self.c.hypot(self.d)
    }
}

/// A decoded text run at a device-space baseline position.
#[derive(Debug, Clone, PartialEq)]
struct TextRun {
    text: String,
    x: f32,
    y: f32,
    size: f32,
}

/// Text state machine over content stream operators.
struct ContentWalker<'d> {
    doc: Option<&'d LopdfDocument>,
    fonts: &'d BTreeMap<Vec<u8>, &'d Dictionary>,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: Option<f32>,
    font_name: Vec<u8>,
    font_size: f32,
    in_text: bool,
    runs: Vec<TextRun>,
}

impl<'d> ContentWalker<'d> {
    fn new(doc: Option<&'d LopdfDocument>, fonts: &'d BTreeMap<Vec<u8>, &'d Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            leading: None,
            font_name: Vec::new(),
            font_size: 12.0,
            in_text: false,
            runs: Vec::new(),
        }
    }

    fn into_runs(self) -> Vec<TextRun> {
        self.runs
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.multiply(&self.ctm);
                }
            }
            "BT" => {
                self.in_text = true;
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let [Object::Name(name), size, ..] = operands {
                    self.font_name = name.clone();
                    self.font_size = get_number(size).unwrap_or(12.0);
                }
            }
            "TL" => self.leading = operands.first().and_then(get_number),
            "Td" | "TD" => {
                if let [tx, ty, ..] = operands {
                    let tx = get_number(tx).unwrap_or(0.0);
                    let ty = get_number(ty).unwrap_or(0.0);
                    if operator == "TD" {
                        self.leading = Some(-ty);
                    }
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = self.decode(bytes);
                    self.show(text, 0.0);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show_array(items);
                }
            }
            "'" | "\"" => {
                self.next_line();
                let index = if operator == "\"" { 2 } else { 0 };
                if let Some(Object::String(bytes, _)) = operands.get(index) {
                    let text = self.decode(bytes);
                    self.show(text, 0.0);
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self
            .leading
            .filter(|l| *l != 0.0)
            .unwrap_or(self.font_size * DEFAULT_LEADING_FACTOR);
        self.move_line(0.0, -leading);
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self.doc.and_then(|doc| {
            self.fonts
                .get(&self.font_name)
                .and_then(|font| font.get_font_encoding(doc).ok())
        });
        match encoding {
            Some(enc) => LopdfDocument::decode_text(&enc, bytes).unwrap_or_default(),
            None => decode_text_simple(bytes),
        }
    }

    /// TJ: strings interleaved with adjustments in thousandths of an em.
    /// Large negative adjustments are word spaces.
    fn show_array(&mut self, items: &[Object]) {
        let mut combined = String::new();
        let mut adjustment_total = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(bytes)),
                other => {
                    let Some(n) = get_number(other) else { continue };
                    adjustment_total += n;
                    let space_wanted = -n > TJ_SPACE_THRESHOLD
                        && combined
                            .chars()
                            .last()
                            .is_some_and(|c| !c.is_whitespace() && c != '\u{00A0}' && !is_spaceless_script_char(c));
                    if space_wanted {
                        combined.push(' ');
                    }
                }
            }
        }
        self.show(combined, -adjustment_total / 1000.0 * self.font_size);
    }

    /// Record a run at the current position and advance past it.
    fn show(&mut self, text: String, extra_advance: f32) {
        let advance = estimate_text_width(&text, self.font_size) + extra_advance;
        if self.in_text && !text.trim().is_empty() {
            let device = self.text_matrix.multiply(&self.ctm);
            let text: String = text.nfc().collect();
            self.runs.push(TextRun {
                text,
                x: device.e,
                y: device.f,
                size: self.font_size * device.vertical_scale(),
            });
        }
        self.text_matrix = Matrix::translation(advance, 0.0).multiply(&self.text_matrix);
    }
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decode bytes when the font has no usable encoding.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
