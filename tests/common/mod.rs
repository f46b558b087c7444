//! Builds small PDFs in memory for the integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Text placed at a baseline position.
pub struct Text {
    pub text: String,
    pub x: i64,
    pub baseline: i64,
    pub size: i64,
}

pub fn text(text: &str, x: i64, baseline: i64, size: i64) -> Text {
    Text {
        text: text.to_string(),
        x,
        baseline,
        size,
    }
}

/// What a page of the test PDF contains.
pub enum PageContent {
    /// Text drawn with Helvetica (WinAnsiEncoding)
    Latin(Vec<Text>),
    /// Text drawn with a font that has no resource entry; the extractor
    /// falls back to decoding the raw UTF-8 bytes
    Unicode(Vec<Text>),
    /// Text plus `n` image XObjects in the resources
    WithImages(Vec<Text>, usize),
    /// A page whose Contents entry is not a stream
    Broken,
    /// A page without content
    Blank,
}

pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            pages_id,
            font_id,
            kids: Vec::new(),
        }
    }

    pub fn page(mut self, content: PageContent) -> Self {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
        };
        let mut resources = dictionary! {
            "Font" => dictionary! { "F1" => self.font_id },
        };

        match content {
            PageContent::Latin(texts) => {
                let id = self.content(&texts, "F1");
                page.set("Contents", id);
            }
            PageContent::Unicode(texts) => {
                let id = self.content(&texts, "U1");
                page.set("Contents", id);
            }
            PageContent::WithImages(texts, count) => {
                let id = self.content(&texts, "F1");
                page.set("Contents", id);
                let mut xobjects = Dictionary::new();
                for i in 0..count {
                    let image = Stream::new(
                        dictionary! {
                            "Type" => "XObject",
                            "Subtype" => "Image",
                            "Width" => 1,
                            "Height" => 1,
                            "ColorSpace" => "DeviceGray",
                            "BitsPerComponent" => 8,
                        },
                        vec![0u8],
                    );
                    let image_id = self.doc.add_object(image);
                    xobjects.set(format!("Im{}", i + 1), image_id);
                }
                resources.set("XObject", xobjects);
            }
            PageContent::Broken => page.set("Contents", 42),
            PageContent::Blank => {}
        }

        page.set("Resources", resources);
        let page_id = self.doc.add_object(page);
        self.kids.push(page_id.into());
        self
    }

    pub fn info(mut self, info: Dictionary) -> Self {
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);
        self
    }

    fn content(&mut self, texts: &[Text], font: &str) -> ObjectId {
        let mut operations = Vec::new();
        for t in texts {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![font.into(), t.size.into()]));
            operations.push(Operation::new("Td", vec![t.x.into(), t.baseline.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(t.text.as_bytes().to_vec())]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let data = content.encode().expect("content encodes");
        self.doc.add_object(Stream::new(dictionary! {}, data))
    }

    pub fn build(mut self) -> Vec<u8> {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).expect("pdf saves");
        bytes
    }
}

/// The one-page document from the title-and-table example: a large title
/// above a 2x2 table of Korean labels.
pub fn title_and_table_pdf() -> Vec<u8> {
    PdfBuilder::new()
        .page(PageContent::Unicode(vec![
            text("Title Page", 72, 780, 24),
            text("항목", 72, 700, 10),
            text("값", 200, 700, 10),
            text("온도", 72, 686, 10),
            text("98℃", 200, 686, 10),
        ]))
        .build()
}

/// A page of plain body text.
pub fn body_page(label: &str) -> PageContent {
    PageContent::Latin(vec![
        text(&format!("Notes for {}", label), 72, 780, 18),
        text("The quick brown fox jumps over the lazy dog.", 72, 740, 10),
        text("It keeps running until the end of the line.", 72, 728, 10),
        text("A second paragraph starts lower down.", 72, 690, 10),
    ])
}
