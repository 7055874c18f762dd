//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for everything the extraction core needs
//! from a PDF (positioned page text, the bookmark outline and raw annotation
//! objects), isolating the concrete PDF library (lopdf) from the heading and
//! mapping logic. Coordinates leaving a backend are in top-down page space.

use std::io::Read;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{RawAnnotation, TextFragment};

use super::{annots, content, outline};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers accept junk before the header within the first kilobyte.
const HEADER_SEARCH_LEN: usize = 1024;

/// One bookmark of the embedded outline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    /// Nesting level, 1 = top
    pub level: u8,
    /// Bookmark title as stored
    pub title: String,
    /// Resolved target, `None` when it could not be resolved
    pub destination: Option<Destination>,
}

impl OutlineEntry {
    /// Create a new outline entry.
    pub fn new(level: u8, title: impl Into<String>, destination: Option<Destination>) -> Self {
        Self {
            level,
            title: title.into(),
            destination,
        }
    }
}

/// A resolved outline target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    /// 0-based page index
    pub page: usize,
    /// Target top (top-down), when the destination type carries one
    pub top: Option<f32>,
    /// Target left, when the destination type carries one
    pub left: Option<f32>,
}

impl Destination {
    /// Destination to a page without a specific location.
    pub fn page(page: usize) -> Self {
        Self {
            page,
            top: None,
            left: None,
        }
    }

    /// Destination to a specific location on a page.
    pub fn at(page: usize, top: f32, left: f32) -> Self {
        Self {
            page,
            top: Some(top),
            left: Some(left),
        }
    }
}

/// Abstract interface for PDF document access.
///
/// Pages are addressed by 0-based index.
pub trait PdfSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Positioned text fragments of a page, in content-stream order.
    fn page_fragments(&self, page: usize) -> Result<Vec<TextFragment>>;

    /// Flattened bookmark outline in document order (empty when absent).
    fn outline(&self) -> Result<Vec<OutlineEntry>>;

    /// Annotation objects of a page.
    fn page_annotations(&self, page: usize) -> Result<Vec<RawAnnotation>>;
}

/// Page box in PDF user space, used to flip coordinates top-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl PageBox {
    /// US Letter, used when a page has no readable `/MediaBox`.
    pub fn letter() -> Self {
        Self {
            left: 0.0,
            bottom: 0.0,
            right: 612.0,
            top: 792.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Convert a user-space point to top-down page space.
    pub fn to_top_down(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.left, self.top - y)
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend — concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfSource`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_bytes(&data)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        if !has_pdf_header(data) {
            return Err(Error::UnknownFormat);
        }

        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;

        if doc.is_encrypted() {
            log::debug!("Document is encrypted; opened with the empty user password");
        }

        Self::from_document(doc)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Result<Self> {
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if pages.is_empty() && doc.catalog().is_err() {
            return Err(Error::Corrupted("document has no catalog".to_string()));
        }

        Ok(Self { doc, pages })
    }

    /// Load from a reader.
    pub fn load_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        self.pages
            .get(page)
            .copied()
            .ok_or(Error::PageOutOfRange(page as u32, self.pages.len() as u32))
    }

    /// Media box of a page, following `/Parent` inheritance.
    pub fn page_box(&self, page: usize) -> Result<PageBox> {
        let page_id = self.page_id(page)?;
        Ok(media_box(&self.doc, page_id).unwrap_or_else(PageBox::letter))
    }
}

impl PdfSource for LopdfBackend {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_fragments(&self, page: usize) -> Result<Vec<TextFragment>> {
        let page_id = self.page_id(page)?;
        let page_box = self.page_box(page)?;
        content::extract_fragments(&self.doc, page_id, &page_box)
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page + 1, e)))
    }

    fn outline(&self) -> Result<Vec<OutlineEntry>> {
        let boxes: Vec<PageBox> = self
            .pages
            .iter()
            .map(|id| media_box(&self.doc, *id).unwrap_or_else(PageBox::letter))
            .collect();
        Ok(outline::extract_outline(&self.doc, &self.pages, &boxes))
    }

    fn page_annotations(&self, page: usize) -> Result<Vec<RawAnnotation>> {
        let page_id = self.page_id(page)?;
        let page_box = self.page_box(page)?;
        annots::extract_annotations(&self.doc, page_id, page, &page_box)
    }
}

/// Check for the `%PDF-` marker near the start of the data.
pub fn has_pdf_header(data: &[u8]) -> bool {
    let window = &data[..data.len().min(HEADER_SEARCH_LEN)];
    window
        .windows(PDF_MAGIC.len() + 1)
        .any(|w| w.starts_with(PDF_MAGIC) && w[PDF_MAGIC.len()].is_ascii_digit())
}

/// Find `/MediaBox` on the page or an ancestor `/Pages` node.
fn media_box(doc: &LopdfDocument, page_id: ObjectId) -> Option<PageBox> {
    let mut current = Some(page_id);
    let mut depth = 0;

    while let Some(id) = current {
        if depth > 32 {
            break;
        }
        depth += 1;

        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(obj) = dict.get(b"MediaBox") {
            let array = resolve(doc, obj).as_array().ok()?;
            if array.len() >= 4 {
                let values: Vec<f32> = array
                    .iter()
                    .filter_map(|o| get_number(resolve(doc, o)))
                    .collect();
                if values.len() >= 4 {
                    return Some(PageBox {
                        left: values[0].min(values[2]),
                        bottom: values[1].min(values[3]),
                        right: values[0].max(values[2]),
                        top: values[1].max(values[3]),
                    });
                }
            }
            return None;
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

/// Follow an indirect reference, returning the object itself otherwise.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Helper: extract a number from a PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper to get a text string from a PDF dictionary.
pub(crate) fn get_string_from_dict(
    doc: &LopdfDocument,
    dict: &lopdf::Dictionary,
    key: &[u8],
) -> Option<String> {
    let obj = resolve(doc, dict.get(key).ok()?);
    match obj {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, UTF-8, else Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}
