//! Content-stream walker producing positioned text fragments.
//!
//! Tracks the graphics state (`q`/`Q`/`cm`), the text state (`Tf`, `Tc`,
//! `Tw`, `TL`) and the text matrices (`Td`, `TD`, `Tm`, `T*`), and emits one
//! fragment per text-showing operator. Form XObjects are not followed.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::TextFragment;

use super::backend::{decode_text_simple, get_number, resolve, PageBox};

/// Average glyph advance (in em) assumed when a font has no widths.
const FALLBACK_ADVANCE_EM: f32 = 0.5;

/// `TJ` adjustments above this (thousandths of an em) read as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// FontDescriptor `/Flags` bit 19: ForceBold.
const FLAG_FORCE_BOLD: i64 = 1 << 18;

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let v: Vec<f32> = operands[..6].iter().filter_map(get_number).collect();
        if v.len() < 6 {
            return None;
        }
        Some(Self::new(v[0], v[1], v[2], v[3], v[4], v[5]))
    }

    /// `self × other`: apply `self` first, then `other`.
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

    /// Length of the transformed unit x vector.
    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Length of the transformed unit y vector.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Per-font data resolved once per page.
struct FontInfo {
    base_font: String,
    bold: Option<bool>,
    metrics: Option<SimpleMetrics>,
}

/// Glyph widths of a simple (one byte per code) font.
struct SimpleMetrics {
    first_char: i64,
    widths: Vec<f32>,
    missing_width: f32,
}

impl SimpleMetrics {
    /// Width of a code in thousandths of an em.
    fn width(&self, code: u8) -> f32 {
        let index = code as i64 - self.first_char;
        if index >= 0 {
            if let Some(w) = self.widths.get(index as usize) {
                return *w;
            }
        }
        self.missing_width
    }
}

/// Graphics and text state saved by `q` and restored by `Q`.
#[derive(Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    leading: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            font: Vec::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            leading: 0.0,
        }
    }
}

/// Extract the text fragments of a page.
pub(crate) fn extract_fragments(
    doc: &LopdfDocument,
    page_id: ObjectId,
    page_box: &PageBox,
) -> Result<Vec<TextFragment>> {
    let Some(content) = page_content(doc, page_id)? else {
        return Ok(Vec::new());
    };

    let lopdf_fonts = doc.get_page_fonts(page_id).unwrap_or_default();
    let fonts: HashMap<Vec<u8>, FontInfo> = lopdf_fonts
        .iter()
        .map(|(name, dict)| (name.clone(), font_info(doc, dict)))
        .collect();

    let walker = ContentWalker {
        doc,
        page_box,
        fonts: &fonts,
        lopdf_fonts: &lopdf_fonts,
    };
    walker.walk(&content)
}

/// Concatenated, decompressed `/Contents` of a page (`None` when absent).
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Option<Vec<u8>>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let contents = match page_dict.get(b"Contents") {
        Ok(obj) => resolve(doc, obj),
        Err(_) => return Ok(None),
    };

    match contents {
        Object::Stream(s) => Ok(Some(
            s.decompressed_content()
                .unwrap_or_else(|_| s.content.clone()),
        )),
        Object::Array(arr) => {
            let mut content = Vec::new();
            for obj in arr {
                if let Object::Stream(s) = resolve(doc, obj) {
                    match s.decompressed_content() {
                        Ok(data) => content.extend_from_slice(&data),
                        Err(_) => content.extend_from_slice(&s.content),
                    }
                    content.push(b' ');
                }
            }
            Ok(Some(content))
        }
        Object::Null => Ok(None),
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

fn font_info(doc: &LopdfDocument, dict: &lopdf::Dictionary) -> FontInfo {
    let base_font = dict
        .get(b"BaseFont")
        .ok()
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).to_string())
        .unwrap_or_default();

    let is_type0 = dict
        .get(b"Subtype")
        .ok()
        .and_then(|o| o.as_name().ok())
        .is_some_and(|n| n == b"Type0");

    let descriptor = if is_type0 {
        dict.get(b"DescendantFonts")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .and_then(|arr| arr.first())
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|d| d.get(b"FontDescriptor").ok())
    } else {
        dict.get(b"FontDescriptor").ok()
    }
    .and_then(|o| resolve(doc, o).as_dict().ok());

    let bold = descriptor.and_then(|d| {
        let weight = d.get(b"FontWeight").ok().and_then(get_number);
        let flags = d.get(b"Flags").ok().and_then(|o| o.as_i64().ok());
        if weight.is_none() && flags.is_none() {
            return None;
        }
        Some(weight.is_some_and(|w| w >= 600.0) || flags.is_some_and(|f| f & FLAG_FORCE_BOLD != 0))
    });

    let metrics = if is_type0 {
        None
    } else {
        simple_metrics(doc, dict, descriptor)
    };

    FontInfo {
        base_font,
        bold,
        metrics,
    }
}

fn simple_metrics(
    doc: &LopdfDocument,
    dict: &lopdf::Dictionary,
    descriptor: Option<&lopdf::Dictionary>,
) -> Option<SimpleMetrics> {
    let first_char = dict.get(b"FirstChar").ok()?.as_i64().ok()?;
    let widths: Vec<f32> = resolve(doc, dict.get(b"Widths").ok()?)
        .as_array()
        .ok()?
        .iter()
        .map(|o| get_number(resolve(doc, o)).unwrap_or(0.0))
        .collect();

    let missing_width = descriptor
        .and_then(|d| d.get(b"MissingWidth").ok())
        .and_then(get_number)
        .unwrap_or(FALLBACK_ADVANCE_EM * 1000.0);

    Some(SimpleMetrics {
        first_char,
        widths,
        missing_width,
    })
}

struct ContentWalker<'a> {
    doc: &'a LopdfDocument,
    page_box: &'a PageBox,
    fonts: &'a HashMap<Vec<u8>, FontInfo>,
    lopdf_fonts: &'a BTreeMap<Vec<u8>, &'a lopdf::Dictionary>,
}

impl ContentWalker<'_> {
    fn walk(&self, content: &[u8]) -> Result<Vec<TextFragment>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut fragments = Vec::new();
        let mut state = GraphicsState::default();
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut text_matrix = Matrix::identity();
        let mut line_matrix = Matrix::identity();
        let mut in_text_block = false;
        // Encodings are resolved lazily, once per font resource
        let mut encodings = HashMap::new();

        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.ctm = m.multiply(&state.ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    text_matrix = Matrix::identity();
                    line_matrix = Matrix::identity();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Object::Name(name) = &operands[0] {
                            state.font = name.clone();
                        }
                        state.font_size = get_number(&operands[1]).unwrap_or(12.0);
                    }
                }
                "Tc" => {
                    if let Some(v) = operands.first().and_then(get_number) {
                        state.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = operands.first().and_then(get_number) {
                        state.word_spacing = v;
                    }
                }
                "TL" => {
                    if let Some(v) = operands.first().and_then(get_number) {
                        state.leading = v;
                    }
                }
                "Td" | "TD" => {
                    if operands.len() >= 2 {
                        let tx = get_number(&operands[0]).unwrap_or(0.0);
                        let ty = get_number(&operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        line_matrix = Matrix::translation(tx, ty).multiply(&line_matrix);
                        text_matrix = line_matrix;
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        line_matrix = m;
                        text_matrix = m;
                    }
                }
                "T*" => {
                    line_matrix = Matrix::translation(0.0, -state.leading).multiply(&line_matrix);
                    text_matrix = line_matrix;
                }
                "Tj" | "TJ" | "'" | "\"" => {
                    if !in_text_block {
                        continue;
                    }

                    if op.operator == "'" || op.operator == "\"" {
                        if op.operator == "\"" && operands.len() >= 3 {
                            state.word_spacing = get_number(&operands[0]).unwrap_or(0.0);
                            state.char_spacing = get_number(&operands[1]).unwrap_or(0.0);
                        }
                        line_matrix =
                            Matrix::translation(0.0, -state.leading).multiply(&line_matrix);
                        text_matrix = line_matrix;
                    }

                    let encoding = encodings.entry(state.font.clone()).or_insert_with(|| {
                        self.lopdf_fonts
                            .get(&state.font)
                            .and_then(|f| f.get_font_encoding(self.doc).ok())
                    });
                    let decode = |bytes: &[u8]| match encoding.as_ref() {
                        Some(enc) => LopdfDocument::decode_text(enc, bytes)
                            .unwrap_or_else(|_| decode_text_simple(bytes)),
                        None => decode_text_simple(bytes),
                    };

                    let shown = match op.operator.as_str() {
                        "TJ" => match operands.first() {
                            Some(Object::Array(arr)) => Some(self.show_array(arr, &state, &decode)),
                            _ => None,
                        },
                        "\"" => match operands.get(2) {
                            Some(Object::String(bytes, _)) => {
                                Some(self.show_string(bytes, &state, &decode))
                            }
                            _ => None,
                        },
                        _ => match operands.first() {
                            Some(Object::String(bytes, _)) => {
                                Some(self.show_string(bytes, &state, &decode))
                            }
                            _ => None,
                        },
                    };

                    if let Some((text, advance)) = shown {
                        let trm = text_matrix.multiply(&state.ctm);
                        if let Some(fragment) = self.fragment(text, advance, &trm, &state) {
                            fragments.push(fragment);
                        }
                        text_matrix = Matrix::translation(advance, 0.0).multiply(&text_matrix);
                    }
                }
                _ => {}
            }
        }

        Ok(fragments)
    }

    /// Decode a string and compute its advance in unscaled text space.
    fn show_string(
        &self,
        bytes: &[u8],
        state: &GraphicsState,
        decode: &dyn Fn(&[u8]) -> String,
    ) -> (String, f32) {
        let text = decode(bytes);
        let metrics = self.fonts.get(&state.font).and_then(|f| f.metrics.as_ref());

        let advance = match metrics {
            Some(m) => bytes
                .iter()
                .map(|&b| {
                    let mut w = m.width(b) / 1000.0 * state.font_size + state.char_spacing;
                    if b == b' ' {
                        w += state.word_spacing;
                    }
                    w
                })
                .sum(),
            None => text
                .chars()
                .map(|c| {
                    let mut w = FALLBACK_ADVANCE_EM * state.font_size + state.char_spacing;
                    if c == ' ' {
                        w += state.word_spacing;
                    }
                    w
                })
                .sum(),
        };

        (text, advance)
    }

    /// `TJ`: strings interleaved with positioning adjustments.
    fn show_array(
        &self,
        items: &[Object],
        state: &GraphicsState,
        decode: &dyn Fn(&[u8]) -> String,
    ) -> (String, f32) {
        let mut combined = String::new();
        let mut advance = 0.0;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let (text, w) = self.show_string(bytes, state, decode);
                    combined.push_str(&text);
                    advance += w;
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = get_number(item).unwrap_or(0.0);
                    advance -= adjustment / 1000.0 * state.font_size;

                    // Large negative adjustments stand in for word spaces
                    if -adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                        && !combined.ends_with('\u{00A0}')
                        && !combined
                            .chars()
                            .last()
                            .is_some_and(crate::text::is_spaceless_script_char)
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }

        (combined, advance)
    }

    fn fragment(
        &self,
        text: String,
        advance: f32,
        trm: &Matrix,
        state: &GraphicsState,
    ) -> Option<TextFragment> {
        if text.trim().is_empty() {
            return None;
        }

        let size = state.font_size * trm.vertical_scale();
        let width = advance * trm.horizontal_scale();
        let (x, baseline) = self.page_box.to_top_down(trm.e, trm.f);
        if !(x.is_finite() && baseline.is_finite() && size.is_finite()) {
            return None;
        }

        let info = self.fonts.get(&state.font);
        let font_name = info
            .map(|f| f.base_font.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| String::from_utf8_lossy(&state.font).to_string());

        let mut fragment =
            TextFragment::new(text, x, 0.0, size.abs(), &font_name).with_width(width.abs());
        fragment.y = baseline - fragment.font_size * 0.8;
        if let Some(true) = info.and_then(|f| f.bold) {
            fragment = fragment.with_bold(true);
        }
        Some(fragment)
    }
}
