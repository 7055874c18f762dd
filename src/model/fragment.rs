//! Page text model: positioned text fragments with font information.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// Share of the font size above the baseline (approximate ascender).
const ASCENT_RATIO: f32 = 0.8;

/// A run of text drawn with one font at one position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// Left edge
    pub x: f32,
    /// Top edge (top-down page space)
    pub y: f32,
    /// Advance width of the run (0 when unknown)
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
}

impl TextFragment {
    /// Create a new fragment, guessing weight and slant from the font name.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32, font_name: &str) -> Self {
        let lower = font_name.to_lowercase();
        let is_bold = ["bold", "black", "heavy", "semibold", "demi"]
            .iter()
            .any(|marker| lower.contains(marker));
        let is_italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            text: text.into(),
            x,
            y,
            width: 0.0,
            font_size,
            font_name: font_name.to_string(),
            is_bold,
            is_italic,
        }
    }

    /// Set the advance width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Force the bold flag (e.g. from a font descriptor).
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.is_bold = bold;
        self
    }

    /// Baseline position (top-down).
    pub fn baseline(&self) -> f32 {
        self.y + self.font_size * ASCENT_RATIO
    }

    /// Width used for geometry, estimated from the font size when unknown.
    pub fn effective_width(&self) -> f32 {
        if self.width > 0.0 {
            self.width
        } else {
            self.text.chars().count() as f32 * self.font_size * 0.5
        }
    }

    /// Approximate glyph box of the whole run.
    pub fn bbox(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.x + self.effective_width(),
            self.y + self.font_size,
        )
    }

    /// The style used for font statistics.
    pub fn style(&self) -> FontStyle {
        FontStyle::new(self.font_size, self.is_bold)
    }

    /// Characters paired with the horizontal centre of their estimated box.
    ///
    /// Advance is spread evenly over the run; proportional fonts make this
    /// an approximation, good enough for clipping text to highlight quads.
    pub fn char_centers(&self) -> impl Iterator<Item = (char, f32)> + '_ {
        let count = self.text.chars().count().max(1) as f32;
        let advance = self.effective_width() / count;
        self.text
            .chars()
            .enumerate()
            .map(move |(i, c)| (c, self.x + advance * (i as f32 + 0.5)))
    }
}

/// A (size, weight) pair compared at half-point resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontStyle {
    half_points: u32,
    /// Bold weight
    pub bold: bool,
}

impl FontStyle {
    /// Create a style, rounding the size to the nearest half point.
    pub fn new(size: f32, bold: bool) -> Self {
        let half_points = if size.is_finite() && size > 0.0 {
            (size * 2.0).round() as u32
        } else {
            0
        };
        Self { half_points, bold }
    }

    /// Font size in points.
    pub fn size(&self) -> f32 {
        self.half_points as f32 / 2.0
    }

    /// Size key for grouping regardless of weight.
    pub fn size_key(&self) -> u32 {
        self.half_points
    }
}

impl std::fmt::Display for FontStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.bold {
            write!(f, "{}pt bold", self.size())
        } else {
            write!(f, "{}pt", self.size())
        }
    }
}

/// Fragments of every page of a document, read once per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageText {
    pages: Vec<Vec<TextFragment>>,
}

impl PageText {
    /// Build from per-page fragment lists (index = 0-based page).
    pub fn new(pages: Vec<Vec<TextFragment>>) -> Self {
        Self { pages }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Fragments of one page (empty for an unknown page).
    pub fn fragments(&self, page: usize) -> &[TextFragment] {
        self.pages.get(page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate `(page, fragments)` pairs.
    pub fn pages(&self) -> impl Iterator<Item = (usize, &[TextFragment])> {
        self.pages.iter().enumerate().map(|(i, p)| (i, p.as_slice()))
    }

    /// Raw per-page storage.
    pub fn as_slices(&self) -> &[Vec<TextFragment>] {
        &self.pages
    }

    /// Total number of fragments.
    pub fn fragment_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }
}
