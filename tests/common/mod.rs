//! Shared helpers for integration tests.

#![allow(dead_code)]

use pdfnotes::model::{RawAnnotation, Rect, TextFragment};
use pdfnotes::parser::{Destination, OutlineEntry, PdfSource};
use pdfnotes::Result;

/// A [`PdfSource`] over prepared data, already in top-down page space.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub pages: Vec<Vec<TextFragment>>,
    pub outline: Vec<OutlineEntry>,
    pub annotations: Vec<RawAnnotation>,
}

impl MemorySource {
    /// A document of `page_count` empty pages.
    pub fn new(page_count: usize) -> Self {
        Self {
            pages: vec![Vec::new(); page_count],
            ..Default::default()
        }
    }

    pub fn with_fragment(mut self, page: usize, fragment: TextFragment) -> Self {
        self.pages[page].push(fragment);
        self
    }

    /// Add a bookmark pointing at a location.
    pub fn with_bookmark(mut self, level: u8, title: &str, page: usize, top: f32) -> Self {
        self.outline
            .push(OutlineEntry::new(level, title, Some(Destination::at(page, top, 0.0))));
        self
    }

    /// Add a bookmark that targets a whole page, without a location.
    pub fn with_page_bookmark(mut self, level: u8, title: &str, page: usize) -> Self {
        self.outline
            .push(OutlineEntry::new(level, title, Some(Destination::page(page))));
        self
    }

    pub fn with_annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Add a sticky note whose anchor is `(page, y, x)`.
    pub fn with_note(self, page: usize, y: f32, x: f32, text: &str) -> Self {
        self.with_annotation(
            RawAnnotation::new(page, "Text")
                .with_rect(Rect::new(x, y, x + 20.0, y + 20.0))
                .with_contents(text),
        )
    }
}

impl PdfSource for MemorySource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_fragments(&self, page: usize) -> Result<Vec<TextFragment>> {
        Ok(self.pages.get(page).cloned().unwrap_or_default())
    }

    fn outline(&self) -> Result<Vec<OutlineEntry>> {
        Ok(self.outline.clone())
    }

    fn page_annotations(&self, page: usize) -> Result<Vec<RawAnnotation>> {
        Ok(self
            .annotations
            .iter()
            .filter(|a| a.page == page)
            .cloned()
            .collect())
    }
}

/// A body-text fragment (10pt regular).
pub fn body(text: &str, y: f32) -> TextFragment {
    TextFragment::new(text, 72.0, y, 10.0, "Times-Roman")
}

/// A heading fragment (16pt bold).
pub fn title(text: &str, y: f32) -> TextFragment {
    TextFragment::new(text, 72.0, y, 16.0, "Times-Bold")
}
