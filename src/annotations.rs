//! Annotation normalization.
//!
//! Turns [`RawAnnotation`] records read from `/Annots` arrays into
//! positioned [`Annotation`] values: classifies the subtype, picks the
//! geometry, anchors the annotation and clips the page text under its quads.

use rayon::prelude::*;

use crate::model::{Annotation, AnnotationKind, PageText, RawAnnotation, Rect, TextFragment};
use crate::outline::group_lines;
use crate::parser::parse_pdf_date;
use crate::text::{clean_multiline, clean_text, push_word};

/// Subtypes that are part of the document rather than user notes.
const NON_MARKUP_SUBTYPES: &[&str] = &[
    "Link",
    "Widget",
    "Screen",
    "PrinterMark",
    "TrapNet",
    "Watermark",
    "3D",
];

/// Popups only carry the window of their parent annotation.
const POPUP_SUBTYPE: &str = "Popup";

/// Baseline tolerance used when rebuilding lines of covered text.
const LINE_TOLERANCE: f32 = 0.3;

/// What happened to one raw annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Normalized and kept
    Kept(Annotation),
    /// No usable geometry
    Skipped,
    /// Not a user annotation
    Ignored,
}

/// Annotations of a run plus the counts of those left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// Kept annotations, in input order
    pub annotations: Vec<Annotation>,
    /// Annotations without geometry
    pub skipped: usize,
    /// Non-markup annotations
    pub ignored: usize,
}

/// Normalizes raw annotation records.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationExtractor {
    include_non_markup: bool,
}

impl AnnotationExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep links, widgets and similar objects as [`AnnotationKind::Other`].
    pub fn include_non_markup(mut self, include: bool) -> Self {
        self.include_non_markup = include;
        self
    }

    /// Normalize a batch of raw annotations.
    ///
    /// Each record is independent, so the work is spread over the rayon
    /// pool when `parallel` is set. Input order is preserved either way.
    pub fn normalize_all(&self, raws: &[RawAnnotation], text: &PageText, parallel: bool) -> Normalized {
        let outcomes: Vec<Outcome> = if parallel {
            raws.par_iter().map(|raw| self.normalize(raw, text)).collect()
        } else {
            raws.iter().map(|raw| self.normalize(raw, text)).collect()
        };

        let mut result = Normalized::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Kept(annotation) => result.annotations.push(annotation),
                Outcome::Skipped => result.skipped += 1,
                Outcome::Ignored => result.ignored += 1,
            }
        }
        result
    }

    /// Normalize one raw annotation against the page text.
    pub fn normalize(&self, raw: &RawAnnotation, text: &PageText) -> Outcome {
        let subtype = raw.subtype.as_deref().unwrap_or("");
        if subtype == POPUP_SUBTYPE {
            return Outcome::Ignored;
        }
        if NON_MARKUP_SUBTYPES.contains(&subtype) && !self.include_non_markup {
            return Outcome::Ignored;
        }

        let kind = AnnotationKind::from_subtype(subtype);

        let Some(quads) = geometry(raw) else {
            log::debug!(
                "Skipping {} annotation on page {}: no geometry",
                kind,
                raw.page + 1
            );
            return Outcome::Skipped;
        };

        // Topmost quad wins, then the leftmost
        let Some(position) = quads.iter().map(|q| q.anchor(raw.page)).min() else {
            return Outcome::Skipped;
        };

        let highlighted_text = if kind.is_text_markup() {
            covered_text(raw.page, &quads, text)
        } else {
            String::new()
        };

        let created_at = raw
            .creation_date
            .as_deref()
            .and_then(parse_pdf_date)
            .or_else(|| raw.modified_date.as_deref().and_then(parse_pdf_date));

        Outcome::Kept(Annotation {
            kind,
            position,
            quads,
            highlighted_text,
            comment_text: raw.contents.as_deref().map(clean_multiline).unwrap_or_default(),
            author: raw.author.as_deref().map(clean_text).unwrap_or_default(),
            created_at,
        })
    }
}

/// Usable regions of an annotation: its quads, else its rectangle.
fn geometry(raw: &RawAnnotation) -> Option<Vec<Rect>> {
    let quads: Vec<Rect> = raw.quads.iter().copied().filter(Rect::is_finite).collect();
    if !quads.is_empty() {
        return Some(quads);
    }
    raw.rect.filter(Rect::is_finite).map(|rect| vec![rect])
}

/// Page text whose characters are centred inside any of the quads.
fn covered_text(page: usize, quads: &[Rect], text: &PageText) -> String {
    let pieces: Vec<TextFragment> = text
        .fragments(page)
        .iter()
        .flat_map(|fragment| clip_fragment(fragment, quads))
        .collect();

    let mut result = String::new();
    for line in group_lines(page, &pieces, LINE_TOLERANCE) {
        push_word(&mut result, &line.text);
    }
    result
}

/// Split a fragment into the runs of characters that fall inside the quads.
fn clip_fragment(fragment: &TextFragment, quads: &[Rect]) -> Vec<TextFragment> {
    let center_y = fragment.y + fragment.font_size / 2.0;
    if !quads.iter().any(|q| center_y >= q.top && center_y <= q.bottom) {
        return Vec::new();
    }

    let count = fragment.text.chars().count().max(1) as f32;
    let advance = fragment.effective_width() / count;

    let mut pieces = Vec::new();
    let mut run = String::new();
    let mut run_start = 0.0;

    let mut flush = |run: &mut String, start: f32| {
        if !run.is_empty() {
            let chars = run.chars().count() as f32;
            pieces.push(
                TextFragment::new(
                    std::mem::take(run),
                    start,
                    fragment.y,
                    fragment.font_size,
                    &fragment.font_name,
                )
                .with_width(advance * chars)
                .with_bold(fragment.is_bold),
            );
        }
    };

    for (c, center_x) in fragment.char_centers() {
        if quads.iter().any(|q| q.contains(center_x, center_y)) {
            if run.is_empty() {
                run_start = center_x - advance / 2.0;
            }
            run.push(c);
        } else {
            flush(&mut run, run_start);
        }
    }
    flush(&mut run, run_start);

    pieces
}
