//! Annotation types: raw records from the PDF and the normalized entity.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::geometry::{Position, Rect};

/// Annotation type as exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    Highlight,
    Underline,
    Squiggly,
    StrikeOut,
    /// Sticky note (`/Text`)
    Comment,
    FreeText,
    /// Any other or unreadable subtype
    Other,
}

impl AnnotationKind {
    /// Map a PDF `/Subtype` name.
    pub fn from_subtype(subtype: &str) -> Self {
        match subtype {
            "Highlight" => AnnotationKind::Highlight,
            "Underline" => AnnotationKind::Underline,
            "Squiggly" => AnnotationKind::Squiggly,
            "StrikeOut" => AnnotationKind::StrikeOut,
            "Text" => AnnotationKind::Comment,
            "FreeText" => AnnotationKind::FreeText,
            _ => AnnotationKind::Other,
        }
    }

    /// Export label.
    pub fn label(&self) -> &'static str {
        match self {
            AnnotationKind::Highlight => "Highlight",
            AnnotationKind::Underline => "Underline",
            AnnotationKind::Squiggly => "Squiggly",
            AnnotationKind::StrikeOut => "StrikeOut",
            AnnotationKind::Comment => "Comment",
            AnnotationKind::FreeText => "FreeText",
            AnnotationKind::Other => "Other",
        }
    }

    /// Whether the annotation marks up existing page text.
    pub fn is_text_markup(&self) -> bool {
        matches!(
            self,
            AnnotationKind::Highlight
                | AnnotationKind::Underline
                | AnnotationKind::Squiggly
                | AnnotationKind::StrikeOut
        )
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An annotation object as read from a page's `/Annots` array.
///
/// Geometry is already in top-down page space. Fields stay optional so that
/// malformed objects can still be classified by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAnnotation {
    /// 0-based page index
    pub page: usize,
    /// `/Subtype` name, `None` when missing or not a name
    pub subtype: Option<String>,
    /// `/Rect`
    pub rect: Option<Rect>,
    /// `/QuadPoints`, each quad reduced to its bounding rectangle
    pub quads: Vec<Rect>,
    /// `/Contents`
    pub contents: Option<String>,
    /// `/T`
    pub author: Option<String>,
    /// `/CreationDate` as written in the file
    pub creation_date: Option<String>,
    /// `/M` as written in the file
    pub modified_date: Option<String>,
}

impl RawAnnotation {
    /// Create a raw annotation with a subtype on a page.
    pub fn new(page: usize, subtype: impl Into<String>) -> Self {
        Self {
            page,
            subtype: Some(subtype.into()),
            ..Default::default()
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn with_quad(mut self, quad: Rect) -> Self {
        self.quads.push(quad);
        self
    }

    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_creation_date(mut self, date: impl Into<String>) -> Self {
        self.creation_date = Some(date.into());
        self
    }
}

/// A normalized, positioned annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation type
    pub kind: AnnotationKind,
    /// Anchor: topmost, then leftmost corner across all quads
    pub position: Position,
    /// Regions covered by the annotation
    pub quads: Vec<Rect>,
    /// Page text under the quads (markup types only)
    pub highlighted_text: String,
    /// Author-supplied note
    pub comment_text: String,
    /// Author, empty when unknown
    pub author: String,
    /// Creation time, when present and parseable
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl Annotation {
    /// 0-based page index.
    pub fn page(&self) -> usize {
        self.position.page
    }

    /// Whether both the note and the covered text are empty.
    pub fn is_empty(&self) -> bool {
        self.highlighted_text.is_empty() && self.comment_text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_subtype() {
        assert_eq!(AnnotationKind::from_subtype("Highlight"), AnnotationKind::Highlight);
        assert_eq!(AnnotationKind::from_subtype("Text"), AnnotationKind::Comment);
        assert_eq!(AnnotationKind::from_subtype("FreeText"), AnnotationKind::FreeText);
        assert_eq!(AnnotationKind::from_subtype("Ink"), AnnotationKind::Other);
        assert_eq!(AnnotationKind::from_subtype(""), AnnotationKind::Other);
    }

    #[test]
    fn test_kind_text_markup() {
        assert!(AnnotationKind::Highlight.is_text_markup());
        assert!(AnnotationKind::Squiggly.is_text_markup());
        assert!(!AnnotationKind::Comment.is_text_markup());
        assert!(!AnnotationKind::Other.is_text_markup());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(AnnotationKind::StrikeOut.to_string(), "StrikeOut");
        assert_eq!(AnnotationKind::Comment.label(), "Comment");
    }

    #[test]
    fn test_raw_annotation_builder() {
        let raw = RawAnnotation::new(2, "Highlight")
            .with_quad(Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_contents("note")
            .with_author("Reviewer A");
        assert_eq!(raw.page, 2);
        assert_eq!(raw.subtype.as_deref(), Some("Highlight"));
        assert_eq!(raw.quads.len(), 1);
        assert!(raw.rect.is_none());
        assert_eq!(raw.author.as_deref(), Some("Reviewer A"));
    }
}
