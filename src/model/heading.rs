//! Headings and heading paths (breadcrumbs).

use serde::{Deserialize, Serialize};

use super::geometry::Position;

/// Path label used when no heading precedes an annotation.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Where a heading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingSource {
    /// Embedded outline (bookmarks)
    FromOutline,
    /// Inferred from font size and weight
    FromFontHeuristic,
}

impl std::fmt::Display for HeadingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeadingSource::FromOutline => write!(f, "outline"),
            HeadingSource::FromFontHeuristic => write!(f, "font heuristic"),
        }
    }
}

/// A structural marker (chapter or section title) with its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Nesting level, 1 = top
    pub level: u8,
    /// Heading text
    pub title: String,
    /// Location in the document
    pub position: Position,
    /// How the heading was obtained
    pub source: HeadingSource,
}

impl Heading {
    /// Create a new heading. Level 0 is lifted to 1.
    pub fn new(level: u8, title: impl Into<String>, position: Position, source: HeadingSource) -> Self {
        Self {
            level: level.max(1),
            title: title.into(),
            position,
            source,
        }
    }

    /// 0-based page index.
    pub fn page(&self) -> usize {
        self.position.page
    }
}

/// Ancestor headings of an annotation, from level 1 down.
///
/// An empty path is the "Uncategorized" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadingPath {
    headings: Vec<Heading>,
}

impl HeadingPath {
    /// Build a path from headings ordered top level first.
    pub fn new(headings: Vec<Heading>) -> Self {
        Self { headings }
    }

    /// The sentinel path for annotations with no preceding heading.
    pub fn uncategorized() -> Self {
        Self::default()
    }

    pub fn is_uncategorized(&self) -> bool {
        self.headings.is_empty()
    }

    /// Headings from level 1 down.
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    /// Number of levels in the path.
    pub fn depth(&self) -> usize {
        self.headings.len()
    }

    /// The most specific heading, if any.
    pub fn deepest(&self) -> Option<&Heading> {
        self.headings.last()
    }

    /// Titles joined with a separator, or the sentinel label.
    pub fn join(&self, separator: &str) -> String {
        if self.headings.is_empty() {
            return UNCATEGORIZED.to_string();
        }
        self.headings
            .iter()
            .map(|h| h.title.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}
