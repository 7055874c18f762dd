//! Results of an extraction run.

use serde::{Deserialize, Serialize};

use super::annotation::Annotation;
use super::heading::{Heading, HeadingPath, HeadingSource};

/// An annotation together with the headings that contain it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub annotation: Annotation,
    pub path: HeadingPath,
}

/// Counts collected during a run.
///
/// Locally recovered conditions are reported here rather than as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// Pages in the document
    pub page_count: usize,
    /// Headings in the recovered outline
    pub heading_count: usize,
    /// Where the headings came from (`None` when there are none)
    pub heading_source: Option<HeadingSource>,
    /// Annotations exported
    pub annotation_count: usize,
    /// Annotations without usable geometry
    pub skipped_annotations: usize,
    /// Non-markup annotations (links, popups, widgets...)
    pub ignored_annotations: usize,
    /// Annotations dropped for having neither comment nor covered text
    pub empty_annotations: usize,
    /// Outline entries whose destination or title could not be resolved
    pub dropped_headings: usize,
    /// Pages whose text or annotations could not be read
    pub unreadable_pages: usize,
}

impl ExtractionSummary {
    /// Whether any condition was recovered locally.
    pub fn has_recoveries(&self) -> bool {
        self.skipped_annotations > 0 || self.dropped_headings > 0 || self.unreadable_pages > 0
    }
}

/// Everything produced by one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// Recovered headings in document order
    pub headings: Vec<Heading>,
    /// Annotations in document order with their heading paths
    pub records: Vec<AnnotatedRecord>,
    /// Run statistics
    pub summary: ExtractionSummary,
}

impl Extraction {
    /// Check if the run produced no annotations.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
