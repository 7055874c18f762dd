//! Document model types shared by the extraction stages.
//!
//! Every value here is produced once per run and treated as read-only
//! afterwards; stages pass them along by reference.

mod annotation;
mod fragment;
mod geometry;
mod heading;
mod record;

pub use annotation::{Annotation, AnnotationKind, RawAnnotation};
pub use fragment::{FontStyle, PageText, TextFragment};
pub use geometry::{Position, Rect};
pub use heading::{Heading, HeadingPath, HeadingSource, UNCATEGORIZED};
pub use record::{AnnotatedRecord, Extraction, ExtractionSummary};
