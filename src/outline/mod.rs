//! Heading hierarchy recovery.
//!
//! The [`OutlineResolver`] turns a document's embedded bookmarks into
//! headings and falls back to the [`FontHeadingDetector`] when there are
//! none. Detection works on visual lines built from the page text and on
//! font statistics gathered once per run.

mod detector;
mod lines;
mod resolver;
mod stats;

pub use detector::{DetectorConfig, FontHeadingDetector};
pub use lines::{group_lines, TextLine};
pub use resolver::{OutlineResolver, Resolution};
pub use stats::FontStatistics;
