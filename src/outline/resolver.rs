//! Heading list resolution: embedded outline first, font heuristic second.

use crate::index::sort_headings;
use crate::model::{Heading, HeadingSource, PageText, Position};
use crate::parser::{ExtractOptions, HeadingStrategy, OutlineEntry};
use crate::text::clean_text;

use super::detector::{DetectorConfig, FontHeadingDetector};
use super::lines::group_lines;
use super::stats::FontStatistics;

/// Shortest line text accepted as a match for a longer bookmark title.
const MIN_PARTIAL_MATCH_CHARS: usize = 3;

/// Outcome of heading resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Headings in document order
    pub headings: Vec<Heading>,
    /// Source of the headings (`None` when there are none)
    pub source: Option<HeadingSource>,
    /// Outline entries dropped for an empty title or an unresolvable target
    pub dropped: usize,
}

/// Produces the ordered heading list for a document.
#[derive(Debug, Clone, Default)]
pub struct OutlineResolver {
    strategy: HeadingStrategy,
    detector: FontHeadingDetector,
    parallel: bool,
}

impl OutlineResolver {
    pub fn new(strategy: HeadingStrategy, config: DetectorConfig, parallel: bool) -> Self {
        Self {
            strategy,
            detector: FontHeadingDetector::new(config),
            parallel,
        }
    }

    pub fn from_options(options: &ExtractOptions) -> Self {
        Self::new(
            options.heading_strategy,
            options.detector.clone(),
            options.parallel,
        )
    }

    /// Resolve headings from an outline and the page text.
    ///
    /// `stats` must have been gathered over `text`. An empty result is not
    /// an error; mapping then falls back to the uncategorized path.
    pub fn resolve(
        &self,
        outline: &[OutlineEntry],
        text: &PageText,
        stats: &FontStatistics,
    ) -> Resolution {
        let (from_outline, dropped) = match self.strategy {
            HeadingStrategy::Fonts => (Vec::new(), 0),
            _ => self.from_outline(outline, text),
        };

        if dropped > 0 {
            log::warn!("Dropped {} outline entries with no usable destination", dropped);
        }

        let use_outline = match self.strategy {
            HeadingStrategy::Outline => true,
            HeadingStrategy::Fonts => false,
            HeadingStrategy::Auto => !from_outline.is_empty(),
        };

        let headings = if use_outline {
            from_outline
        } else {
            if self.strategy == HeadingStrategy::Auto {
                log::info!("No usable outline, inferring headings from fonts");
            }
            let mut detected = self.detector.detect(text, stats, self.parallel);
            sort_headings(&mut detected);
            detected
        };

        let source = match (headings.is_empty(), use_outline) {
            (true, _) => None,
            (false, true) => Some(HeadingSource::FromOutline),
            (false, false) => Some(HeadingSource::FromFontHeuristic),
        };

        Resolution {
            headings,
            source,
            dropped,
        }
    }

    /// Convert outline entries to headings. Returns the headings and the
    /// number of dropped entries.
    pub fn from_outline(&self, outline: &[OutlineEntry], text: &PageText) -> (Vec<Heading>, usize) {
        let page_count = text.page_count();
        let tolerance = self.detector.config().line_tolerance;
        let mut dropped = 0;
        let mut headings = Vec::with_capacity(outline.len());

        for entry in outline {
            let title = clean_text(&entry.title);
            let Some(dest) = entry.destination.filter(|d| d.page < page_count) else {
                log::debug!("Outline entry {:?} has no destination in range", entry.title);
                dropped += 1;
                continue;
            };
            if title.is_empty() {
                dropped += 1;
                continue;
            }

            let position = match dest.top {
                Some(top) if top.is_finite() => Position::new(
                    dest.page,
                    top.max(0.0),
                    dest.left.filter(|l| l.is_finite()).unwrap_or(0.0).max(0.0),
                ),
                _ => locate_title(&title, dest.page, text, tolerance)
                    .unwrap_or_else(|| Position::page_top(dest.page)),
            };

            headings.push(Heading::new(
                entry.level,
                title,
                position,
                HeadingSource::FromOutline,
            ));
        }

        sort_headings(&mut headings);
        (headings, dropped)
    }
}

/// Find a bookmark title among a page's lines.
///
/// Case-insensitive containment in either direction; the first matching
/// line from the top wins.
fn locate_title(title: &str, page: usize, text: &PageText, tolerance: f32) -> Option<Position> {
    let needle = title.to_lowercase();
    group_lines(page, text.fragments(page), tolerance)
        .into_iter()
        .find(|line| {
            let hay = line.text.to_lowercase();
            hay.contains(&needle)
                || (hay.chars().count() >= MIN_PARTIAL_MATCH_CHARS && needle.contains(&hay))
        })
        .map(|line| line.position())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextFragment;
    use crate::parser::Destination;

    fn page_text() -> PageText {
        PageText::new(vec![
            vec![
                TextFragment::new("Preface", 72.0, 60.0, 18.0, "Times-Bold"),
                TextFragment::new("body", 72.0, 100.0, 10.0, "Times-Roman"),
                TextFragment::new("body", 72.0, 120.0, 10.0, "Times-Roman"),
            ],
            vec![
                TextFragment::new("body", 72.0, 40.0, 10.0, "Times-Roman"),
                TextFragment::new("2 Methods", 72.0, 300.0, 18.0, "Times-Bold"),
            ],
        ])
    }

    fn resolve(strategy: HeadingStrategy, outline: &[OutlineEntry]) -> Resolution {
        let text = page_text();
        let stats = FontStatistics::collect(&text, false);
        OutlineResolver::new(strategy, DetectorConfig::default(), false).resolve(outline, &text, &stats)
    }

    #[test]
    fn test_outline_preferred_when_present() {
        let outline = vec![
            OutlineEntry::new(1, "Preface", Some(Destination::at(0, 50.0, 72.0))),
            OutlineEntry::new(2, "Scope", Some(Destination::at(0, 90.0, 72.0))),
            OutlineEntry::new(1, "Methods", Some(Destination::at(1, 290.0, 72.0))),
        ];
        let resolution = resolve(HeadingStrategy::Auto, &outline);

        assert_eq!(resolution.source, Some(HeadingSource::FromOutline));
        assert_eq!(resolution.dropped, 0);
        let summary: Vec<_> = resolution
            .headings
            .iter()
            .map(|h| (h.level, h.title.as_str()))
            .collect();
        assert_eq!(summary, vec![(1, "Preface"), (2, "Scope"), (1, "Methods")]);
    }

    #[test]
    fn test_unresolvable_entries_dropped() {
        let outline = vec![
            OutlineEntry::new(1, "Preface", Some(Destination::page(0))),
            OutlineEntry::new(1, "Ghost", Some(Destination::page(9))),
            OutlineEntry::new(1, "Nowhere", None),
            OutlineEntry::new(1, "   ", Some(Destination::page(1))),
        ];
        let resolution = resolve(HeadingStrategy::Auto, &outline);
        assert_eq!(resolution.dropped, 3);
        assert_eq!(resolution.headings.len(), 1);
    }

    #[test]
    fn test_title_search_without_top() {
        let outline = vec![
            OutlineEntry::new(1, "Methods", Some(Destination::page(1))),
            OutlineEntry::new(1, "Appendix", Some(Destination::page(1))),
        ];
        let resolution = resolve(HeadingStrategy::Outline, &outline);

        let methods = &resolution.headings[1];
        assert_eq!(methods.title, "Methods");
        assert_eq!(methods.position, Position::new(1, 300.0, 72.0));
        // Not found on the page: page top
        let appendix = &resolution.headings[0];
        assert_eq!(appendix.title, "Appendix");
        assert_eq!(appendix.position, Position::page_top(1));
    }

    #[test]
    fn test_auto_falls_back_to_fonts() {
        let resolution = resolve(HeadingStrategy::Auto, &[]);
        assert_eq!(resolution.source, Some(HeadingSource::FromFontHeuristic));
        let titles: Vec<_> = resolution.headings.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Preface", "2 Methods"]);
    }

    #[test]
    fn test_forced_strategies() {
        let outline = vec![OutlineEntry::new(1, "Only", Some(Destination::page(0)))];

        let fonts = resolve(HeadingStrategy::Fonts, &outline);
        assert_eq!(fonts.source, Some(HeadingSource::FromFontHeuristic));

        let forced = resolve(HeadingStrategy::Outline, &[]);
        assert!(forced.headings.is_empty());
        assert_eq!(forced.source, None);
    }
}
