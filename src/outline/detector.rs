//! Font-heuristic heading detection.
//!
//! Used when a document has no usable outline. Lines set in a style larger
//! (or bolder) than the body text become heading candidates; candidate
//! styles are ranked by size to assign levels.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use rayon::prelude::*;
use regex::Regex;

use crate::model::{FontStyle, Heading, HeadingSource, PageText};

use super::lines::{group_lines, TextLine};
use super::stats::FontStatistics;

/// Consecutive identical candidates closer than this are one heading.
const DUPLICATE_DISTANCE: f32 = 10.0;

/// Settings for [`FontHeadingDetector`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Deepest level assigned; smaller styles merge into it
    pub max_level: u8,
    /// Baseline tolerance for line grouping, as a fraction of the font size
    pub line_tolerance: f32,
    /// Share of pages a line must repeat on to count as a running header
    pub repeat_page_ratio: f32,
    /// Vertical tolerance (points) for "same position" across pages
    pub repeat_position_tolerance: f32,
    /// Longer lines are never headings
    pub max_heading_chars: usize,
    /// Reject "Figure ..." / "Fig. ..." captions
    pub reject_captions: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_level: 6,
            line_tolerance: 0.3,
            repeat_page_ratio: 0.5,
            repeat_position_tolerance: 10.0,
            max_heading_chars: 120,
            reject_captions: true,
        }
    }
}

impl DetectorConfig {
    pub fn with_max_level(mut self, level: u8) -> Self {
        self.max_level = level.max(1);
        self
    }

    pub fn with_max_heading_chars(mut self, chars: usize) -> Self {
        self.max_heading_chars = chars;
        self
    }

    pub fn with_reject_captions(mut self, reject: bool) -> Self {
        self.reject_captions = reject;
        self
    }
}

fn page_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(page\s*)?[-–—]?\s*\d+\s*([-–—]|(of|/)\s*\d+)?$")
            .expect("page number pattern is valid")
    })
}

fn caption_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(figure|fig\.)(\s|$)").expect("caption pattern is valid")
    })
}

/// Infers headings from font size and weight.
#[derive(Debug, Clone, Default)]
pub struct FontHeadingDetector {
    config: DetectorConfig,
}

impl FontHeadingDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect headings, gathering font statistics first.
    pub fn detect_text(&self, text: &PageText, parallel: bool) -> Vec<Heading> {
        let stats = FontStatistics::collect(text, parallel);
        self.detect(text, &stats, parallel)
    }

    /// Detect headings using precomputed statistics.
    ///
    /// Output is in document order. Returns an empty list when no body style
    /// can be established or nothing qualifies.
    pub fn detect(&self, text: &PageText, stats: &FontStatistics, parallel: bool) -> Vec<Heading> {
        let Some(body) = stats.body_style() else {
            log::debug!("No text observed, font heuristic has nothing to work with");
            return Vec::new();
        };
        log::debug!("Body text style: {}", body);

        let tolerance = self.config.line_tolerance;
        let lines: Vec<TextLine> = if parallel {
            text.as_slices()
                .par_iter()
                .enumerate()
                .flat_map_iter(|(page, fragments)| group_lines(page, fragments, tolerance))
                .collect()
        } else {
            text.pages()
                .flat_map(|(page, fragments)| group_lines(page, fragments, tolerance))
                .collect()
        };

        let candidates: Vec<TextLine> = lines
            .into_iter()
            .filter(|line| is_heading_style(line.style, body))
            .filter(|line| self.passes_text_filters(&line.text))
            .collect();

        let candidates = self.reject_running_lines(candidates, text.page_count());
        if candidates.is_empty() {
            log::debug!("No line is set larger or bolder than body text");
            return Vec::new();
        }

        let levels = self.rank_styles(&candidates);
        let mut headings: Vec<Heading> = Vec::with_capacity(candidates.len());
        for line in candidates {
            let level = levels.get(&line.style).copied().unwrap_or(self.config.max_level);
            if let Some(prev) = headings.last() {
                if prev.title == line.text
                    && prev.page() == line.page
                    && (prev.position.y - line.top).abs() < DUPLICATE_DISTANCE
                {
                    continue;
                }
            }
            headings.push(Heading::new(
                level,
                line.text.clone(),
                line.position(),
                HeadingSource::FromFontHeuristic,
            ));
        }

        log::debug!(
            "Font heuristic found {} headings in {} styles",
            headings.len(),
            levels.len()
        );
        headings
    }

    /// Length, symbol-only, page-number and caption filters.
    fn passes_text_filters(&self, text: &str) -> bool {
        if text.is_empty() || text.chars().count() > self.config.max_heading_chars {
            return false;
        }
        if !text.chars().any(char::is_alphabetic) {
            return false;
        }
        if page_number_regex().is_match(text) {
            return false;
        }
        if self.config.reject_captions && caption_regex().is_match(text) {
            return false;
        }
        true
    }

    /// Drop lines that repeat at the same height on many pages.
    fn reject_running_lines(&self, candidates: Vec<TextLine>, page_count: usize) -> Vec<TextLine> {
        if page_count < 2 {
            return candidates;
        }

        let mut occurrences: HashMap<String, Vec<(usize, f32)>> = HashMap::new();
        for line in &candidates {
            occurrences
                .entry(repeat_key(&line.text))
                .or_default()
                .push((line.page, line.top));
        }

        let threshold = self.config.repeat_page_ratio * page_count as f32;
        let tolerance = self.config.repeat_position_tolerance;

        candidates
            .into_iter()
            .filter(|line| {
                let Some(seen) = occurrences.get(&repeat_key(&line.text)) else {
                    return true;
                };
                let pages: BTreeSet<usize> = seen
                    .iter()
                    .filter(|(_, top)| (top - line.top).abs() <= tolerance)
                    .map(|(page, _)| *page)
                    .collect();
                let repeated = pages.len() >= 2 && pages.len() as f32 >= threshold;
                if repeated {
                    log::debug!("Running header/footer rejected: {:?}", line.text);
                }
                !repeated
            })
            .collect()
    }

    /// Level per style: largest first, bold before regular at equal size.
    fn rank_styles(&self, candidates: &[TextLine]) -> HashMap<FontStyle, u8> {
        let styles: BTreeSet<FontStyle> = candidates.iter().map(|l| l.style).collect();
        let max_level = self.config.max_level.max(1);
        styles
            .into_iter()
            .rev()
            .enumerate()
            .map(|(i, style)| (style, (i + 1).min(max_level as usize) as u8))
            .collect()
    }
}

/// Larger than body, or same size but bold where body is not.
fn is_heading_style(style: FontStyle, body: FontStyle) -> bool {
    style.size_key() > body.size_key()
        || (style.size_key() == body.size_key() && style.bold && !body.bold)
}

fn repeat_key(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextFragment;

    fn body(y: f32, text: &str) -> TextFragment {
        TextFragment::new(text, 72.0, y, 10.0, "Times-Roman")
    }

    fn title(y: f32, text: &str, size: f32) -> TextFragment {
        TextFragment::new(text, 72.0, y, size, "Times-Bold")
    }

    #[test]
    fn test_heading_style_rule() {
        let body = FontStyle::new(10.0, false);
        assert!(is_heading_style(FontStyle::new(12.0, false), body));
        assert!(is_heading_style(FontStyle::new(10.0, true), body));
        assert!(!is_heading_style(FontStyle::new(10.0, false), body));
        assert!(!is_heading_style(FontStyle::new(9.0, true), body));

        let bold_body = FontStyle::new(10.0, true);
        assert!(!is_heading_style(FontStyle::new(10.0, true), bold_body));
    }

    #[test]
    fn test_levels_by_size() {
        let text = PageText::new(vec![vec![
            title(50.0, "Chapter One", 20.0),
            body(80.0, "Body text line one"),
            title(100.0, "Section A", 14.0),
            body(120.0, "Body text line two"),
            body(140.0, "Body text line three"),
            TextFragment::new("Minor point", 72.0, 160.0, 10.0, "Times-Bold"),
            body(180.0, "Body text line four"),
        ]]);

        let headings = FontHeadingDetector::default().detect_text(&text, false);
        let summary: Vec<_> = headings.iter().map(|h| (h.level, h.title.as_str())).collect();
        assert_eq!(
            summary,
            vec![(1, "Chapter One"), (2, "Section A"), (3, "Minor point")]
        );
        assert!(headings
            .iter()
            .all(|h| h.source == HeadingSource::FromFontHeuristic));
    }

    #[test]
    fn test_level_cap_merges_smaller_styles() {
        let text = PageText::new(vec![vec![
            title(10.0, "Biggest", 24.0),
            title(40.0, "Bigger", 18.0),
            title(70.0, "Big", 14.0),
            body(100.0, "body"),
            body(110.0, "body"),
            body(120.0, "body"),
            body(130.0, "body"),
        ]]);

        let detector = FontHeadingDetector::new(DetectorConfig::default().with_max_level(2));
        let levels: Vec<_> = detector
            .detect_text(&text, false)
            .iter()
            .map(|h| h.level)
            .collect();
        assert_eq!(levels, vec![1, 2, 2]);
    }

    #[test]
    fn test_filters_reject_numbers_captions_and_long_lines() {
        let detector = FontHeadingDetector::default();
        assert!(detector.passes_text_filters("Introduction"));
        assert!(!detector.passes_text_filters("12"));
        assert!(!detector.passes_text_filters("— 12 —"));
        assert!(!detector.passes_text_filters("Page 3"));
        assert!(!detector.passes_text_filters("3 of 10"));
        assert!(!detector.passes_text_filters("1.2.3"));
        assert!(!detector.passes_text_filters("Figure 4: Results"));
        assert!(!detector.passes_text_filters("Fig. 2"));
        assert!(!detector.passes_text_filters(&"x".repeat(121)));
        assert!(detector.passes_text_filters("Figures and Tables"));
        assert!(detector.passes_text_filters("2. Methods"));
    }

    #[test]
    fn test_running_header_rejected() {
        let mut pages = Vec::new();
        for _ in 0..4 {
            let mut page = vec![title(20.0, "Journal of Things", 12.0)];
            for j in 0..5 {
                page.push(body(100.0 + j as f32 * 15.0, "body text"));
            }
            pages.push(page);
        }
        pages[1].push(title(60.0, "Results", 16.0));

        let headings = FontHeadingDetector::default().detect_text(&PageText::new(pages), true);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].title, "Results");
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[0].page(), 1);
    }

    #[test]
    fn test_two_page_document_keeps_unique_headings() {
        let pages = (0..2)
            .map(|i| {
                vec![
                    title(20.0, if i == 0 { "Part One" } else { "Part Two" }, 16.0),
                    body(50.0, "body"),
                    body(70.0, "body"),
                ]
            })
            .collect();
        let headings = FontHeadingDetector::default().detect_text(&PageText::new(pages), false);
        assert_eq!(headings.len(), 2);
    }

    #[test]
    fn test_single_page_keeps_repeated_text() {
        let text = PageText::new(vec![vec![
            title(20.0, "Overview", 16.0),
            body(50.0, "body"),
            body(70.0, "body"),
        ]]);
        let headings = FontHeadingDetector::default().detect_text(&text, false);
        assert_eq!(headings.len(), 1);
    }

    #[test]
    fn test_consecutive_duplicates_collapse() {
        let text = PageText::new(vec![vec![
            title(20.0, "Overview", 16.0),
            title(28.0, "Overview", 16.0),
            body(50.0, "body"),
            body(70.0, "body"),
            body(90.0, "body"),
        ]]);
        let headings = FontHeadingDetector::default().detect_text(&text, false);
        assert_eq!(headings.len(), 1);
    }

    #[test]
    fn test_uniform_font_yields_nothing() {
        let text = PageText::new(vec![vec![
            body(10.0, "one"),
            body(30.0, "two"),
        ]]);
        assert!(FontHeadingDetector::default().detect_text(&text, false).is_empty());
        assert!(FontHeadingDetector::default()
            .detect_text(&PageText::default(), false)
            .is_empty());
    }
}
