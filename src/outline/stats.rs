//! Font style statistics for heading detection.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::model::{FontStyle, PageText, TextFragment};

/// Frequency of (size, weight) styles over a document's fragments.
///
/// Computed once per run and handed to the detector explicitly. Keys are
/// ordered, so iteration never depends on hash order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontStatistics {
    histogram: BTreeMap<FontStyle, usize>,
}

impl FontStatistics {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gather statistics over every page.
    ///
    /// Pages are counted independently and merged, in parallel when asked.
    pub fn collect(text: &PageText, parallel: bool) -> Self {
        let pages = text.as_slices();
        if parallel {
            pages
                .par_iter()
                .map(|fragments| Self::from_fragments(fragments))
                .reduce(Self::new, Self::merge)
        } else {
            pages
                .iter()
                .map(|fragments| Self::from_fragments(fragments))
                .fold(Self::new(), Self::merge)
        }
    }

    /// Statistics of a single fragment list.
    pub fn from_fragments(fragments: &[TextFragment]) -> Self {
        let mut stats = Self::new();
        for fragment in fragments {
            stats.add_fragment(fragment);
        }
        stats
    }

    /// Add a fragment observation (blank fragments are not counted).
    pub fn add_fragment(&mut self, fragment: &TextFragment) {
        if !fragment.text.trim().is_empty() {
            self.add_style(fragment.style());
        }
    }

    /// Add a style observation.
    pub fn add_style(&mut self, style: FontStyle) {
        *self.histogram.entry(style).or_insert(0) += 1;
    }

    /// Combine two partial statistics.
    pub fn merge(mut self, other: Self) -> Self {
        for (style, count) in other.histogram {
            *self.histogram.entry(style).or_insert(0) += count;
        }
        self
    }

    /// Observations of one style.
    pub fn count(&self, style: FontStyle) -> usize {
        self.histogram.get(&style).copied().unwrap_or(0)
    }

    /// Total observations.
    pub fn total(&self) -> usize {
        self.histogram.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    /// Observed styles with their counts, smallest style first.
    pub fn styles(&self) -> impl Iterator<Item = (FontStyle, usize)> + '_ {
        self.histogram.iter().map(|(s, c)| (*s, *c))
    }

    /// The body text style.
    ///
    /// The single most frequent style wins. When several styles share the
    /// top count the most common size is used instead (counting both
    /// weights, ties going to the smaller size), bold only if every
    /// observation of that size is bold. `None` when nothing was observed.
    pub fn body_style(&self) -> Option<FontStyle> {
        let max = self.histogram.values().copied().max()?;
        let mut leaders = self.histogram.iter().filter(|(_, c)| **c == max);
        let first = leaders.next().map(|(s, _)| *s)?;
        if leaders.next().is_none() {
            return Some(first);
        }

        log::debug!("No unique body style ({} observations each), using size", max);

        let mut by_size: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
        for (style, count) in &self.histogram {
            let entry = by_size.entry(style.size_key()).or_insert((0, 0));
            entry.0 += count;
            if style.bold {
                entry.1 += count;
            }
        }

        // Ascending keys: max_by_key keeps the last maximum, so reverse first
        let (size_key, (total, bold)) = by_size
            .iter()
            .rev()
            .max_by_key(|(_, (total, _))| *total)?;
        Some(FontStyle::new(*size_key as f32 / 2.0, *bold == *total))
    }
}
