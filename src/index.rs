//! Document position index.
//!
//! Orders headings by their global [`Position`] (page, then `y`, then `x`)
//! and answers "nearest heading of each level at or before a position"
//! with a binary search per level.

use crate::model::{Heading, Position};

/// Stable sort of headings by position.
///
/// Headings sharing a position keep their input order, so sorting an
/// already sorted list changes nothing.
pub fn sort_headings(headings: &mut [Heading]) {
    headings.sort_by(|a, b| a.position.cmp(&b.position));
}

/// Check whether headings are in position order.
pub fn is_sorted(headings: &[Heading]) -> bool {
    headings.windows(2).all(|w| w[0].position <= w[1].position)
}

/// Read-only lookup structure over a heading list.
///
/// Borrows the headings; it lives no longer than one mapping pass.
#[derive(Debug, Clone)]
pub struct PositionIndex<'a> {
    /// All headings in position order
    ordered: Vec<&'a Heading>,
    /// `levels[k]` holds the level-(k+1) headings in position order,
    /// each with its rank in `ordered`
    levels: Vec<Vec<(usize, &'a Heading)>>,
}

impl<'a> PositionIndex<'a> {
    /// Build the index. The input need not be sorted.
    pub fn new(headings: &'a [Heading]) -> Self {
        let mut ordered: Vec<&'a Heading> = headings.iter().collect();
        ordered.sort_by(|a, b| a.position.cmp(&b.position));

        let max_level = ordered.iter().map(|h| h.level).max().unwrap_or(0) as usize;
        let mut levels: Vec<Vec<(usize, &'a Heading)>> = vec![Vec::new(); max_level];
        for (rank, heading) in ordered.iter().enumerate() {
            // Heading::new guarantees level >= 1
            if let Some(bucket) = levels.get_mut(heading.level.saturating_sub(1) as usize) {
                bucket.push((rank, *heading));
            }
        }

        Self { ordered, levels }
    }

    /// Number of indexed headings.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Deepest level present (0 when empty).
    pub fn max_level(&self) -> u8 {
        self.levels.len() as u8
    }

    /// Headings in position order.
    pub fn headings(&self) -> &[&'a Heading] {
        &self.ordered
    }

    /// The last heading of `level` at or before `position`.
    pub fn nearest_at_level(&self, level: u8, position: &Position) -> Option<&'a Heading> {
        self.nearest_ranked(level, position).map(|(_, heading)| heading)
    }

    /// Like [`nearest_at_level`](Self::nearest_at_level), also returning the
    /// heading's rank in document order.
    ///
    /// Ranks break ties between headings that share a position: of two
    /// headings at the same spot, the one listed later has the higher rank.
    pub fn nearest_ranked(&self, level: u8, position: &Position) -> Option<(usize, &'a Heading)> {
        let bucket = self.levels.get((level as usize).checked_sub(1)?)?;
        let end = bucket.partition_point(|(_, h)| h.position <= *position);
        end.checked_sub(1).map(|i| bucket[i])
    }

    /// Nearest heading at or before `position` for every level, index
    /// `level - 1`, from level 1 to [`max_level`](Self::max_level).
    pub fn nearest_by_level(&self, position: &Position) -> Vec<Option<&'a Heading>> {
        (1..=self.max_level())
            .map(|level| self.nearest_at_level(level, position))
            .collect()
    }
}
