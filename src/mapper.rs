//! Heading-annotation mapping.
//!
//! Every annotation gets the chain of headings that contains it: the nearest
//! preceding level-1 heading, then the nearest preceding level-2 heading
//! inside it, and so on. Missing levels are never filled in.

use crate::index::PositionIndex;
use crate::model::{AnnotatedRecord, Annotation, Heading, HeadingPath, Position};

/// Assigns heading paths over one heading list.
#[derive(Debug, Clone)]
pub struct HeadingMapper<'a> {
    index: PositionIndex<'a>,
}

impl<'a> HeadingMapper<'a> {
    pub fn new(headings: &'a [Heading]) -> Self {
        Self {
            index: PositionIndex::new(headings),
        }
    }

    /// Heading path for a document position.
    ///
    /// The path stops at the first level without a preceding heading, and
    /// at a heading that comes before the parent already chosen in document
    /// order (it belongs to an earlier section), even when both share a
    /// position. An empty path is the uncategorized sentinel.
    pub fn path_for(&self, position: &Position) -> HeadingPath {
        let mut chain: Vec<Heading> = Vec::new();
        let mut parent_rank: Option<usize> = None;

        for level in 1..=self.index.max_level() {
            let Some((rank, heading)) = self.index.nearest_ranked(level, position) else {
                break;
            };
            // Must come after its parent in document order, ties included
            if parent_rank.is_some_and(|p| rank < p) {
                break;
            }
            chain.push(heading.clone());
            parent_rank = Some(rank);
        }

        HeadingPath::new(chain)
    }

    /// Map annotations to records in document order.
    ///
    /// The sort is stable, so annotations sharing an anchor keep their
    /// input order.
    pub fn map_all(&self, mut annotations: Vec<Annotation>) -> Vec<AnnotatedRecord> {
        annotations.sort_by(|a, b| a.position.cmp(&b.position));
        annotations
            .into_iter()
            .map(|annotation| {
                let path = self.path_for(&annotation.position);
                AnnotatedRecord { annotation, path }
            })
            .collect()
    }
}

/// Heading path of a single annotation.
///
/// Builds a throwaway index; use [`HeadingMapper`] for batches.
pub fn map_annotation(annotation: &Annotation, headings: &[Heading]) -> HeadingPath {
    HeadingMapper::new(headings).path_for(&annotation.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationKind, HeadingSource, UNCATEGORIZED};

    fn heading(level: u8, title: &str, page: usize, y: f32) -> Heading {
        Heading::new(level, title, Position::new(page, y, 0.0), HeadingSource::FromFontHeuristic)
    }

    fn note(page: usize, y: f32, comment: &str) -> Annotation {
        Annotation {
            kind: AnnotationKind::Comment,
            position: Position::new(page, y, 50.0),
            quads: Vec::new(),
            highlighted_text: String::new(),
            comment_text: comment.to_string(),
            author: String::new(),
            created_at: None,
        }
    }

    fn titles(path: &HeadingPath) -> Vec<&str> {
        path.headings().iter().map(|h| h.title.as_str()).collect()
    }

    fn outline() -> Vec<Heading> {
        vec![
            heading(1, "Chapter 1", 0, 50.0),
            heading(2, "Section 1.1", 0, 200.0),
            heading(3, "Detail 1.1.1", 1, 100.0),
            heading(2, "Section 1.2", 2, 50.0),
            heading(1, "Chapter 2", 3, 50.0),
        ]
    }

    #[test]
    fn test_full_breadcrumb() {
        let headings = outline();
        let mapper = HeadingMapper::new(&headings);

        let path = mapper.path_for(&Position::new(1, 300.0, 0.0));
        assert_eq!(titles(&path), vec!["Chapter 1", "Section 1.1", "Detail 1.1.1"]);

        let path = mapper.path_for(&Position::new(2, 400.0, 0.0));
        assert_eq!(titles(&path), vec!["Chapter 1", "Section 1.2"]);
    }

    #[test]
    fn test_new_chapter_resets_deeper_levels() {
        let headings = outline();
        let mapper = HeadingMapper::new(&headings);
        let path = mapper.path_for(&Position::new(3, 100.0, 0.0));
        assert_eq!(titles(&path), vec!["Chapter 2"]);
    }

    #[test]
    fn test_heading_position_is_inclusive() {
        let headings = outline();
        let mapper = HeadingMapper::new(&headings);
        let path = mapper.path_for(&Position::new(0, 200.0, 0.0));
        assert_eq!(titles(&path), vec!["Chapter 1", "Section 1.1"]);
    }

    #[test]
    fn test_shared_position_keeps_earlier_section_out() {
        let headings = vec![
            heading(1, "Chapter 1", 0, 0.0),
            heading(2, "1.5 Late section", 5, 0.0),
            heading(1, "Chapter 2", 5, 0.0),
        ];
        let mapper = HeadingMapper::new(&headings);
        let path = mapper.path_for(&Position::new(5, 300.0, 72.0));
        assert_eq!(titles(&path), vec!["Chapter 2"]);

        // Listed after its parent at the same spot: nested
        let headings = vec![
            heading(1, "Chapter 1", 0, 0.0),
            heading(1, "Chapter 2", 5, 0.0),
            heading(2, "2.1 Start", 5, 0.0),
        ];
        let path = HeadingMapper::new(&headings).path_for(&Position::new(5, 300.0, 72.0));
        assert_eq!(titles(&path), vec!["Chapter 2", "2.1 Start"]);
    }

    #[test]
    fn test_gap_truncates_path() {
        let headings = vec![heading(1, "Top", 0, 10.0), heading(3, "Deep", 0, 20.0)];
        let path = map_annotation(&note(0, 30.0, "x"), &headings);
        assert_eq!(titles(&path), vec!["Top"]);
    }

    #[test]
    fn test_before_first_heading_is_uncategorized() {
        let headings = outline();
        let path = map_annotation(&note(0, 10.0, "x"), &headings);
        assert!(path.is_uncategorized());
        assert_eq!(path.join(" > "), UNCATEGORIZED);
    }

    #[test]
    fn test_no_headings() {
        let path = map_annotation(&note(4, 10.0, "x"), &[]);
        assert!(path.is_uncategorized());
    }

    #[test]
    fn test_map_all_sorts_stably() {
        let headings = outline();
        let mapper = HeadingMapper::new(&headings);
        let records = mapper.map_all(vec![
            note(3, 60.0, "late"),
            note(0, 60.0, "early-a"),
            note(0, 60.0, "early-b"),
        ]);

        let order: Vec<_> = records
            .iter()
            .map(|r| r.annotation.comment_text.as_str())
            .collect();
        assert_eq!(order, vec!["early-a", "early-b", "late"]);
        assert_eq!(records[2].path.join(" > "), "Chapter 2");
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let headings = outline();
        let annotation = note(1, 120.0, "x");
        let first = map_annotation(&annotation, &headings);
        let second = map_annotation(&annotation, &headings);
        assert_eq!(first, second);
    }
}
