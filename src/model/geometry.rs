//! Page positions and rectangles in top-down page space.
//!
//! All coordinates handed to the core use PDF points with the origin at the
//! top-left corner of the page: `y` grows downward, `x` grows to the right.
//! The backend converts from PDF user space (bottom-up) before anything
//! reaches this module.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A global document position: page, then vertical, then horizontal offset.
///
/// Ordering is total: page ascending, `y` ascending (top of page first),
/// `x` ascending. Float comparisons use `total_cmp` so `NaN` never breaks
/// a sort.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    /// 0-based page index
    pub page: usize,
    /// Distance from the top of the page
    pub y: f32,
    /// Distance from the left edge of the page
    pub x: f32,
}

impl Position {
    /// Create a new position.
    pub fn new(page: usize, y: f32, x: f32) -> Self {
        Self { page, y, x }
    }

    /// Top-left corner of a page.
    pub fn page_top(page: usize) -> Self {
        Self::new(page, 0.0, 0.0)
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Position {}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.page
            .cmp(&other.page)
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.x.total_cmp(&other.x))
    }
}

/// Axis-aligned rectangle in top-down page space (`top <= bottom`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Create a rectangle from any two opposite corners.
    ///
    /// Non-finite coordinates are kept as given rather than normalized, so
    /// [`is_finite`](Self::is_finite) reports them.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return Self {
                left: x0,
                top: y0,
                right: x1,
                bottom: y1,
            };
        }
        Self {
            left: x0.min(x1),
            top: y0.min(y1),
            right: x0.max(x1),
            bottom: y0.max(y1),
        }
    }

    /// Convert a PDF user-space rectangle (bottom-up) into top-down space.
    pub fn from_pdf(x0: f32, y0: f32, x1: f32, y1: f32, page_height: f32) -> Self {
        Self::new(x0, page_height - y0, x1, page_height - y1)
    }

    /// Bounding rectangle of a set of points in top-down space.
    ///
    /// `None` for no points or any non-finite coordinate.
    pub fn bounding(points: &[(f32, f32)]) -> Option<Self> {
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return None;
        }
        let (first, rest) = points.split_first()?;
        let mut rect = Self::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            rect.left = rect.left.min(x);
            rect.right = rect.right.max(x);
            rect.top = rect.top.min(y);
            rect.bottom = rect.bottom.max(y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Check whether a point lies inside the rectangle (edges included).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Top-left corner as a document position on the given page.
    pub fn anchor(&self, page: usize) -> Position {
        Position::new(page, self.top, self.left)
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        let a = Position::new(0, 500.0, 10.0);
        let b = Position::new(1, 10.0, 10.0);
        let c = Position::new(1, 10.0, 20.0);
        let d = Position::new(1, 30.0, 0.0);

        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
        assert_eq!(b, Position::new(1, 10.0, 10.0));
    }

    #[test]
    fn test_position_sort_with_nan() {
        let mut positions = vec![
            Position::new(0, f32::NAN, 0.0),
            Position::new(0, 5.0, 0.0),
            Position::new(0, 1.0, 0.0),
        ];
        positions.sort();
        assert_eq!(positions[0].y, 1.0);
        assert_eq!(positions[1].y, 5.0);
    }

    #[test]
    fn test_rect_from_pdf() {
        // 100pt tall page, box from y=60 to y=80 in PDF space
        let rect = Rect::from_pdf(10.0, 60.0, 50.0, 80.0, 100.0);
        assert_eq!(rect.top, 20.0);
        assert_eq!(rect.bottom, 40.0);
        assert_eq!(rect.left, 10.0);
        assert_eq!(rect.width(), 40.0);
        assert_eq!(rect.height(), 20.0);
    }

    #[test]
    fn test_rect_bounding() {
        let rect = Rect::bounding(&[(30.0, 5.0), (10.0, 15.0), (20.0, 1.0)]).unwrap();
        assert_eq!(rect, Rect::new(10.0, 1.0, 30.0, 15.0));
        assert!(Rect::bounding(&[]).is_none());
    }

    #[test]
    fn test_non_finite_corners_are_not_repaired() {
        let rect = Rect::new(f32::NAN, 0.0, 1.0, 1.0);
        assert!(!rect.is_finite());
        assert!(!Rect::new(0.0, 0.0, f32::INFINITY, 1.0).is_finite());
        assert!(Rect::new(3.0, 4.0, 1.0, 2.0).is_finite());

        assert!(Rect::bounding(&[(0.0, 0.0), (f32::NAN, 5.0)]).is_none());
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(5.0, 5.0));
        assert!(rect.contains(10.0, 0.0));
        assert!(!rect.contains(10.5, 5.0));
    }
}
