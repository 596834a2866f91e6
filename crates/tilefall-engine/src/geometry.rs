//! Square entity bounds in integer pixel space.

use serde::{Deserialize, Serialize};

/// An axis-aligned square: top-left corner plus side length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub size: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, size: i32) -> Self {
        Self { x, y, size }
    }

    /// The four sampled corner points: `(x, y)`, `(x + size, y)`,
    /// `(x, y + size)`, `(x + size, y + size)`.
    ///
    /// The far corners sit one pixel past the covered area, so an entity of
    /// `size == tile_size` touching a tile edge counts as entering that tile.
    pub fn corners(&self) -> [(i32, i32); 4] {
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (self.x + self.size, self.y + self.size);
        [(x0, y0), (x1, y0), (x0, y1), (x1, y1)]
    }

    /// This rect moved by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            size: self.size,
        }
    }

    /// Overlap test with exclusive edges: squares that only share a border do
    /// not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        let x_overlap = self.x < other.x + other.size && self.x + self.size > other.x;
        let y_overlap = self.y < other.y + other.size && self.y + self.size > other.y;
        x_overlap && y_overlap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_squares_intersect_both_ways() {
        let a = Rect::new(0, 0, 20);
        let b = Rect::new(10, 10, 20);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        assert!(!Rect::new(0, 0, 20).intersects(&Rect::new(20, 0, 20)));
        assert!(!Rect::new(0, 0, 20).intersects(&Rect::new(0, 20, 20)));
    }

    #[test]
    fn contained_square_intersects() {
        assert!(Rect::new(0, 0, 100).intersects(&Rect::new(40, 40, 4)));
    }

    #[test]
    fn corners_include_far_edge() {
        assert_eq!(
            Rect::new(40, 40, 19).corners(),
            [(40, 40), (59, 40), (40, 59), (59, 59)]
        );
    }
}
