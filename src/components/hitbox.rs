use serde::{Deserialize, Serialize};

use crate::components::mapposition::GridPosition;

/// Axis-aligned rectangle in grid units, used for every collision test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitBox {
    #[serde(rename = "gridX")]
    pub x: f32,
    #[serde(rename = "gridY")]
    pub y: f32,
    #[serde(rename = "gridWidth")]
    pub width: f32,
    #[serde(rename = "gridHeight")]
    pub height: f32,
}

impl HitBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
    pub fn top(&self) -> f32 {
        self.y
    }
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Place a box given relative to an anchor into the world, for a pawn standing at
    /// `position` whose sprite anchor sits at `origin`.
    pub fn placed(&self, position: GridPosition, origin: GridPosition) -> Self {
        Self {
            x: position.x + self.x - origin.x,
            y: position.y + self.y - origin.y,
            ..*self
        }
    }

    /// Strict overlap test. Boxes that only share an edge do not overlap, which is what
    /// lets movement park a pawn exactly flush against a wall.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_boxes() {
        let a = HitBox::new(0.0, 0.0, 2.0, 2.0);
        let b = HitBox::new(1.0, 1.0, 2.0, 2.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn shared_edge_is_not_overlap() {
        let a = HitBox::new(0.0, 0.0, 1.0, 1.0);
        let right = HitBox::new(1.0, 0.0, 1.0, 1.0);
        let below = HitBox::new(0.0, 1.0, 1.0, 1.0);
        let corner = HitBox::new(1.0, 1.0, 1.0, 1.0);
        for other in [right, below, corner] {
            assert!(!a.overlaps(&other));
            assert!(!other.overlaps(&a));
        }
    }

    #[test]
    fn containment_counts_as_overlap() {
        let outer = HitBox::new(-5.0, -5.0, 10.0, 10.0);
        let inner = HitBox::new(0.0, 0.0, 0.5, 0.5);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn placed_applies_position_and_origin() {
        let local = HitBox::new(0.25, 0.5, 1.0, 1.0);
        let world = local.placed(GridPosition::new(3.0, 4.0), GridPosition::new(0.5, 0.5));
        assert_eq!(world, HitBox::new(2.75, 4.0, 1.0, 1.0));
    }
}
