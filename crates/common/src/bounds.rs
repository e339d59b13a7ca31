use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world units, +Y up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl WorldBounds {
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn from_center_half_extents(center: Vec2, half: Vec2) -> Self {
        Self {
            left: center.x - half.x,
            bottom: center.y - half.y,
            right: center.x + half.x,
            top: center.y + half.y,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.bottom + self.top) * 0.5,
        )
    }

    /// Inclusive containment on all four edges.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }

    /// True when the two rectangles overlap or touch.
    pub fn intersects(&self, other: &WorldBounds) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.bottom <= other.top
            && other.bottom <= self.top
    }

    /// `[left, bottom, right, top]`.
    pub fn to_array(self) -> [f32; 4] {
        [self.left, self.bottom, self.right, self.top]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_center_half_extents() {
        let b = WorldBounds::from_center_half_extents(Vec2::new(10.0, -4.0), Vec2::new(3.0, 2.0));
        assert_eq!(b.to_array(), [7.0, -6.0, 13.0, -2.0]);
        assert_eq!(b.width(), 6.0);
        assert_eq!(b.height(), 4.0);
        assert_eq!(b.center(), Vec2::new(10.0, -4.0));
    }

    #[test]
    fn contains_is_inclusive() {
        let b = WorldBounds::new(0.0, 0.0, 10.0, 5.0);
        assert!(b.contains(0.0, 0.0));
        assert!(b.contains(10.0, 5.0));
        assert!(b.contains(4.0, 2.0));
        assert!(!b.contains(10.1, 2.0));
        assert!(!b.contains(4.0, -0.1));
    }

    #[test]
    fn intersects_detects_overlap_and_touch() {
        let a = WorldBounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&WorldBounds::new(5.0, 5.0, 15.0, 15.0)));
        assert!(a.intersects(&WorldBounds::new(10.0, 0.0, 20.0, 10.0)));
        assert!(!a.intersects(&WorldBounds::new(10.5, 0.0, 20.0, 10.0)));
        assert!(!a.intersects(&WorldBounds::new(0.0, -5.0, 10.0, -0.5)));
    }
}
