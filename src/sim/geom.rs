//! Axis-aligned geometry for grid entities
//!
//! Every body in the arena is an axis-aligned box centred on its position.
//! The rule engine only needs overlap and containment tests plus the side
//! on which two boxes touch.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Cardinal direction. Screen coordinates: `Up` is -y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in blast-arm order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector in world space
    #[inline]
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square box of side `size` centred on `center`
    pub fn from_center(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap: boxes that only share an edge do not intersect
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Inclusive point containment
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Which side of `self` is pressed into `other`, by least penetration.
    ///
    /// Returns `None` when the boxes do not intersect. `Some(Right)` means
    /// `self`'s right edge is inside `other`.
    pub fn contact_side(&self, other: &Aabb) -> Option<Direction> {
        if !self.intersects(other) {
            return None;
        }

        let pen_right = self.max.x - other.min.x;
        let pen_left = other.max.x - self.min.x;
        let pen_down = self.max.y - other.min.y;
        let pen_up = other.max.y - self.min.y;

        let (x_side, x_pen) = if pen_right < pen_left {
            (Direction::Right, pen_right)
        } else {
            (Direction::Left, pen_left)
        };
        let (y_side, y_pen) = if pen_down < pen_up {
            (Direction::Down, pen_down)
        } else {
            (Direction::Up, pen_up)
        };

        Some(if x_pen <= y_pen { x_side } else { y_side })
    }

    /// Penetration depth along the axis of `side` (see [`Aabb::contact_side`])
    pub fn penetration(&self, other: &Aabb, side: Direction) -> f32 {
        match side {
            Direction::Right => self.max.x - other.min.x,
            Direction::Left => other.max.x - self.min.x,
            Direction::Down => self.max.y - other.min.y,
            Direction::Up => other.max.y - self.min.y,
        }
        .max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Aabb::from_center(Vec2::new(0.0, 0.0), 1.0);
        let b = Aabb::from_center(Vec2::new(1.0, 0.0), 1.0);
        assert!(!a.intersects(&b));

        let c = Aabb::from_center(Vec2::new(0.9, 0.0), 1.0);
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let a = Aabb::from_center(Vec2::ZERO, 2.0);
        assert!(a.contains(Vec2::new(1.0, 1.0)));
        assert!(!a.contains(Vec2::new(1.01, 0.0)));
    }

    #[test]
    fn test_contact_side_picks_shallow_axis() {
        let enemy = Aabb::from_center(Vec2::new(0.0, 0.0), 30.0);
        // Wall slightly to the right, vertically aligned
        let wall = Aabb::from_center(Vec2::new(38.0, 2.0), 48.0);
        assert_eq!(enemy.contact_side(&wall), Some(Direction::Right));
        assert!((enemy.penetration(&wall, Direction::Right) - 1.0).abs() < 1e-4);

        let wall_above = Aabb::from_center(Vec2::new(0.0, -38.0), 48.0);
        assert_eq!(enemy.contact_side(&wall_above), Some(Direction::Up));

        let far = Aabb::from_center(Vec2::new(100.0, 0.0), 48.0);
        assert_eq!(enemy.contact_side(&far), None);
    }

    #[test]
    fn test_direction_opposite_and_unit() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.unit() + dir.opposite().unit(), Vec2::ZERO);
        }
    }
}
