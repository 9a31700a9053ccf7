//! Positioned, sized bodies and their axis-aligned collision shape
//!
//! A body's position is the center of its box. Sizes are full extents.

use serde::{Deserialize, Serialize};

use super::stats::CharacterStats;
use super::vector::Vector2;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vector2,
    pub max: Vector2,
}

impl Aabb {
    pub fn from_center(center: Vector2, size: Vector2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vector2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }

    /// True when the boxes share a region of positive area; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Overlap extent per axis (zero on an axis with no overlap)
    pub fn penetration(&self, other: &Aabb) -> Vector2 {
        let x = (self.max.x.min(other.max.x) - self.min.x.max(other.min.x)).max(0.0);
        let y = (self.max.y.min(other.max.y) - self.min.y.max(other.min.y)).max(0.0);
        Vector2::new(x, y)
    }

    /// Overlap area, zero when the boxes are apart
    pub fn penetration_area(&self, other: &Aabb) -> f64 {
        let p = self.penetration(other);
        p.x * p.y
    }
}

/// Physical state shared by every entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub position: Vector2,
    pub size: Vector2,
    pub velocity: Vector2,
    /// Static bodies never move, even when pushed
    pub movable: bool,
    pub stats: CharacterStats,
    /// Render-only sprite offset; the physics step ignores it
    pub indent: Vector2,
}

impl Body {
    pub fn new(position: Vector2, size: Vector2, movable: bool, stats: CharacterStats) -> Self {
        Self {
            position,
            size,
            velocity: Vector2::ZERO,
            movable,
            stats,
            indent: Vector2::ZERO,
        }
    }

    /// Collision shape at the current position
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.size)
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.stats.physical.mass()
    }

    #[inline]
    pub fn friction(&self) -> f64 {
        self.stats.physical.friction()
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.aabb().overlaps(&other.aabb())
    }

    /// Shift by `delta`; no-op for static bodies
    pub fn translate(&mut self, delta: Vector2) {
        if self.movable {
            self.position += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_center() {
        let aabb = Aabb::from_center(Vector2::new(10.0, 20.0), Vector2::new(4.0, 6.0));
        assert_eq!(aabb.min, Vector2::new(8.0, 17.0));
        assert_eq!(aabb.max, Vector2::new(12.0, 23.0));
        assert_eq!(aabb.center(), Vector2::new(10.0, 20.0));
        assert_eq!(aabb.size(), Vector2::new(4.0, 6.0));
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vector2::ZERO, Vector2::new(2.0, 2.0));
        let b = Aabb::from_center(Vector2::new(1.5, 0.0), Vector2::new(2.0, 2.0));
        let touching = Aabb::from_center(Vector2::new(2.0, 0.0), Vector2::new(2.0, 2.0));
        let apart = Aabb::from_center(Vector2::new(5.0, 5.0), Vector2::new(2.0, 2.0));

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&touching));
        assert!(!a.overlaps(&apart));
        assert_eq!(a.penetration(&b), Vector2::new(0.5, 2.0));
        assert_eq!(a.penetration_area(&apart), 0.0);
    }

    #[test]
    fn test_static_body_ignores_translate() {
        let stats = CharacterStats::default();
        let mut wall = Body::new(Vector2::ZERO, Vector2::ONE, false, stats);
        wall.translate(Vector2::new(3.0, 0.0));
        assert_eq!(wall.position, Vector2::ZERO);

        let mut crate_body = Body::new(Vector2::ZERO, Vector2::ONE, true, stats);
        crate_body.translate(Vector2::new(3.0, 0.0));
        assert_eq!(crate_body.position, Vector2::new(3.0, 0.0));
    }
}
