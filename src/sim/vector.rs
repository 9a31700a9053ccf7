//! 2D vector helpers
//!
//! [`Vector2`] is glam's `DVec2`: a `Copy` value type with the usual operators.
//! [`VectorExt`] adds the few operations the game needs that glam spells
//! differently or not at all. Every method returns a new vector.

use glam::DVec2;

use crate::normalize_angle;

/// Position, size and velocity type used throughout the simulation
pub type Vector2 = DVec2;

pub trait VectorExt {
    /// Unit vector in the same direction, or zero for the zero vector
    fn normalized(self) -> Self;

    /// Componentwise sign in {-1, 0, 1} (glam's `signum` maps 0 to 1)
    fn sign(self) -> Self;

    /// Vector rotated counter-clockwise by `angle` radians
    fn rotated(self, angle: f64) -> Self;

    /// Direction angle in [0, 2π), 0 for the zero vector
    fn angle(self) -> f64;
}

#[inline]
fn sign_of(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl VectorExt for DVec2 {
    #[inline]
    fn normalized(self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return DVec2::ZERO;
        }
        self / length
    }

    #[inline]
    fn sign(self) -> Self {
        DVec2::new(sign_of(self.x), sign_of(self.y))
    }

    #[inline]
    fn rotated(self, angle: f64) -> Self {
        DVec2::from_angle(angle).rotate(self)
    }

    fn angle(self) -> f64 {
        if self.length() == 0.0 {
            return 0.0;
        }
        normalize_angle(self.y.atan2(self.x))
    }
}
