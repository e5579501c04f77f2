//! Ground-plane geometry.
//!
//! The simulation only reasons about the horizontal plane; height is the
//! renderer's concern.

use serde::{Deserialize, Serialize};

/// A point or direction on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// East-west coordinate.
    pub x: f32,
    /// North-south coordinate.
    pub z: f32,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, z: 0.0 };

    /// Construct a vector from its components.
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.x.hypot(self.z)
    }

    /// Distance to another point.
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Scale by a factor.
    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.z * factor)
    }

    /// Unit vector in the same direction, or `None` for (near) zero length.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len <= f32::EPSILON || !len.is_finite() {
            return None;
        }
        Some(self.scale(len.recip()))
    }

    /// Unit vector at `angle` radians from the +x axis.
    pub fn from_angle(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin)
    }

    /// Both components are finite numbers.
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

impl core::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.z + other.z)
    }
}

impl core::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.z - other.z)
    }
}

impl core::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.z)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_has_no_direction() {
        assert!(Vec2::ZERO.normalized().is_none());
    }

    #[test]
    fn normalized_has_unit_length() {
        let n = Vec2::new(10.0, -2.0).normalized().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(!Vec2::new(f32::NAN, 0.0).is_finite());
        assert!(Vec2::new(1.0, 2.0).is_finite());
    }
}
