//! 3D vector in feet-space for positions, velocities and accelerations.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// 3D vector with the handful of operations the kinematic model needs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// Toward first base (ft)
    pub x: f64,
    /// Toward the pitcher, plate at 0 (ft)
    pub y: f64,
    /// Up from the ground (ft)
    pub z: f64,
}

impl Vec3 {
    /// Creates a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Magnitude (length) of the vector.
    #[inline(always)]
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Dot product.
    #[inline(always)]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Distance to another vector.
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).magnitude()
    }

    /// Distance in the plate plane, ignoring y.
    pub fn distance_xz(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.z - other.z)
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Position after `t` seconds under constant acceleration:
    /// p + v·t + ½·a·t²
    #[inline(always)]
    pub fn advance(&self, velocity: &Self, acceleration: &Self, t: f64) -> Self {
        *self + *velocity * t + *acceleration * (0.5 * t * t)
    }

    /// Convert to array.
    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(0.5, -1.0, 2.0);
        assert_eq!(a + b, Vec3::new(1.5, 1.0, 5.0));
        assert_eq!(a - b, Vec3::new(0.5, 3.0, 1.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
        assert_relative_eq!(a.dot(&b), 0.5 - 2.0 + 6.0);
    }

    #[test]
    fn test_magnitude_and_distance() {
        let v = Vec3::new(3.0, 4.0, 12.0);
        assert_relative_eq!(v.magnitude(), 13.0);
        assert_relative_eq!(v.distance(&Vec3::zero()), 13.0);
        // y is ignored in the plate plane
        assert_relative_eq!(v.distance_xz(&Vec3::new(0.0, 100.0, 8.0)), 5.0);
    }

    #[test]
    fn test_advance() {
        let p = Vec3::new(0.0, 10.0, 6.0);
        let v = Vec3::new(1.0, -20.0, 0.0);
        let a = Vec3::new(0.0, 4.0, -32.0);
        let q = p.advance(&v, &a, 0.5);
        assert_relative_eq!(q.x, 0.5);
        assert_relative_eq!(q.y, 10.0 - 10.0 + 0.5);
        assert_relative_eq!(q.z, 6.0 - 4.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(Vec3::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Vec3::new(f64::NAN, 2.0, 3.0).is_finite());
        assert!(!Vec3::new(1.0, f64::INFINITY, 3.0).is_finite());
    }
}
