//! Geometry primitives: a 2D vector and the position + radius pair that
//! curves are built from.

use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Lengths at or below this are treated as zero by [`Vec2::normalize`].
const NORMALIZE_EPSILON: f64 = f32::EPSILON as f64;

/// A 2D vector in contour (image pixel) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component (pixels from left edge).
    pub x: f64,
    /// Vertical component (pixels from top edge).
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// Z component of the 3D cross product of the two vectors.
    ///
    /// Positive when `other` is counter-clockwise from `self` in a
    /// y-up frame.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x.mul_add(other.y, -(self.y * other.x))
    }

    /// Squared length.
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Scale to unit length in place.
    ///
    /// Degenerate vectors (length at or below `f32::EPSILON`) are left
    /// untouched, so a zero vector stays zero.
    pub fn normalize(&mut self) {
        let length = self.length();
        if length > NORMALIZE_EPSILON {
            self.x /= length;
            self.y /= length;
        }
    }

    /// Unit-length copy. See [`normalize`](Self::normalize).
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut v = self;
        v.normalize();
        v
    }

    /// The vector rotated by 90 degrees: `(-y, x)`.
    #[must_use]
    pub const fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// A curve sample: a centerline position and the vessel radius there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Centerline position.
    pub position: Vec2,
    /// Half the vessel width at `position`. Never negative.
    pub radius: f64,
}

impl CurvePoint {
    /// Create a new curve point.
    #[must_use]
    pub const fn new(position: Vec2, radius: f64) -> Self {
        Self { position, radius }
    }

    /// Convenience constructor from raw coordinates.
    #[must_use]
    pub const fn at(x: f64, y: f64, radius: f64) -> Self {
        Self::new(Vec2::new(x, y), radius)
    }

    /// Weighted sum helper used by the FIR filters: `self + w * other`
    /// applied to both position and radius.
    #[must_use]
    pub(crate) fn add_weighted(self, other: Self, weight: f64) -> Self {
        Self {
            position: self.position + other.position * weight,
            radius: weight.mul_add(other.radius, self.radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn arithmetic() {
        let a = Vec2::new(1.1, 2.2);
        let b = Vec2::new(3.3, 4.4);

        let mut sum = a + b;
        sum += b;
        assert!(approx(sum.x, 1.1 + 2.0 * 3.3));
        assert!(approx(sum.y, 2.2 + 2.0 * 4.4));

        let mut diff = a - b;
        diff -= a;
        assert!(approx(diff.x, -3.3));
        assert!(approx(diff.y, -4.4));

        let mut scaled = a * 2.0;
        scaled *= 2.0;
        assert!(approx(scaled.x, 4.4));
        assert_eq!(2.0 * a, a * 2.0);
        assert_eq!(-a, Vec2::new(-1.1, -2.2));
    }

    #[test]
    fn dot_and_cross() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);
        assert!(approx(a.dot(b), 11.0));
        assert!(approx(a.cross(b), -2.0));
        assert!(approx(Vec2::new(1.0, 0.0).cross(Vec2::new(0.0, 1.0)), 1.0));
    }

    #[test]
    fn length_and_distance() {
        let v = Vec2::new(3.0, 4.0);
        assert!(approx(v.length(), 5.0));
        assert!(approx(v.length_squared(), 25.0));
        assert!(approx(Vec2::ZERO.distance(v), 5.0));
    }

    #[test]
    fn normalize_unit_length() {
        let n = Vec2::new(3.0, 4.0).normalized();
        assert!(approx(n.length(), 1.0));
        assert!(approx(n.x, 0.6));
    }

    #[test]
    fn normalize_zero_stays_zero() {
        let mut v = Vec2::ZERO;
        v.normalize();
        assert_eq!(v, Vec2::ZERO);
        assert_eq!(Vec2::new(1e-9, 0.0).normalized(), Vec2::new(1e-9, 0.0));
    }

    #[test]
    fn perpendicular_rotates_counter_clockwise() {
        assert_eq!(Vec2::new(0.0, 1.0).perpendicular(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn curve_point_weighted_sum() {
        let acc = CurvePoint::default()
            .add_weighted(CurvePoint::at(2.0, 4.0, 1.0), 0.5)
            .add_weighted(CurvePoint::at(4.0, 0.0, 3.0), 0.5);
        assert!(approx(acc.position.x, 3.0));
        assert!(approx(acc.position.y, 2.0));
        assert!(approx(acc.radius, 2.0));
    }

    #[test]
    fn curve_point_serde_round_trip() {
        let p = CurvePoint::at(3.25, -2.5, 1.75);
        let json = serde_json::to_string(&p).unwrap_or_default();
        let back: CurvePoint = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(p, back);
    }
}
