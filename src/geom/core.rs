//! Points, vectors and tolerances shared by the evaluator and the mesher.

use std::ops::{Add, Mul, Sub};

/// Direction or displacement in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Right-handed cross product.
    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Unit vector in the same direction; `None` for zero or non-finite
    /// input.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        (len.is_finite() && len > 0.0).then(|| Self::new(self.x / len, self.y / len, self.z / len))
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

/// Position in 3D. Differences of points are [`Vec3`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Affine combination `self * t + previous * (1 - t)`.
    ///
    /// Returns `self` at `t == 1.0` and `previous` at `t == 0.0` bit-for-bit.
    #[must_use]
    pub fn blend(self, previous: Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self::new(
            self.x * t + previous.x * s,
            self.y * t + previous.y * s,
            self.z * t + previous.z * s,
        )
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self - other).length()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Point3,
    pub max: Point3,
}

impl BBox {
    /// Smallest box containing every point, or `None` for an empty input.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let init = Self {
            min: *first,
            max: *first,
        };
        Some(rest.iter().fold(init, |bbox, p| Self {
            min: Point3::new(bbox.min.x.min(p.x), bbox.min.y.min(p.y), bbox.min.z.min(p.z)),
            max: Point3::new(bbox.max.x.max(p.x), bbox.max.y.max(p.y), bbox.max.z.max(p.z)),
        }))
    }

    /// Length of the min-to-max diagonal.
    #[must_use]
    pub fn diagonal(self) -> f64 {
        self.min.distance_to(self.max)
    }
}

/// Absolute distance threshold for approximate comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Threshold for vanishing vectors at unit scale.
    pub const ZERO_LENGTH: Self = Self { eps: 1e-12 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    /// The same threshold relative to a length `scale`.
    #[must_use]
    pub fn scaled(self, scale: f64) -> Self {
        Self::new(self.eps * scale.abs())
    }

    #[must_use]
    pub fn approx_eq_point3(self, a: Point3, b: Point3) -> bool {
        a.distance_to(b) <= self.eps
    }

    #[must_use]
    pub fn approx_eq_vec3(self, a: Vec3, b: Vec3) -> bool {
        (a - b).length() <= self.eps
    }

    #[must_use]
    pub fn is_zero_vec3(self, v: Vec3) -> bool {
        v.length() <= self.eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_is_right_handed() {
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert_eq!(Vec3::Y.cross(Vec3::X), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn normalized_rejects_zero_and_nan() {
        assert!(Vec3::ZERO.normalized().is_none());
        assert!(Vec3::new(f64::NAN, 0.0, 0.0).normalized().is_none());
        let n = Vec3::new(3.0, 0.0, 4.0).normalized().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-12);
        assert!(Vec3::new(1e-20, 0.0, 0.0).normalized().is_some());
    }

    #[test]
    fn blend_is_exact_at_endpoints() {
        let a = Point3::new(0.1, 0.7, -3.3);
        let b = Point3::new(0.3, 1e-17, 42.0);
        assert_eq!(b.blend(a, 1.0), b);
        assert_eq!(b.blend(a, 0.0), a);

        let c = Point3::new(0.25, 0.75, -3.5);
        let d = Point3::new(0.5, 1.0, 42.0);
        assert_eq!(d.blend(c, 0.5), Point3::new(0.375, 0.875, 19.25));
    }

    #[test]
    fn point_difference_and_distance() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let q = Point3::new(0.0, 2.0, 5.0);
        assert_eq!(p - q, Vec3::new(1.0, 0.0, -2.0));
        assert!((p.distance_to(q) - 5.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn bbox_spans_all_points() {
        assert!(BBox::from_points(&[]).is_none());
        let bbox = BBox::from_points(&[
            Point3::new(0.0, 1.0, 2.0),
            Point3::new(-1.0, 3.0, 0.0),
            Point3::new(2.0, 2.0, 1.0),
        ])
        .unwrap();
        assert_eq!(bbox.min, Point3::new(-1.0, 1.0, 0.0));
        assert_eq!(bbox.max, Point3::new(2.0, 3.0, 2.0));
        assert!((bbox.diagonal() - 17.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn tolerance_scales_with_length() {
        let tol = Tolerance::new(1e-6);
        assert!(tol.approx_eq_vec3(Vec3::X, Vec3::new(1.0 + 1e-7, 0.0, 0.0)));
        assert!(!tol.approx_eq_vec3(Vec3::X, Vec3::new(1.0 + 1e-5, 0.0, 0.0)));

        let tiny = Vec3::new(1e-13, 0.0, 0.0);
        assert!(Tolerance::ZERO_LENGTH.is_zero_vec3(tiny));
        assert!(!Tolerance::ZERO_LENGTH.scaled(1e-3).is_zero_vec3(tiny));
    }
}
