//! Splitting planes and point classification.

use nalgebra::{Point3, Vector3};

/// Distance under which a point counts as lying on a plane.
pub const PLANE_EPSILON: f32 = 1e-4;

/// Side of a plane a point falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Along the normal.
    Front,
    /// Against the normal.
    Back,
    /// Within the epsilon band.
    OnPlane,
}

/// A node's splitting plane: the points `p` with `normal · p = distance`.
///
/// The normal is always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f32>,
    distance: f32,
}

impl Plane {
    /// Builds a plane from any nonzero normal; normal and distance are both
    /// scaled to unit normal length.
    ///
    /// # Panics
    /// Panics on a zero normal.
    pub fn new(normal: Vector3<f32>, distance: f32) -> Self {
        let len = normal.norm();
        assert!(len > f32::EPSILON, "zero plane normal");
        Self {
            normal: normal / len,
            distance: distance / len,
        }
    }

    /// Plane through `point` facing `normal`.
    ///
    /// # Panics
    /// Panics on a zero normal.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        let len = normal.norm();
        assert!(len > f32::EPSILON, "zero plane normal");
        let normal = normal / len;
        Self {
            normal,
            distance: normal.dot(&point.coords),
        }
    }

    /// Plane through three points, facing `(b - a) × (c - a)`.
    ///
    /// # Panics
    /// Panics if the points are collinear.
    pub fn from_three_points(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self::from_point_and_normal(a, (b - a).cross(&(c - a)))
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Positive in front, negative behind.
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.distance
    }

    /// How far a box with the given half-extents reaches along the normal
    /// from its center.
    #[inline]
    pub fn push_out(&self, extent: &Vector3<f32>) -> f32 {
        self.normal.x.abs() * extent.x
            + self.normal.y.abs() * extent.y
            + self.normal.z.abs() * extent.z
    }

    /// Classifies `point` with [`PLANE_EPSILON`].
    #[inline]
    pub fn classify_point(&self, point: Point3<f32>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    pub fn classify_point_with_epsilon(&self, point: Point3<f32>, epsilon: f32) -> PlaneSide {
        match self.signed_distance(point) {
            d if d > epsilon => PlaneSide::Front,
            d if d < -epsilon => PlaneSide::Back,
            _ => PlaneSide::OnPlane,
        }
    }
}
