//! Bounding volumes used by the query engine.

use nalgebra::{Point3, Vector3};

/// An axis-aligned box stored as a center and half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    center: Point3<f32>,
    extent: Vector3<f32>,
}

impl BoundingBox {
    /// Creates a box from its center and half-extents.
    ///
    /// Negative extents are folded to their absolute value.
    pub fn new(center: Point3<f32>, extent: Vector3<f32>) -> Self {
        Self {
            center,
            extent: extent.abs(),
        }
    }

    /// Creates a box from two opposite corners.
    pub fn from_min_max(min: Point3<f32>, max: Point3<f32>) -> Self {
        let center = nalgebra::center(&min, &max);
        Self::new(center, (max - min) * 0.5)
    }

    /// Returns the center of the box.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    /// Returns the half-extents of the box.
    #[inline]
    pub fn extent(&self) -> Vector3<f32> {
        self.extent
    }

    /// Returns the minimum corner.
    #[inline]
    pub fn min(&self) -> Point3<f32> {
        self.center - self.extent
    }

    /// Returns the maximum corner.
    #[inline]
    pub fn max(&self) -> Point3<f32> {
        self.center + self.extent
    }

    /// Radius of the smallest sphere around the box center that holds the box.
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.extent.norm()
    }

    /// Returns `true` when the smallest extent is more than `ratio` times the
    /// largest, i.e. the box is close enough to a cube to be tested as a sphere.
    pub fn is_nearly_cubical(&self, ratio: f32) -> bool {
        self.extent.min() > self.extent.max() * ratio
    }

    /// Returns `true` if the sphere overlaps the box.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let min = self.min();
        let max = self.max();
        let mut dist_sq = 0.0;
        for axis in 0..3 {
            let c = sphere.center[axis];
            if c < min[axis] {
                dist_sq += (min[axis] - c).powi(2);
            } else if c > max[axis] {
                dist_sq += (c - max[axis]).powi(2);
            }
        }
        dist_sq <= sphere.radius * sphere.radius
    }
}

/// A bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Point3<f32>,
    /// Radius of the sphere. Zero for an empty/degenerate volume.
    pub radius: f32,
}

impl Sphere {
    /// Creates a sphere.
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Returns the sphere bounding a set of points (centroid + farthest point),
    /// or `None` if there are no points.
    pub fn from_points(points: &[Point3<f32>]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let sum: Vector3<f32> = points.iter().map(|p| p.coords).sum();
        let center = Point3::from(sum / points.len() as f32);
        let radius = points
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0, f32::max);
        Some(Self { center, radius })
    }

    /// Returns the smallest sphere of the form produced here that holds both
    /// `self` and `other`.
    pub fn merged(&self, other: &Sphere) -> Sphere {
        let offset = other.center - self.center;
        let dist = offset.norm();
        if dist + other.radius <= self.radius {
            return *self;
        }
        if dist + self.radius <= other.radius {
            return *other;
        }
        let radius = (dist + self.radius + other.radius) * 0.5;
        let center = self.center + offset * ((radius - self.radius) / dist);
        Sphere { center, radius }
    }
}
