//! Convex polygon clipping against planes and projector frustums.

use nalgebra::{Point3, Unit, Vector3};

use crate::{BoundingBox, Plane, PlaneSide};

/// A polygon vertex that can be clipped: it has a position and every other
/// attribute it carries can be linearly interpolated.
pub trait ClipVertex: Clone {
    /// World-space position used for plane classification.
    fn position(&self) -> Point3<f32>;

    /// Interpolates every attribute between `self` (t = 0) and `other` (t = 1).
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl ClipVertex for Point3<f32> {
    fn position(&self) -> Point3<f32> {
        *self
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

/// Clips a convex polygon to the front half-space of `plane`.
///
/// Walks the polygon edges, keeping front and on-plane vertices and inserting
/// an interpolated vertex wherever an edge crosses from one side to the other.
/// Returns an empty list when nothing lies in front.
pub fn clip_to_front<V: ClipVertex>(vertices: &[V], plane: &Plane, epsilon: f32) -> Vec<V> {
    let n = vertices.len();
    let mut kept = Vec::with_capacity(n + 1);
    if n == 0 {
        return kept;
    }

    let distances: Vec<f32> = vertices
        .iter()
        .map(|v| plane.signed_distance(v.position()))
        .collect();
    let sides: Vec<PlaneSide> = vertices
        .iter()
        .map(|v| plane.classify_point_with_epsilon(v.position(), epsilon))
        .collect();

    for i in 0..n {
        let next_idx = (i + 1) % n;

        if sides[i] != PlaneSide::Back {
            kept.push(vertices[i].clone());
        }

        let crosses = matches!(
            (sides[i], sides[next_idx]),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );
        if crosses {
            let t = distances[i] / (distances[i] - distances[next_idx]);
            kept.push(vertices[i].lerp(&vertices[next_idx], t));
        }
    }

    kept
}

/// Six inward-facing planes bounding a projector volume.
///
/// A point is inside when it is in front of (or on) every plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
    bounds: BoundingBox,
}

impl Frustum {
    /// Creates a frustum from explicit planes and a box enclosing the volume.
    pub fn from_planes(planes: [Plane; 6], bounds: BoundingBox) -> Self {
        Self { planes, bounds }
    }

    /// Creates a frustum matching an axis-aligned box.
    pub fn from_box(bounds: BoundingBox) -> Self {
        let min = bounds.min();
        let max = bounds.max();
        let planes = [
            Plane::new(Vector3::x(), min.x),
            Plane::new(-Vector3::x(), -max.x),
            Plane::new(Vector3::y(), min.y),
            Plane::new(-Vector3::y(), -max.y),
            Plane::new(Vector3::z(), min.z),
            Plane::new(-Vector3::z(), -max.z),
        ];
        Self { planes, bounds }
    }

    /// Creates an orthographic projector volume: a box starting at `origin`,
    /// extending `depth` along `forward`, with half-sizes `half_width` along
    /// `forward × up` and `half_height` along the re-orthogonalized up axis.
    ///
    /// Returns `None` if `forward` and `up` are parallel.
    pub fn oriented(
        origin: Point3<f32>,
        forward: Unit<Vector3<f32>>,
        up: Vector3<f32>,
        half_width: f32,
        half_height: f32,
        depth: f32,
    ) -> Option<Self> {
        let forward = forward.into_inner();
        let right = Unit::try_new(forward.cross(&up), f32::EPSILON)?.into_inner();
        let up = right.cross(&forward).normalize();

        let far = origin + forward * depth;
        let planes = [
            Plane::from_point_and_normal(origin, forward),
            Plane::from_point_and_normal(far, -forward),
            Plane::from_point_and_normal(origin - right * half_width, right),
            Plane::from_point_and_normal(origin + right * half_width, -right),
            Plane::from_point_and_normal(origin - up * half_height, up),
            Plane::from_point_and_normal(origin + up * half_height, -up),
        ];

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);
        for base in [origin, far] {
            for sx in [-half_width, half_width] {
                for sy in [-half_height, half_height] {
                    let corner = base + right * sx + up * sy;
                    min = min.inf(&corner);
                    max = max.sup(&corner);
                }
            }
        }

        Some(Self {
            planes,
            bounds: BoundingBox::from_min_max(min, max),
        })
    }

    /// Returns the six bounding planes.
    #[inline]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Returns a box enclosing the frustum.
    #[inline]
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Returns `true` if the point is inside or on every plane.
    pub fn contains_point(&self, point: Point3<f32>, epsilon: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) >= -epsilon)
    }

    /// Clips a convex polygon against all six planes in order.
    pub fn clip<V: ClipVertex>(&self, vertices: Vec<V>, epsilon: f32) -> Vec<V> {
        let mut current = vertices;
        for plane in &self.planes {
            if current.is_empty() {
                break;
            }
            current = clip_to_front(&current, plane, epsilon);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PLANE_EPSILON, Polygon};
    use assert_approx_eq::assert_approx_eq;

    fn unit_square() -> Vec<Point3<f32>> {
        Polygon::axis_rect(2, 0.0, [0.0, 0.0], [1.0, 1.0], true)
            .vertices()
            .to_vec()
    }

    #[test]
    fn clip_keeps_front_polygon() {
        let plane = Plane::new(Vector3::x(), -1.0);
        let clipped = clip_to_front(&unit_square(), &plane, PLANE_EPSILON);
        assert_eq!(clipped, unit_square());
    }

    #[test]
    fn clip_drops_back_polygon() {
        let plane = Plane::new(Vector3::x(), 5.0);
        assert!(clip_to_front(&unit_square(), &plane, PLANE_EPSILON).is_empty());
    }

    #[test]
    fn clip_splits_spanning_polygon() {
        let plane = Plane::new(Vector3::x(), 0.5);
        let clipped = clip_to_front(&unit_square(), &plane, PLANE_EPSILON);
        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|p| p.x >= 0.5 - PLANE_EPSILON));
    }

    #[test]
    fn on_plane_vertices_are_kept_without_duplicates() {
        let plane = Plane::new(Vector3::x(), 0.0);
        let clipped = clip_to_front(&unit_square(), &plane, PLANE_EPSILON);
        assert_eq!(clipped.len(), 4);
    }

    #[derive(Clone, Debug)]
    struct Shaded {
        position: Point3<f32>,
        weight: f32,
    }

    impl ClipVertex for Shaded {
        fn position(&self) -> Point3<f32> {
            self.position
        }

        fn lerp(&self, other: &Self, t: f32) -> Self {
            Shaded {
                position: self.position.lerp(&other.position, t),
                weight: self.weight + (other.weight - self.weight) * t,
            }
        }
    }

    #[test]
    fn clip_interpolates_attributes() {
        let verts = vec![
            Shaded { position: Point3::new(0.0, 0.0, 0.0), weight: 0.0 },
            Shaded { position: Point3::new(2.0, 0.0, 0.0), weight: 1.0 },
            Shaded { position: Point3::new(2.0, 2.0, 0.0), weight: 1.0 },
        ];
        let clipped = clip_to_front(&verts, &Plane::new(-Vector3::x(), -1.0), PLANE_EPSILON);
        let cut = clipped
            .iter()
            .find(|v| (v.position.x - 1.0).abs() < 1e-5 && v.position.y == 0.0)
            .unwrap();
        assert_approx_eq!(cut.weight, 0.5);
    }

    #[test]
    fn box_frustum_contains_inner_polygon() {
        let frustum = Frustum::from_box(BoundingBox::from_min_max(
            Point3::new(-5.0, -5.0, -5.0),
            Point3::new(5.0, 5.0, 5.0),
        ));
        let clipped = frustum.clip(unit_square(), PLANE_EPSILON);
        assert_eq!(clipped, unit_square());
    }

    #[test]
    fn box_frustum_excludes_outer_polygon() {
        let frustum = Frustum::from_box(BoundingBox::from_min_max(
            Point3::new(10.0, 10.0, -1.0),
            Point3::new(12.0, 12.0, 1.0),
        ));
        assert!(frustum.clip(unit_square(), PLANE_EPSILON).is_empty());
    }

    #[test]
    fn oriented_frustum_bounds_and_containment() {
        let frustum = Frustum::oriented(
            Point3::new(0.0, 0.0, 10.0),
            -Vector3::z_axis(),
            Vector3::y(),
            1.0,
            2.0,
            20.0,
        )
        .unwrap();
        assert!(frustum.contains_point(Point3::new(0.5, 1.5, 0.0), PLANE_EPSILON));
        assert!(!frustum.contains_point(Point3::new(0.0, 0.0, 11.0), PLANE_EPSILON));
        assert!(!frustum.contains_point(Point3::new(1.5, 0.0, 0.0), PLANE_EPSILON));
        assert_approx_eq!(frustum.bounds().min().z, -10.0);
        assert_approx_eq!(frustum.bounds().max().y, 2.0);
    }

    #[test]
    fn oriented_rejects_parallel_up() {
        assert!(
            Frustum::oriented(Point3::origin(), Vector3::z_axis(), Vector3::z(), 1.0, 1.0, 1.0)
                .is_none()
        );
    }
}
