//! Convex polygons handed to the model by a level loader.

use nalgebra::Point3;

use crate::{Plane, PlaneSide};

/// A planar convex polygon, wound counter-clockwise seen from the side its
/// plane normal points to.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point3<f32>>,
}

impl Polygon {
    /// Wraps a vertex loop.
    ///
    /// # Panics (debug builds only)
    /// Panics on fewer than 3 vertices or when the loop is not planar.
    pub fn new(vertices: Vec<Point3<f32>>) -> Self {
        debug_assert!(vertices.len() >= 3, "polygon needs at least 3 vertices");
        debug_assert!(is_planar(&vertices), "polygon vertices must be planar");
        Self { vertices }
    }

    /// An axis-aligned rectangle at `axis = value`. The remaining two axes
    /// span `min..max` in cyclic order (y/z for x, z/x for y, x/y for z), and
    /// the normal points along `+axis` unless `facing_positive` is false.
    pub fn axis_rect(
        axis: usize,
        value: f32,
        min: [f32; 2],
        max: [f32; 2],
        facing_positive: bool,
    ) -> Self {
        let (s_axis, t_axis) = match axis {
            0 => (1, 2),
            1 => (2, 0),
            _ => (0, 1),
        };
        let corner = |s: f32, t: f32| {
            let mut p = Point3::origin();
            p[axis] = value;
            p[s_axis] = s;
            p[t_axis] = t;
            p
        };
        let mut vertices = vec![
            corner(min[0], min[1]),
            corner(max[0], min[1]),
            corner(max[0], max[1]),
            corner(min[0], max[1]),
        ];
        if !facing_positive {
            vertices.reverse();
        }
        Self::new(vertices)
    }

    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    /// Plane through the first three vertices, facing by winding.
    ///
    /// # Panics
    /// Panics if the first three vertices are collinear.
    pub fn plane(&self) -> Plane {
        Plane::from_three_points(self.vertices[0], self.vertices[1], self.vertices[2])
    }
}

fn is_planar(vertices: &[Point3<f32>]) -> bool {
    if vertices.len() <= 3 {
        return true;
    }
    let plane = Plane::from_three_points(vertices[0], vertices[1], vertices[2]);
    vertices[3..]
        .iter()
        .all(|&v| plane.classify_point(v) == PlaneSide::OnPlane)
}
