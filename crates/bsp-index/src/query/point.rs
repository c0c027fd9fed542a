//! Point and line collision entry points.
//!
//! A terminal front side is always empty space. A terminal back side is a
//! leaf when it names one and solid otherwise, unless the node's surface is
//! flagged [`PolyFlags::NOT_SOLID`].

use nalgebra::{Point3, Vector3};

use crate::{BspModel, BspNode, LeafIndex, NodeIndex, PolyFlags};

/// Where a point ended up after descending the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRegion {
    /// Last node visited.
    pub node: NodeIndex,
    /// Leaf containing the point, if the region is a leaf.
    pub leaf: Option<LeafIndex>,
    /// Zone of that leaf.
    pub zone: Option<usize>,
    /// Whether the point is inside solid space.
    pub solid: bool,
}

/// First contact of a segment with solid space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHit {
    /// Fraction of the segment travelled before the hit, in `[0, 1]`.
    pub time: f32,
    /// World position of the hit.
    pub location: Point3<f32>,
    /// Normal of the plane that was crossed into solid, facing the start.
    /// Zero when the segment starts inside solid.
    pub normal: Vector3<f32>,
    /// Node whose plane was hit, if any.
    pub node: Option<NodeIndex>,
}

impl LineHit {
    /// Returns `true` if the segment started inside solid space.
    pub fn started_solid(&self) -> bool {
        self.node.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    normal: Vector3<f32>,
    node: NodeIndex,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    start: Point3<f32>,
    end: Point3<f32>,
    t_start: f32,
    t_end: f32,
}

impl BspModel {
    fn back_is_solid(&self, node: &BspNode) -> bool {
        node.back_leaf().is_none()
            && self
                .surfaces()
                .get(node.surface())
                .is_none_or(|surface| !surface.flags.contains(PolyFlags::NOT_SOLID))
    }

    /// Finds the region containing `point`. Returns `None` for an empty model.
    pub fn point_region(&self, point: Point3<f32>) -> Option<PointRegion> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut index = 0;
        loop {
            let node = &self.nodes[index];
            let front = node.plane().signed_distance(point) >= 0.0;
            let child = if front { node.front() } else { node.back() };
            match child {
                Some(next) => index = next,
                None => {
                    let leaf = if front { node.front_leaf() } else { node.back_leaf() };
                    return Some(PointRegion {
                        node: index,
                        leaf,
                        zone: leaf.and_then(|l| self.leaves().get(l)).map(|l| l.zone),
                        solid: !front && self.back_is_solid(node),
                    });
                }
            }
        }
    }

    /// Returns `true` if `point` lies inside solid space.
    pub fn point_check(&self, point: Point3<f32>) -> bool {
        self.point_region(point).is_some_and(|region| region.solid)
    }

    /// Returns the zone containing `point`, if it lies in a leaf.
    pub fn point_zone(&self, point: Point3<f32>) -> Option<usize> {
        self.point_region(point).and_then(|region| region.zone)
    }

    /// Traces the segment from `start` to `end` and returns its first entry
    /// into solid space, or `None` if it stays in empty space.
    pub fn line_check(&self, start: Point3<f32>, end: Point3<f32>) -> Option<LineHit> {
        if self.nodes.is_empty() {
            return None;
        }
        let segment = Segment {
            start,
            end,
            t_start: 0.0,
            t_end: 1.0,
        };
        let (t, entry) = self.trace_node(0, segment, None)?;
        Some(LineHit {
            time: t,
            location: start + (end - start) * t,
            normal: entry.map_or(Vector3::zeros(), |e| e.normal),
            node: entry.map(|e| e.node),
        })
    }

    fn trace_node(
        &self,
        index: NodeIndex,
        segment: Segment,
        entry: Option<Entry>,
    ) -> Option<(f32, Option<Entry>)> {
        let plane = self.nodes[index].plane();
        let d1 = plane.signed_distance(segment.start);
        let d2 = plane.signed_distance(segment.end);

        if d1 >= 0.0 && d2 >= 0.0 {
            return self.trace_side(index, true, segment, entry);
        }
        if d1 < 0.0 && d2 < 0.0 {
            return self.trace_side(index, false, segment, entry);
        }

        let frac = d1 / (d1 - d2);
        let mid = segment.start + (segment.end - segment.start) * frac;
        let t_mid = segment.t_start + (segment.t_end - segment.t_start) * frac;
        let near_front = d1 >= 0.0;

        let near = Segment {
            end: mid,
            t_end: t_mid,
            ..segment
        };
        if let Some(hit) = self.trace_side(index, near_front, near, entry) {
            return Some(hit);
        }

        let far = Segment {
            start: mid,
            t_start: t_mid,
            ..segment
        };
        let normal = if near_front {
            plane.normal()
        } else {
            -plane.normal()
        };
        self.trace_side(index, !near_front, far, Some(Entry { normal, node: index }))
    }

    fn trace_side(
        &self,
        index: NodeIndex,
        front: bool,
        segment: Segment,
        entry: Option<Entry>,
    ) -> Option<(f32, Option<Entry>)> {
        let node = &self.nodes[index];
        let child = if front { node.front() } else { node.back() };
        match child {
            Some(next) => self.trace_node(next, segment, entry),
            None if !front && self.back_is_solid(node) => Some((segment.t_start, entry)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Leaf, Plane, Surface, Zone, ZoneMask};
    use assert_approx_eq::assert_approx_eq;

    /// A solid floor at z = 0 (solid below) with two empty leaves above it
    /// split at x = 0: leaf 0 (x < 0, zone 0), leaf 1 (x >= 0, zone 1).
    fn floor_model() -> BspModel {
        let mut model = BspModel::default();
        let base = model.push_point(Point3::origin());
        let n = model.push_vector(Vector3::z());
        let surface = model.push_surface(Surface {
            material: None,
            flags: PolyFlags::empty(),
            base,
            normal: n,
            texture_u: n,
            texture_v: n,
        });
        model.push_zone(Zone::isolated(0)).unwrap();
        model.push_zone(Zone::isolated(1)).unwrap();
        model.push_leaf(Leaf::new(0, ZoneMask::single(0)));
        model.push_leaf(Leaf::new(1, ZoneMask::single(1)));

        let mut floor = BspNode::new(Plane::new(Vector3::z(), 0.0), surface);
        floor.set_front(Some(1));
        model.push_node(floor);

        let mut split = BspNode::new(Plane::new(Vector3::x(), 0.0), surface);
        split.set_leaves(Some(1), Some(0));
        model.push_node(split);
        model
    }

    #[test]
    fn point_region_finds_leaf_and_zone() {
        let model = floor_model();
        let region = model.point_region(Point3::new(-3.0, 0.0, 5.0)).unwrap();
        assert_eq!(region.leaf, Some(0));
        assert_eq!(region.zone, Some(0));
        assert!(!region.solid);
        assert_eq!(model.point_zone(Point3::new(3.0, 0.0, 5.0)), Some(1));
    }

    #[test]
    fn point_below_floor_is_solid() {
        let model = floor_model();
        assert!(model.point_check(Point3::new(0.0, 0.0, -1.0)));
        assert!(!model.point_check(Point3::new(0.0, 0.0, 1.0)));
        assert_eq!(model.point_zone(Point3::new(0.0, 0.0, -1.0)), None);
    }

    #[test]
    fn empty_model_has_no_region() {
        let model = BspModel::default();
        assert!(model.point_region(Point3::origin()).is_none());
        assert!(!model.point_check(Point3::origin()));
        assert!(model.line_check(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn line_into_floor_hits_at_crossing() {
        let model = floor_model();
        let hit = model
            .line_check(Point3::new(2.0, 0.0, 3.0), Point3::new(2.0, 0.0, -1.0))
            .unwrap();
        assert_approx_eq!(hit.time, 0.75);
        assert_approx_eq!(hit.location.z, 0.0);
        assert_approx_eq!(hit.normal.z, 1.0);
        assert_eq!(hit.node, Some(0));
        assert!(!hit.started_solid());
    }

    #[test]
    fn line_through_empty_space_misses() {
        let model = floor_model();
        assert!(
            model
                .line_check(Point3::new(-5.0, 0.0, 1.0), Point3::new(5.0, 0.0, 2.0))
                .is_none()
        );
    }

    #[test]
    fn line_starting_in_solid() {
        let model = floor_model();
        let hit = model
            .line_check(Point3::new(0.0, 0.0, -2.0), Point3::new(0.0, 0.0, 2.0))
            .unwrap();
        assert_eq!(hit.time, 0.0);
        assert!(hit.started_solid());
    }

    #[test]
    fn not_solid_surface_lets_lines_pass() {
        let mut model = floor_model();
        let floor_surface = model.nodes()[0].surface();
        let mut surface = model.surface(floor_surface).unwrap().clone();
        surface.flags = PolyFlags::NOT_SOLID;
        let soft = model.push_surface(surface);
        let floor = model.node_mut(0).unwrap();
        let mut replacement = BspNode::new(*floor.plane(), soft);
        replacement.set_front(Some(1));
        *floor = replacement;
        assert!(!model.point_check(Point3::new(0.0, 0.0, -1.0)));
        assert!(
            model
                .line_check(Point3::new(2.0, 0.0, 3.0), Point3::new(2.0, 0.0, -1.0))
                .is_none()
        );
    }
}
