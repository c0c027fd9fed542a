//! Box-to-leaf and box-to-node descent.

use log::trace;

use crate::{BoundingBox, BspModel, BspNode, LeafIndex, NodeIndex};

/// Reusable index stack for iterative tree descent.
///
/// The stack grows to the node count of the largest model it has been used
/// with and is never shrunk, so repeated queries do not allocate.
#[derive(Debug, Default, Clone)]
pub struct TraversalStack {
    stack: Vec<NodeIndex>,
}

impl TraversalStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current allocated capacity.
    pub fn capacity(&self) -> usize {
        self.stack.capacity()
    }

    fn prepare(&mut self, node_count: usize) {
        self.stack.clear();
        if self.stack.capacity() < node_count {
            self.stack.reserve(node_count);
        }
    }
}

/// How far a query box reaches on each side of a plane.
#[derive(Debug, Clone, Copy)]
struct Reach {
    front: bool,
    back: bool,
}

/// Classifies the box against a node's plane.
///
/// Nearly cubical boxes use the bounding-sphere radius instead of the exact
/// push-out; the sphere is a superset of the box so the test stays
/// conservative.
#[inline]
fn classify_box(node: &BspNode, bounds: &BoundingBox, as_sphere: bool) -> Reach {
    let plane = node.plane();
    let dist = plane.signed_distance(bounds.center());
    let push_out = if as_sphere {
        bounds.bounding_radius()
    } else {
        plane.push_out(&bounds.extent())
    };
    Reach {
        front: dist + push_out >= 0.0,
        back: dist - push_out <= 0.0,
    }
}

impl BspModel {
    /// Returns every leaf the box could overlap.
    ///
    /// The result is conservative: no leaf touched by the box is missed, but
    /// the sphere fast path for nearly cubical boxes may add leaves the box
    /// only approaches. Coplanar links are never followed, so each leaf is
    /// reported at most once. An empty model yields an empty result.
    pub fn find_touched_leaves(
        &self,
        bounds: &BoundingBox,
        scratch: &mut TraversalStack,
    ) -> Vec<LeafIndex> {
        let mut leaves = Vec::new();
        if self.nodes.is_empty() {
            return leaves;
        }

        let as_sphere = bounds.is_nearly_cubical(self.settings().cube_ratio);
        scratch.prepare(self.nodes.len());
        scratch.stack.push(0);

        while let Some(index) = scratch.stack.pop() {
            let node = &self.nodes[index];
            let reach = classify_box(node, bounds, as_sphere);

            if reach.back {
                match node.back() {
                    Some(back) => scratch.stack.push(back),
                    None => leaves.extend(node.back_leaf()),
                }
            }
            if reach.front {
                match node.front() {
                    Some(front) => scratch.stack.push(front),
                    None => leaves.extend(node.front_leaf()),
                }
            }
        }

        trace!("box at {:?} touches {} leaves", bounds.center(), leaves.len());
        leaves
    }

    /// Returns every polygon-carrying node (coplanar chains included) whose
    /// polygon could touch the box.
    ///
    /// Subtrees are culled by their inclusive spheres and individual
    /// polygons by their exclusive spheres. When bounds are stale (see
    /// [`bounds_dirty`](Self::bounds_dirty)) sphere culling is skipped and
    /// only the plane tests apply.
    pub fn find_touched_nodes(
        &self,
        bounds: &BoundingBox,
        scratch: &mut TraversalStack,
    ) -> Vec<NodeIndex> {
        let mut found = Vec::new();
        if self.nodes.is_empty() {
            return found;
        }

        let use_spheres = !self.bounds_dirty();
        let as_sphere = bounds.is_nearly_cubical(self.settings().cube_ratio);
        scratch.prepare(self.nodes.len());
        scratch.stack.push(0);

        while let Some(index) = scratch.stack.pop() {
            let node = &self.nodes[index];
            if use_spheres && !bounds.intersects_sphere(node.inclusive_sphere()) {
                continue;
            }

            let reach = classify_box(node, bounds, as_sphere);
            if reach.front && reach.back {
                let mut link = Some(index);
                while let Some(current) = link {
                    let coplanar = &self.nodes[current];
                    let hit = !use_spheres || bounds.intersects_sphere(coplanar.exclusive_sphere());
                    if coplanar.num_vertices() > 0 && hit {
                        found.push(current);
                    }
                    link = coplanar.coplanar();
                }
            }

            if reach.back {
                scratch.stack.extend(node.back());
            }
            if reach.front {
                scratch.stack.extend(node.front());
            }
        }

        trace!("box at {:?} touches {} nodes", bounds.center(), found.len());
        found
    }
}
