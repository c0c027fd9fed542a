//! BSP tree node.

use nalgebra::Point3;

use crate::projector::StaticProjectorInfo;
use crate::{LeafIndex, Plane, Sphere, ZoneMask};

/// Index of a node in [`BspModel::nodes`](crate::BspModel::nodes).
pub type NodeIndex = usize;

/// A node in the flat BSP node array.
///
/// Each node partitions space with a splitting plane and may carry one
/// convex polygon lying on that plane. Children are referenced by index:
///
/// - `front` / `back`: subtrees on either side of the plane. A side without a
///   subtree is terminal and may name a leaf (`front_leaf` / `back_leaf`).
/// - `coplanar`: the next node sharing this plane. Coplanar nodes form a
///   chain and never have front or back children of their own.
#[derive(Debug, Clone)]
pub struct BspNode {
    plane: Plane,
    zone_mask: ZoneMask,

    front: Option<NodeIndex>,
    back: Option<NodeIndex>,
    coplanar: Option<NodeIndex>,

    front_leaf: Option<LeafIndex>,
    back_leaf: Option<LeafIndex>,

    /// Bounds this node's polygon and everything below it.
    inclusive_sphere: Sphere,
    /// Bounds only this node's own polygon.
    exclusive_sphere: Sphere,

    vertex_pool_start: usize,
    num_vertices: usize,
    surface: usize,
    light_map: Option<usize>,

    section: Option<usize>,
    first_vertex: usize,

    pub(crate) projectors: Vec<StaticProjectorInfo>,
}

impl BspNode {
    /// Creates a splitter-only node: no polygon, no children, no leaves.
    pub fn new(plane: Plane, surface: usize) -> Self {
        let empty = Sphere::new(Point3::origin(), 0.0);
        Self {
            plane,
            zone_mask: ZoneMask::NONE,
            front: None,
            back: None,
            coplanar: None,
            front_leaf: None,
            back_leaf: None,
            inclusive_sphere: empty,
            exclusive_sphere: empty,
            vertex_pool_start: 0,
            num_vertices: 0,
            surface,
            light_map: None,
            section: None,
            first_vertex: 0,
            projectors: Vec::new(),
        }
    }

    /// Returns a reference to the splitting plane.
    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Zones reachable at or below this node.
    #[inline]
    pub fn zone_mask(&self) -> ZoneMask {
        self.zone_mask
    }

    /// Front subtree.
    #[inline]
    pub fn front(&self) -> Option<NodeIndex> {
        self.front
    }

    /// Back subtree.
    #[inline]
    pub fn back(&self) -> Option<NodeIndex> {
        self.back
    }

    /// Next coplanar node.
    #[inline]
    pub fn coplanar(&self) -> Option<NodeIndex> {
        self.coplanar
    }

    /// Leaf on the front side when the front is terminal.
    #[inline]
    pub fn front_leaf(&self) -> Option<LeafIndex> {
        self.front_leaf
    }

    /// Leaf on the back side when the back is terminal.
    #[inline]
    pub fn back_leaf(&self) -> Option<LeafIndex> {
        self.back_leaf
    }

    #[inline]
    pub fn inclusive_sphere(&self) -> &Sphere {
        &self.inclusive_sphere
    }

    #[inline]
    pub fn exclusive_sphere(&self) -> &Sphere {
        &self.exclusive_sphere
    }

    /// First entry of this node's polygon in the vertex pool.
    #[inline]
    pub fn vertex_pool_start(&self) -> usize {
        self.vertex_pool_start
    }

    /// Number of polygon vertices; zero for splitter-only nodes.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    #[inline]
    pub fn surface(&self) -> usize {
        self.surface
    }

    #[inline]
    pub fn light_map(&self) -> Option<usize> {
        self.light_map
    }

    /// Render section holding this node's vertices, if built.
    #[inline]
    pub fn section(&self) -> Option<usize> {
        self.section
    }

    /// Offset of this node's first vertex in its render section.
    #[inline]
    pub fn first_vertex(&self) -> usize {
        self.first_vertex
    }

    /// Clipped projector polygons attached to this node.
    #[inline]
    pub fn projectors(&self) -> &[StaticProjectorInfo] {
        &self.projectors
    }

    /// Returns `true` if neither side has a subtree.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// Sets the front subtree.
    #[inline]
    pub fn set_front(&mut self, node: Option<NodeIndex>) {
        self.front = node;
    }

    /// Sets the back subtree.
    #[inline]
    pub fn set_back(&mut self, node: Option<NodeIndex>) {
        self.back = node;
    }

    /// Sets the next coplanar node.
    #[inline]
    pub fn set_coplanar(&mut self, node: Option<NodeIndex>) {
        self.coplanar = node;
    }

    /// Sets the terminal leaves on each side.
    #[inline]
    pub fn set_leaves(&mut self, front: Option<LeafIndex>, back: Option<LeafIndex>) {
        self.front_leaf = front;
        self.back_leaf = back;
    }

    /// Sets the polygon's vertex pool range.
    #[inline]
    pub fn set_polygon(&mut self, vertex_pool_start: usize, num_vertices: usize) {
        self.vertex_pool_start = vertex_pool_start;
        self.num_vertices = num_vertices;
    }

    #[inline]
    pub fn set_light_map(&mut self, light_map: Option<usize>) {
        self.light_map = light_map;
    }

    pub(crate) fn set_bounds(&mut self, inclusive: Sphere, exclusive: Sphere, zone_mask: ZoneMask) {
        self.inclusive_sphere = inclusive;
        self.exclusive_sphere = exclusive;
        self.zone_mask = zone_mask;
    }

    pub(crate) fn set_section(&mut self, section: Option<usize>, first_vertex: usize) {
        self.section = section;
        self.first_vertex = first_vertex;
    }
}
