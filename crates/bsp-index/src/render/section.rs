//! Render batch records.

use nalgebra::{Point3, Vector2, Vector3};

use crate::{MaterialId, NodeIndex, PolyFlags};

/// What a batch shares: every node in a section draws with the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionKey {
    /// Resolved material, never the "no material" case.
    pub material: MaterialId,
    /// Subset of [`PolyFlags::SECTION_KEY`].
    pub flags: PolyFlags,
    /// Lightmap atlas, or `None` for unlit geometry.
    pub light_map_texture: Option<usize>,
}

/// One vertex of a section's buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionVertex {
    pub position: Point3<f32>,
    /// Plane normal of the owning node.
    pub normal: Vector3<f32>,
    /// Surface texture coordinate, centered per node.
    pub uv: Vector2<f32>,
    /// Lightmap atlas coordinate; zero when unlit.
    pub light_uv: Vector2<f32>,
}

/// A draw batch of node polygons sharing one [`SectionKey`].
///
/// Each node's polygon occupies a contiguous run of `vertices` starting at
/// the node's `first_vertex`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSection {
    key: SectionKey,
    vertices: Vec<SectionVertex>,
    nodes: Vec<NodeIndex>,
}

impl RenderSection {
    pub(crate) fn new(key: SectionKey) -> Self {
        Self {
            key,
            vertices: Vec::new(),
            nodes: Vec::new(),
        }
    }

    #[inline]
    pub fn key(&self) -> &SectionKey {
        &self.key
    }

    #[inline]
    pub fn vertices(&self) -> &[SectionVertex] {
        &self.vertices
    }

    /// Nodes drawn by this section, in the order they were appended.
    #[inline]
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if a polygon of `count` vertices fits below `limit`.
    pub(crate) fn has_room(&self, count: usize, limit: usize) -> bool {
        self.vertices.len() + count < limit
    }

    /// Appends one node's polygon and returns the index of its first vertex.
    pub(crate) fn append(&mut self, node: NodeIndex, vertices: Vec<SectionVertex>) -> usize {
        let first = self.vertices.len();
        self.vertices.extend(vertices);
        self.nodes.push(node);
        first
    }
}
