//! The level model: parallel arrays addressed by index.

use log::debug;
use nalgebra::{Point3, Vector3};

use crate::error::{ModelError, ModelResult};
use crate::lighting::{LightMap, LightMapTexture};
use crate::projector::ProjectorArena;
use crate::render::RenderSection;
use crate::{IndexSettings, Sphere};

use super::leaf::{Leaf, LeafIndex};
use super::node::{BspNode, NodeIndex};
use super::surface::Surface;
use super::zone::{MAX_ZONES, Zone, ZoneMask};

/// The spatial index of one level's solid geometry.
///
/// All structures live in flat arrays and reference each other by index.
/// Node 0 is the root. Shared geometry (`points`, `vectors`) is referenced by
/// surfaces and by the vertex pool, which holds point indices for every
/// node polygon.
///
/// # Construction
///
/// Geometry arrives already partitioned; the loader pushes arrays in order
/// and links them by index:
///
/// ```ignore
/// let mut model = BspModel::default();
/// let surface = model.push_surface(surface);
/// let (start, count) = model.add_polygon(polygon.vertices());
/// let mut node = BspNode::new(polygon.plane(), surface);
/// node.set_polygon(start, count);
/// model.push_node(node);
/// model.validate()?;
/// model.build_bounds();
/// ```
#[derive(Debug, Default)]
pub struct BspModel {
    pub(crate) nodes: Vec<BspNode>,
    surfaces: Vec<Surface>,
    points: Vec<Point3<f32>>,
    vectors: Vec<Vector3<f32>>,
    vertices: Vec<usize>,
    leaves: Vec<Leaf>,
    zones: Vec<Zone>,
    pub(crate) sections: Vec<RenderSection>,
    light_maps: Vec<LightMap>,
    light_map_textures: Vec<LightMapTexture>,
    pub(crate) projectors: ProjectorArena,
    settings: IndexSettings,
    bounds_dirty: bool,
}

impl BspModel {
    /// Creates an empty model with the given settings.
    pub fn new(settings: IndexSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[inline]
    pub fn settings(&self) -> &IndexSettings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut IndexSettings {
        &mut self.settings
    }

    /// Returns `true` if the model has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, index: NodeIndex) -> ModelResult<&BspNode> {
        self.nodes.get(index).ok_or(ModelError::NodeOutOfRange(index))
    }

    /// Mutable access to a node. Marks derived bounds stale.
    pub fn node_mut(&mut self, index: NodeIndex) -> ModelResult<&mut BspNode> {
        self.bounds_dirty = true;
        self.nodes
            .get_mut(index)
            .ok_or(ModelError::NodeOutOfRange(index))
    }

    #[inline]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    #[inline]
    pub fn surface(&self, index: usize) -> ModelResult<&Surface> {
        self.surfaces
            .get(index)
            .ok_or(ModelError::SurfaceOutOfRange(index))
    }

    #[inline]
    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    #[inline]
    pub fn vectors(&self) -> &[Vector3<f32>] {
        &self.vectors
    }

    #[inline]
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    #[inline]
    pub fn leaf(&self, index: LeafIndex) -> ModelResult<&Leaf> {
        self.leaves.get(index).ok_or(ModelError::LeafOutOfRange(index))
    }

    #[inline]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone_mut(&mut self, index: usize) -> ModelResult<&mut Zone> {
        self.zones
            .get_mut(index)
            .ok_or(ModelError::ZoneOutOfRange(index))
    }

    #[inline]
    pub fn light_maps(&self) -> &[LightMap] {
        &self.light_maps
    }

    #[inline]
    pub fn light_map_textures(&self) -> &[LightMapTexture] {
        &self.light_map_textures
    }

    /// Render sections from the last [`build_render_data`](Self::build_render_data).
    #[inline]
    pub fn sections(&self) -> &[RenderSection] {
        &self.sections
    }

    pub fn push_point(&mut self, point: Point3<f32>) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    pub fn push_vector(&mut self, vector: Vector3<f32>) -> usize {
        self.vectors.push(vector);
        self.vectors.len() - 1
    }

    pub fn push_surface(&mut self, surface: Surface) -> usize {
        self.surfaces.push(surface);
        self.surfaces.len() - 1
    }

    pub fn push_node(&mut self, node: BspNode) -> NodeIndex {
        self.bounds_dirty = true;
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn push_leaf(&mut self, leaf: Leaf) -> LeafIndex {
        self.bounds_dirty = true;
        self.leaves.push(leaf);
        self.leaves.len() - 1
    }

    /// Adds a zone. Fails once [`MAX_ZONES`] zones exist.
    pub fn push_zone(&mut self, zone: Zone) -> ModelResult<usize> {
        if self.zones.len() >= MAX_ZONES {
            return Err(ModelError::TooManyZones(self.zones.len() + 1));
        }
        self.zones.push(zone);
        Ok(self.zones.len() - 1)
    }

    pub fn push_light_map(&mut self, light_map: LightMap) -> usize {
        self.light_maps.push(light_map);
        self.light_maps.len() - 1
    }

    pub fn push_light_map_texture(&mut self, texture: LightMapTexture) -> usize {
        self.light_map_textures.push(texture);
        self.light_map_textures.len() - 1
    }

    /// Appends a polygon's points and vertex pool entries.
    ///
    /// Returns `(vertex_pool_start, num_vertices)` for [`BspNode::set_polygon`].
    pub fn add_polygon(&mut self, vertices: &[Point3<f32>]) -> (usize, usize) {
        let start = self.vertices.len();
        for &vertex in vertices {
            let point = self.push_point(vertex);
            self.vertices.push(point);
        }
        (start, vertices.len())
    }

    /// Iterates over a node's polygon vertices in winding order.
    ///
    /// # Panics
    /// Panics if the node's vertex range is invalid; call
    /// [`validate`](Self::validate) after loading.
    pub fn node_points<'a>(
        &'a self,
        node: &BspNode,
    ) -> impl DoubleEndedIterator<Item = Point3<f32>> + use<'a> {
        let start = node.vertex_pool_start();
        self.vertices[start..start + node.num_vertices()]
            .iter()
            .map(move |&point| self.points[point])
    }

    /// Checks every cross-array index and the coplanar-chain invariant.
    ///
    /// Queries assume a validated model; a loader should reject the level
    /// on any error returned here.
    pub fn validate(&self) -> ModelResult<()> {
        let node_count = self.nodes.len();
        let check_point = |index: usize| {
            if index < self.points.len() {
                Ok(())
            } else {
                Err(ModelError::GeometryOutOfRange { kind: "point", index })
            }
        };
        let check_vector = |index: usize| {
            if index < self.vectors.len() {
                Ok(())
            } else {
                Err(ModelError::GeometryOutOfRange { kind: "vector", index })
            }
        };

        for surface in &self.surfaces {
            check_point(surface.base)?;
            check_vector(surface.normal)?;
            check_vector(surface.texture_u)?;
            check_vector(surface.texture_v)?;
        }

        for leaf in &self.leaves {
            if leaf.zone >= MAX_ZONES || (!self.zones.is_empty() && leaf.zone >= self.zones.len()) {
                return Err(ModelError::ZoneOutOfRange(leaf.zone));
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            for child in [node.front(), node.back(), node.coplanar()].into_iter().flatten() {
                if child >= node_count {
                    return Err(ModelError::NodeOutOfRange(child));
                }
            }
            for leaf in [node.front_leaf(), node.back_leaf()].into_iter().flatten() {
                if leaf >= self.leaves.len() {
                    return Err(ModelError::LeafOutOfRange(leaf));
                }
            }
            if node.surface() >= self.surfaces.len() {
                return Err(ModelError::SurfaceOutOfRange(node.surface()));
            }
            if let Some(light_map) = node.light_map() {
                if light_map >= self.light_maps.len() {
                    return Err(ModelError::LightMapOutOfRange(light_map));
                }
            }
            let start = node.vertex_pool_start();
            let end = start + node.num_vertices();
            if end > self.vertices.len() {
                return Err(ModelError::VertexPoolOutOfRange { node: index, start, end });
            }
            for &point in &self.vertices[start..end] {
                check_point(point)?;
            }
        }

        if node_count == 0 {
            return Ok(());
        }

        // Every node must be reached at most once from the root, and nodes
        // reached through a coplanar link must not branch.
        let mut seen = vec![false; node_count];
        let mut stack = vec![(0, false)];
        while let Some((index, via_coplanar)) = stack.pop() {
            if std::mem::replace(&mut seen[index], true) {
                return Err(ModelError::NodeReachedTwice(index));
            }
            let node = &self.nodes[index];
            if via_coplanar && !node.is_terminal() {
                return Err(ModelError::PlaneChildHasChildren(index));
            }
            stack.extend(node.front().map(|i| (i, false)));
            stack.extend(node.back().map(|i| (i, false)));
            stack.extend(node.coplanar().map(|i| (i, true)));
        }

        Ok(())
    }

    /// Returns `true` if nodes or leaves changed since the last
    /// [`build_bounds`](Self::build_bounds).
    #[inline]
    pub fn bounds_dirty(&self) -> bool {
        self.bounds_dirty
    }

    /// Recomputes every node's exclusive sphere, inclusive sphere and zone
    /// mask. Requires a validated model.
    pub fn build_bounds(&mut self) {
        if self.nodes.is_empty() {
            self.bounds_dirty = false;
            return;
        }

        // Pre-order from the root; processing it reversed visits children
        // before their parents.
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![0];
        while let Some(index) = stack.pop() {
            order.push(index);
            let node = &self.nodes[index];
            stack.extend(node.front());
            stack.extend(node.back());
            stack.extend(node.coplanar());
        }

        let mut inclusive: Vec<Option<Sphere>> = vec![None; self.nodes.len()];
        for &index in order.iter().rev() {
            let node = &self.nodes[index];
            let points: Vec<Point3<f32>> = self.node_points(node).collect();
            let exclusive = Sphere::from_points(&points);

            let mut bound = exclusive;
            let mut zones = ZoneMask::NONE;
            for child in [node.front(), node.back(), node.coplanar()].into_iter().flatten() {
                bound = match (bound, inclusive[child]) {
                    (Some(a), Some(b)) => Some(a.merged(&b)),
                    (a, b) => a.or(b),
                };
                zones = zones.union(self.nodes[child].zone_mask());
            }
            for leaf in [node.front_leaf(), node.back_leaf()].into_iter().flatten() {
                zones.insert(self.leaves[leaf].zone);
            }

            inclusive[index] = bound;
            let empty = Sphere::new(Point3::origin(), 0.0);
            self.nodes[index].set_bounds(
                bound.unwrap_or(empty),
                exclusive.unwrap_or(empty),
                zones,
            );
        }

        self.bounds_dirty = false;
        debug!("rebuilt bounds for {} nodes", order.len());
    }
}
