//! Clipping projectors onto node polygons.

use log::{debug, trace};
use nalgebra::{Point3, Vector2, Vector3};

use crate::clip::{ClipVertex, Frustum};
use crate::error::{ModelError, ModelResult};
use crate::query::TraversalStack;
use crate::{BspModel, MaterialSource, NodeIndex};

use super::info::{ProjectorArena, ProjectorDesc, ProjectorId, ProjectorInfo};

/// One vertex of a clipped projector polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectorVertex {
    /// World position.
    pub position: Point3<f32>,
    /// Projection strength in `[0, 1]`.
    pub attenuation: f32,
    /// Texture coordinate of the underlying surface, when it shows through.
    pub base_uv: Option<Vector2<f32>>,
}

impl ClipVertex for ProjectorVertex {
    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(&other.position, t),
            attenuation: self.attenuation + (other.attenuation - self.attenuation) * t,
            base_uv: match (self.base_uv, other.base_uv) {
                (Some(a), Some(b)) => Some(a.lerp(&b, t)),
                _ => None,
            },
        }
    }
}

/// A projector polygon clipped onto one node.
///
/// Holds one reference on its projector for as long as it stays attached.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticProjectorInfo {
    projector: ProjectorId,
    vertices: Vec<ProjectorVertex>,
}

impl StaticProjectorInfo {
    #[inline]
    pub fn projector(&self) -> ProjectorId {
        self.projector
    }

    #[inline]
    pub fn vertices(&self) -> &[ProjectorVertex] {
        &self.vertices
    }

    /// Returns `true` if the vertices carry base-surface UVs.
    pub fn has_base_uvs(&self) -> bool {
        self.vertices.first().is_some_and(|v| v.base_uv.is_some())
    }
}

impl BspModel {
    /// Every live projector.
    #[inline]
    pub fn projectors(&self) -> &ProjectorArena {
        &self.projectors
    }

    pub fn projector(&self, id: ProjectorId) -> ModelResult<&ProjectorInfo> {
        self.projectors
            .get(id)
            .ok_or(ModelError::UnknownProjector(id))
    }

    /// Registers a projector. The caller owns its first reference until the
    /// projector expires or [`release_projector`](Self::release_projector)
    /// is called.
    pub fn create_projector(&mut self, desc: ProjectorDesc, now: f32) -> ProjectorId {
        let id = self.projectors.create(desc, now);
        trace!("projector {id} created at {now}");
        id
    }

    /// Renders a projector at `now`; `false` means it has expired and must
    /// not be drawn.
    pub fn render_projector(&mut self, id: ProjectorId, now: f32) -> ModelResult<bool> {
        let idle_timeout = self.settings().projector_idle_timeout;
        self.projectors.render(id, now, idle_timeout)
    }

    /// Drops the creator's reference. Attachments keep the record alive
    /// until they are detached or reaped.
    pub fn release_projector(&mut self, id: ProjectorId) -> ModelResult<()> {
        self.projectors.release_creator(id)
    }

    /// Clips `projector` onto the polygon of node `index` within `frustum`.
    ///
    /// Expired attachments already on the node are reaped first. Returns
    /// `Ok(true)` if a clipped polygon was attached and `Ok(false)` if
    /// nothing survived clipping or the projector has expired.
    pub fn attach_projector<M: MaterialSource>(
        &mut self,
        index: NodeIndex,
        id: ProjectorId,
        frustum: &Frustum,
        materials: &M,
        now: f32,
    ) -> ModelResult<bool> {
        if index >= self.nodes.len() {
            return Err(ModelError::NodeOutOfRange(index));
        }
        self.projector(id)?;

        self.reap_expired(index, now)?;

        let desc = match self.projectors.get(id) {
            Some(info) if !info.is_expired() => info.desc().clone(),
            _ => return Ok(false),
        };

        let polygon = self.projector_polygon(index, &desc, materials)?;
        let clipped = frustum.clip(polygon, self.settings().plane_epsilon);
        if clipped.is_empty() {
            trace!("projector {id} clipped away on node {index}");
            return Ok(false);
        }

        self.projectors.add_reference(id)?;
        self.projectors.touch(id, now)?;
        self.nodes[index].projectors.push(StaticProjectorInfo {
            projector: id,
            vertices: clipped,
        });
        trace!("projector {id} attached to node {index}");
        Ok(true)
    }

    /// Attaches `projector` to every node whose polygon the frustum could
    /// touch. Returns the number of nodes it was attached to.
    pub fn project<M: MaterialSource>(
        &mut self,
        id: ProjectorId,
        frustum: &Frustum,
        materials: &M,
        now: f32,
        scratch: &mut TraversalStack,
    ) -> ModelResult<usize> {
        self.projector(id)?;
        if self.bounds_dirty() {
            self.build_bounds();
        }

        let candidates = self.find_touched_nodes(frustum.bounds(), scratch);
        let mut attached = 0;
        for &node in &candidates {
            if self.attach_projector(node, id, frustum, materials, now)? {
                attached += 1;
            }
        }
        debug!(
            "projector {id}: {attached} of {} candidate nodes attached",
            candidates.len()
        );
        Ok(attached)
    }

    /// Removes every attachment of `projector`. Returns how many were removed.
    pub fn detach_projector(&mut self, id: ProjectorId) -> ModelResult<usize> {
        self.projector(id)?;
        let mut removed = 0;
        for node in &mut self.nodes {
            let before = node.projectors.len();
            node.projectors.retain(|attachment| attachment.projector != id);
            removed += before - node.projectors.len();
        }
        for _ in 0..removed {
            self.projectors.release(id)?;
        }
        Ok(removed)
    }

    /// Checks that every projector's reference count equals its node
    /// attachments plus the creator's reference, and that no attachment
    /// refers to a destroyed projector.
    pub fn verify_projector_references(&self) -> ModelResult<()> {
        let mut attached = std::collections::HashMap::<ProjectorId, u32>::new();
        for node in &self.nodes {
            for attachment in &node.projectors {
                *attached.entry(attachment.projector).or_default() += 1;
            }
        }

        for (&id, &count) in &attached {
            if self.projectors.get(id).is_none() {
                return Err(ModelError::ProjectorReferenceMismatch {
                    id,
                    count: 0,
                    expected: count,
                });
            }
        }

        for (id, info) in self.projectors.iter() {
            let attachments = attached.get(&id).copied().unwrap_or(0);
            if info.attachment_count() != attachments {
                return Err(ModelError::ProjectorReferenceMismatch {
                    id,
                    count: info.reference_count(),
                    expected: attachments + u32::from(!info.is_expired()),
                });
            }
        }
        Ok(())
    }

    /// Renders every projector attached to the node and detaches the
    /// expired ones. The attachment list is left untouched if a render
    /// fails.
    fn reap_expired(&mut self, index: NodeIndex, now: f32) -> ModelResult<()> {
        let idle_timeout = self.settings().projector_idle_timeout;
        let mut expired = Vec::new();
        for (slot, attachment) in self.nodes[index].projectors.iter().enumerate() {
            if !self.projectors.render(attachment.projector, now, idle_timeout)? {
                expired.push(slot);
            }
        }

        for slot in expired.into_iter().rev() {
            let attachment = self.nodes[index].projectors.remove(slot);
            trace!(
                "reaped expired projector {} from node {index}",
                attachment.projector
            );
            self.projectors.release(attachment.projector)?;
        }
        Ok(())
    }

    /// Builds the unclipped projector polygon for a node: its vertex loop in
    /// reverse winding with attenuation and, when needed, base UVs.
    fn projector_polygon<M: MaterialSource>(
        &self,
        index: NodeIndex,
        desc: &ProjectorDesc,
        materials: &M,
    ) -> ModelResult<Vec<ProjectorVertex>> {
        let node = &self.nodes[index];
        let surface = self.surface(node.surface())?;
        let vector = |i: usize| {
            self.vectors()
                .get(i)
                .copied()
                .ok_or(ModelError::GeometryOutOfRange { kind: "vector", index: i })
        };
        let normal = vector(surface.normal)?
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| node.plane().normal());

        let (_, material) = materials.resolve(surface.material);
        let texture_space = match material {
            Some(material) if desc.blend.needs_base_uvs() || material.shows_through() => {
                let base = *self
                    .points()
                    .get(surface.base)
                    .ok_or(ModelError::GeometryOutOfRange { kind: "point", index: surface.base })?;
                Some(TextureSpace {
                    base,
                    u: vector(surface.texture_u)?,
                    v: vector(surface.texture_v)?,
                    size: Vector2::new(material.width, material.height),
                })
            }
            _ => None,
        };

        Ok(self
            .node_points(node)
            .rev()
            .map(|position| ProjectorVertex {
                position,
                attenuation: desc.attenuation(position, &normal),
                base_uv: texture_space.as_ref().map(|space| space.uv(position)),
            })
            .collect())
    }
}

/// Texture axes of a surface scaled by its material size.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextureSpace {
    pub base: Point3<f32>,
    pub u: Vector3<f32>,
    pub v: Vector3<f32>,
    pub size: Vector2<f32>,
}

impl TextureSpace {
    pub fn uv(&self, position: Point3<f32>) -> Vector2<f32> {
        let local = position - self.base;
        Vector2::new(local.dot(&self.u) / self.size.x, local.dot(&self.v) / self.size.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BoundingBox, BspNode, Leaf, MaterialFlags, MaterialInfo, MaterialTable, PolyFlags,
        Polygon, ProjectorBlend, ProjectorFlags, Surface, Zone, ZoneMask,
    };
    use assert_approx_eq::assert_approx_eq;

    /// A 4x4 floor at z = 0 facing up, surface material 1.
    fn floor_model(materials: &mut MaterialTable) -> BspModel {
        let material = materials.push(MaterialInfo::opaque(2.0, 4.0));
        let mut model = BspModel::default();
        let base = model.push_point(Point3::origin());
        let normal = model.push_vector(Vector3::z());
        let u = model.push_vector(Vector3::x());
        let v = model.push_vector(Vector3::y());
        let surface = model.push_surface(Surface {
            material: Some(material),
            flags: PolyFlags::empty(),
            base,
            normal,
            texture_u: u,
            texture_v: v,
        });
        model.push_zone(Zone::isolated(0)).unwrap();
        let leaf = model.push_leaf(Leaf::new(0, ZoneMask::single(0)));

        let floor = Polygon::axis_rect(2, 0.0, [0.0, 0.0], [4.0, 4.0], true);
        let (start, count) = model.add_polygon(floor.vertices());
        let mut node = BspNode::new(floor.plane(), surface);
        node.set_polygon(start, count);
        node.set_leaves(Some(leaf), None);
        model.push_node(node);
        model.build_bounds();
        model
    }

    fn down_projector() -> ProjectorDesc {
        ProjectorDesc::new(Point3::new(2.0, 2.0, 5.0), -Vector3::z_axis(), 10.0)
    }

    fn frustum(min: [f32; 3], max: [f32; 3]) -> Frustum {
        Frustum::from_box(BoundingBox::from_min_max(min.into(), max.into()))
    }

    #[test]
    fn enclosing_frustum_keeps_reversed_polygon() {
        let mut materials = MaterialTable::default();
        let mut model = floor_model(&mut materials);
        let id = model.create_projector(down_projector(), 0.0);

        let attached = model
            .attach_projector(0, id, &frustum([-1.0, -1.0, -1.0], [5.0, 5.0, 1.0]), &materials, 0.0)
            .unwrap();
        assert!(attached);

        let attachment = &model.nodes()[0].projectors()[0];
        let expected: Vec<Point3<f32>> = model.node_points(&model.nodes()[0]).rev().collect();
        let positions: Vec<Point3<f32>> =
            attachment.vertices().iter().map(|v| v.position).collect();
        assert_eq!(positions, expected);
        assert!(attachment.vertices().iter().all(|v| (v.attenuation - 1.0).abs() < 1e-6));
        assert!(!attachment.has_base_uvs());
        assert_eq!(model.projector(id).unwrap().attachment_count(), 1);
    }

    #[test]
    fn disjoint_frustum_takes_no_reference() {
        let mut materials = MaterialTable::default();
        let mut model = floor_model(&mut materials);
        let id = model.create_projector(down_projector(), 0.0);

        let attached = model
            .attach_projector(
                0,
                id,
                &frustum([10.0, 10.0, -1.0], [12.0, 12.0, 1.0]),
                &materials,
                0.0,
            )
            .unwrap();
        assert!(!attached);
        assert!(model.nodes()[0].projectors().is_empty());
        assert_eq!(model.projector(id).unwrap().reference_count(), 1);
    }

    #[test]
    fn partial_frustum_clips_polygon() {
        let mut materials = MaterialTable::default();
        let mut model = floor_model(&mut materials);
        let id = model.create_projector(down_projector(), 0.0);

        model
            .attach_projector(0, id, &frustum([1.0, 1.0, -1.0], [3.0, 3.0, 1.0]), &materials, 0.0)
            .unwrap();
        let vertices = model.nodes()[0].projectors()[0].vertices();
        assert_eq!(vertices.len(), 4);
        for v in vertices {
            assert!(v.position.x >= 1.0 - 1e-4 && v.position.x <= 3.0 + 1e-4);
            assert!(v.position.y >= 1.0 - 1e-4 && v.position.y <= 3.0 + 1e-4);
        }
    }

    #[test]
    fn gradient_and_base_uvs_interpolate_through_clip() {
        let mut materials = MaterialTable::default();
        let mut model = floor_model(&mut materials);
        let mut desc = ProjectorDesc::new(Point3::new(0.0, 2.0, 0.0), Vector3::x_axis(), 4.0);
        desc.flags = ProjectorFlags::GRADIENT | ProjectorFlags::PROJECT_ON_BACKFACES;
        desc.blend = ProjectorBlend::Overlay;
        let id = model.create_projector(desc, 0.0);

        model
            .attach_projector(0, id, &frustum([-1.0, -1.0, -1.0], [2.0, 5.0, 1.0]), &materials, 0.0)
            .unwrap();

        // The floor normal is perpendicular to the projector, so every
        // attenuation is zero, yet base UVs are still produced and clipped.
        let attachment = &model.nodes()[0].projectors()[0];
        assert!(attachment.has_base_uvs());
        for v in attachment.vertices() {
            let uv = v.base_uv.unwrap();
            assert_approx_eq!(uv.x, v.position.x / 2.0);
            assert_approx_eq!(uv.y, v.position.y / 4.0);
            assert_approx_eq!(v.attenuation, 0.0);
            assert!(v.position.x <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn translucent_material_gets_base_uvs() {
        let mut materials = MaterialTable::default();
        let mut model = floor_model(&mut materials);
        let mut glass = MaterialInfo::opaque(8.0, 8.0);
        glass.flags = MaterialFlags::TRANSLUCENT;
        let glass = materials.push(glass);
        let mut surface = model.surfaces()[0].clone();
        surface.material = Some(glass);
        let surface = model.push_surface(surface);
        let plane = *model.nodes()[0].plane();
        let start = model.nodes()[0].vertex_pool_start();
        let count = model.nodes()[0].num_vertices();
        let mut node = BspNode::new(plane, surface);
        node.set_polygon(start, count);
        *model.node_mut(0).unwrap() = node;

        let id = model.create_projector(down_projector(), 0.0);
        model
            .attach_projector(0, id, &frustum([-1.0, -1.0, -1.0], [5.0, 5.0, 1.0]), &materials, 0.0)
            .unwrap();
        assert!(model.nodes()[0].projectors()[0].has_base_uvs());
    }

    #[test]
    fn expired_attachments_are_reaped_on_next_attach() {
        let mut materials = MaterialTable::default();
        let mut model = floor_model(&mut materials);
        let all = frustum([-1.0, -1.0, -1.0], [5.0, 5.0, 1.0]);

        let stale = model.create_projector(down_projector(), 0.0);
        model.attach_projector(0, stale, &all, &materials, 0.0).unwrap();
        assert_eq!(model.projector(stale).unwrap().reference_count(), 2);

        let fresh = model.create_projector(down_projector(), 3.0);
        model.attach_projector(0, fresh, &all, &materials, 3.0).unwrap();

        assert!(model.projector(stale).is_err());
        let attached: Vec<ProjectorId> =
            model.nodes()[0].projectors().iter().map(|a| a.projector()).collect();
        assert_eq!(attached, vec![fresh]);
        assert!(model.verify_projector_references().is_ok());
    }

    #[test]
    fn project_and_detach() {
        let mut materials = MaterialTable::default();
        let mut model = floor_model(&mut materials);
        let mut scratch = TraversalStack::new();
        let id = model.create_projector(down_projector(), 0.0);

        let count = model
            .project(id, &frustum([1.0, 1.0, -1.0], [3.0, 3.0, 1.0]), &materials, 0.0, &mut scratch)
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(model.projector(id).unwrap().attachment_count(), 1);

        assert_eq!(model.detach_projector(id), Ok(1));
        assert_eq!(model.projector(id).unwrap().reference_count(), 1);
        assert!(model.nodes()[0].projectors().is_empty());

        model.release_projector(id).unwrap();
        assert!(model.projectors().is_empty());
    }

    #[test]
    fn attaching_restarts_idle_timer() {
        let mut materials = MaterialTable::default();
        let mut model = floor_model(&mut materials);
        let mut scratch = TraversalStack::new();
        let id = model.create_projector(down_projector(), 0.0);

        let all = frustum([-1.0, -1.0, -1.0], [5.0, 5.0, 1.0]);
        assert_eq!(model.project(id, &all, &materials, 5.0, &mut scratch), Ok(1));
        assert_eq!(model.projector(id).unwrap().last_render_time(), 5.0);
        assert_eq!(model.render_projector(id, 5.5), Ok(true));
        assert_eq!(model.render_projector(id, 7.0), Ok(false));
    }

    #[test]
    fn failed_reap_keeps_attachments() {
        let mut materials = MaterialTable::default();
        let mut model = floor_model(&mut materials);
        let all = frustum([-1.0, -1.0, -1.0], [5.0, 5.0, 1.0]);

        let old = model.create_projector(down_projector(), 0.0);
        model.attach_projector(0, old, &all, &materials, 0.0).unwrap();

        let gone = model.create_projector(down_projector(), 0.0);
        model.release_projector(gone).unwrap();
        model.nodes[0].projectors.push(StaticProjectorInfo {
            projector: gone,
            vertices: Vec::new(),
        });

        let next = model.create_projector(down_projector(), 2.0);
        assert_eq!(
            model.attach_projector(0, next, &all, &materials, 2.0),
            Err(ModelError::UnknownProjector(gone))
        );

        // The expired projector's attachment is still there and still counted.
        assert_eq!(model.nodes()[0].projectors().len(), 2);
        let info = model.projector(old).unwrap();
        assert!(info.is_expired());
        assert_eq!(info.attachment_count(), 1);

        model.nodes[0].projectors.pop();
        assert_eq!(model.attach_projector(0, next, &all, &materials, 2.0), Ok(true));
        assert!(model.projector(old).is_err());
        assert!(model.verify_projector_references().is_ok());
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut materials = MaterialTable::default();
        let mut model = floor_model(&mut materials);
        let all = frustum([-1.0, -1.0, -1.0], [5.0, 5.0, 1.0]);
        let stale = model.create_projector(down_projector(), 0.0);
        model.release_projector(stale).unwrap();
        assert_eq!(
            model.attach_projector(0, stale, &all, &materials, 0.0),
            Err(ModelError::UnknownProjector(stale))
        );

        let id = model.create_projector(down_projector(), 0.0);
        assert_eq!(id.index(), stale.index());
        assert_eq!(
            model.attach_projector(9, id, &all, &materials, 0.0),
            Err(ModelError::NodeOutOfRange(9))
        );
    }
}
