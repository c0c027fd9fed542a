//! Grouping node polygons into render sections.

use log::{debug, warn};
use nalgebra::{Vector2, Vector3};

use crate::error::{ModelError, ModelResult};
use crate::projector::TextureSpace;
use crate::{BspModel, MaterialSource, NodeIndex, PolyFlags};

use super::section::{RenderSection, SectionKey, SectionVertex};

impl BspModel {
    /// Rebuilds every render section from scratch.
    ///
    /// Nodes without a polygon are skipped. Nodes sharing material, section
    /// flags and lightmap atlas are merged into one section until its vertex
    /// count would reach the configured limit, after which another section
    /// with the same key is opened. Texture coordinates are shifted per node
    /// by their rounded average to keep them near zero.
    pub fn build_render_data<M: MaterialSource>(&mut self, materials: &M) -> ModelResult<()> {
        // Resolve every polygon first so a bad index leaves the old
        // sections in place.
        let mut polygons = Vec::new();
        for index in 0..self.nodes.len() {
            if self.nodes[index].num_vertices() > 0 {
                polygons.push((index, self.section_geometry(index, materials)?));
            }
        }

        self.sections.clear();
        for node in &mut self.nodes {
            node.set_section(None, 0);
        }

        let limit = self.settings().section_vertex_limit;
        for (index, (key, vertices)) in polygons {
            let count = vertices.len();
            let section = match self
                .sections
                .iter()
                .position(|section| section.key() == &key && section.has_room(count, limit))
            {
                Some(section) => section,
                None => {
                    self.sections.push(RenderSection::new(key));
                    self.sections.len() - 1
                }
            };
            let first = self.sections[section].append(index, vertices);
            self.nodes[index].set_section(Some(section), first);
        }

        debug!(
            "built {} render sections from {} nodes",
            self.sections.len(),
            self.nodes.len()
        );
        Ok(())
    }

    /// Batch key and centered vertices of one node polygon.
    fn section_geometry<M: MaterialSource>(
        &self,
        index: NodeIndex,
        materials: &M,
    ) -> ModelResult<(SectionKey, Vec<SectionVertex>)> {
        let node = &self.nodes[index];
        let surface = self.surface(node.surface())?;
        let vector = |i: usize| {
            self.vectors()
                .get(i)
                .copied()
                .ok_or(ModelError::GeometryOutOfRange { kind: "vector", index: i })
        };

        let (material, info) = materials.resolve(surface.material);
        let size = info.map_or(Vector2::new(1.0, 1.0), |info| {
            Vector2::new(info.width, info.height)
        });
        let texture_space = TextureSpace {
            base: *self
                .points()
                .get(surface.base)
                .ok_or(ModelError::GeometryOutOfRange { kind: "point", index: surface.base })?,
            u: vector(surface.texture_u)?,
            v: vector(surface.texture_v)?,
            size,
        };

        let light_map = if surface.flags.contains(PolyFlags::UNLIT) {
            None
        } else {
            node.light_map().and_then(|light_map| {
                let placement = self
                    .light_maps()
                    .get(light_map)
                    .filter(|placement| placement.texture < self.light_map_textures().len());
                if placement.is_none() {
                    warn!("node {index} has invalid lightmap {light_map}, drawing unlit");
                }
                placement
            })
        };

        let key = SectionKey {
            material,
            flags: surface.flags & PolyFlags::SECTION_KEY,
            light_map_texture: light_map.map(|placement| placement.texture),
        };

        let normal: Vector3<f32> = node.plane().normal();
        let mut vertices: Vec<SectionVertex> = self
            .node_points(node)
            .map(|position| SectionVertex {
                position,
                normal,
                uv: texture_space.uv(position),
                light_uv: light_map.map_or(Vector2::zeros(), |placement| placement.uv(position)),
            })
            .collect();

        let sum = vertices
            .iter()
            .fold(Vector2::zeros(), |sum: Vector2<f32>, vertex| sum + vertex.uv);
        let center = (sum / vertices.len() as f32).map(f32::round);
        for vertex in &mut vertices {
            vertex.uv -= center;
        }

        Ok((key, vertices))
    }
}
