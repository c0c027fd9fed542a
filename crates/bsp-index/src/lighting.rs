//! Lightmap placement produced by the lighting bake.

use nalgebra::{Point3, Vector2, Vector3};

/// Placement of one node's lightmap inside an atlas texture.
///
/// `x_axis` and `y_axis` map world offsets from `origin` into atlas units,
/// so they already include the lightmap scale.
#[derive(Debug, Clone, PartialEq)]
pub struct LightMap {
    /// Index into the model's lightmap textures.
    pub texture: usize,
    /// World position of the lightmap's local origin.
    pub origin: Point3<f32>,
    /// Local U basis, in atlas units per world unit.
    pub x_axis: Vector3<f32>,
    /// Local V basis, in atlas units per world unit.
    pub y_axis: Vector3<f32>,
    /// Offset of this lightmap inside the atlas.
    pub offset: Vector2<f32>,
}

impl LightMap {
    /// Returns the atlas coordinate for a world position.
    pub fn uv(&self, point: Point3<f32>) -> Vector2<f32> {
        let local = point - self.origin;
        Vector2::new(
            local.dot(&self.x_axis) + self.offset.x,
            local.dot(&self.y_axis) + self.offset.y,
        )
    }
}

/// An atlas texture holding several lightmaps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightMapTexture {
    /// Atlas width in texels.
    pub width: u32,
    /// Atlas height in texels.
    pub height: u32,
    /// Lightmaps packed into this atlas.
    pub light_maps: Vec<usize>,
}
