//! Surfaces: shared per-polygon plane and material metadata.

use bitflags::bitflags;

use crate::MaterialId;

bitflags! {
    /// Polygon flags stored on a surface.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PolyFlags: u32 {
        /// Not drawn.
        const INVISIBLE = 1 << 0;
        /// Masked texture.
        const MASKED = 1 << 1;
        /// Blended with the frame buffer.
        const TRANSLUCENT = 1 << 2;
        /// Does not block movement.
        const NOT_SOLID = 1 << 3;
        /// Blocks movement but does not cut the world.
        const SEMISOLID = 1 << 5;
        /// Drawn from both sides.
        const TWO_SIDED = 1 << 8;
        /// Selected in an editor.
        const SELECTED = 1 << 9;
        /// Receives no lighting.
        const UNLIT = 1 << 22;
        /// Zone portal.
        const PORTAL = 1 << 26;
        /// Occludes geometry behind it.
        const ANTI_PORTAL = 1 << 27;
    }
}

impl PolyFlags {
    /// Flags that split render sections.
    pub const SECTION_KEY: PolyFlags = PolyFlags::UNLIT
        .union(PolyFlags::SELECTED)
        .union(PolyFlags::TWO_SIDED);
}

/// One planar polygon's shared metadata.
///
/// Geometric values are indices into the model's `points` and `vectors`
/// arrays. Several nodes may reference the same surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Material, or `None` for the fallback material.
    pub material: Option<MaterialId>,
    /// Polygon flags.
    pub flags: PolyFlags,
    /// Point index of the texture-space origin.
    pub base: usize,
    /// Vector index of the surface normal.
    pub normal: usize,
    /// Vector index of the texture U axis.
    pub texture_u: usize,
    /// Vector index of the texture V axis.
    pub texture_v: usize,
}
