//! Material lookup supplied by the material system.

use bitflags::bitflags;

/// Index of a material in a [`MaterialSource`].
pub type MaterialId = usize;

bitflags! {
    /// Transparency behaviour of a material.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFlags: u32 {
        /// Texels below an alpha threshold are discarded.
        const MASKED = 1 << 0;
        /// Alpha-tested or alpha-blended texture.
        const ALPHA_TEXTURE = 1 << 1;
        /// Blended with the frame buffer.
        const TRANSLUCENT = 1 << 2;
    }
}

/// What the spatial index needs to know about a material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialInfo {
    /// Texture width in texels (U scale).
    pub width: f32,
    /// Texture height in texels (V scale).
    pub height: f32,
    /// Transparency flags.
    pub flags: MaterialFlags,
    /// Opacity weight; nonzero means the surface is partially see-through.
    pub opacity: f32,
}

impl MaterialInfo {
    /// Creates an opaque material of the given dimensions.
    pub fn opaque(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            flags: MaterialFlags::empty(),
            opacity: 0.0,
        }
    }

    /// Returns `true` if a decal on this material must carry base-surface UVs
    /// so the material can show through it.
    pub fn shows_through(&self) -> bool {
        let see_through =
            MaterialFlags::MASKED | MaterialFlags::ALPHA_TEXTURE | MaterialFlags::TRANSLUCENT;
        self.flags.intersects(see_through) || self.opacity > 0.0
    }
}

/// Material lookup used by projection and render batching.
pub trait MaterialSource {
    /// Returns the material with the given id, if it exists.
    fn material(&self, id: MaterialId) -> Option<&MaterialInfo>;

    /// Id of the material used for surfaces that have none.
    fn fallback(&self) -> MaterialId;

    /// Resolves an optional surface material to a concrete id and its info.
    ///
    /// Unknown ids resolve to the fallback.
    fn resolve(&self, id: Option<MaterialId>) -> (MaterialId, Option<&MaterialInfo>) {
        match id.and_then(|id| self.material(id).map(|info| (id, info))) {
            Some((id, info)) => (id, Some(info)),
            None => {
                let fallback = self.fallback();
                (fallback, self.material(fallback))
            }
        }
    }
}

/// A simple vector-backed [`MaterialSource`]. Material 0 is the fallback.
#[derive(Debug, Clone)]
pub struct MaterialTable {
    materials: Vec<MaterialInfo>,
}

impl MaterialTable {
    /// Creates a table whose fallback material is `fallback`.
    pub fn new(fallback: MaterialInfo) -> Self {
        Self {
            materials: vec![fallback],
        }
    }

    /// Adds a material and returns its id.
    pub fn push(&mut self, material: MaterialInfo) -> MaterialId {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Number of materials including the fallback.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Always false: the fallback material is always present.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::new(MaterialInfo::opaque(64.0, 64.0))
    }
}

impl MaterialSource for MaterialTable {
    fn material(&self, id: MaterialId) -> Option<&MaterialInfo> {
        self.materials.get(id)
    }

    fn fallback(&self) -> MaterialId {
        0
    }
}
