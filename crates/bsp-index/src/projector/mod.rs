//! Projected textures (decals, shadows) clipped onto node polygons.
//!
//! A projector is created once and then attached to every node its frustum
//! touches. Each attachment holds a reference on the projector; the
//! creator holds one more until the projector expires or is released.
//!
//! - [`ProjectorArena`]: owner of the reference-counted records
//! - [`ProjectorDesc`]: origin, direction, gradient, blend and expiry
//! - [`StaticProjectorInfo`]: one clipped polygon stored on a node

mod attach;
mod info;

pub(crate) use attach::TextureSpace;
pub use attach::{ProjectorVertex, StaticProjectorInfo};
pub use info::{
    ProjectorArena, ProjectorBlend, ProjectorDesc, ProjectorFlags, ProjectorId, ProjectorInfo,
};
