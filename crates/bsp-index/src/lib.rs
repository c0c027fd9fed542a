//! Spatial index over a prebuilt level BSP (Binary Space Partitioning) tree.
//!
//! The tree arrives already partitioned. This crate answers queries over it
//! (which leaves does a box touch, what is solid at a point, which zones are
//! visible), clips projected textures onto node polygons, and groups node
//! polygons into render batches.

mod bounds;
mod clip;
mod error;
mod lighting;
mod material;
mod plane;
mod polygon;
mod settings;

pub mod model;
pub mod projector;
pub mod query;
pub mod render;

pub use bounds::{BoundingBox, Sphere};
pub use clip::{ClipVertex, Frustum, clip_to_front};
pub use error::{ModelError, ModelResult};
pub use lighting::{LightMap, LightMapTexture};
pub use material::{MaterialFlags, MaterialId, MaterialInfo, MaterialSource, MaterialTable};
pub use model::{
    BspModel, BspNode, Leaf, LeafIndex, MAX_ZONES, NodeIndex, PolyFlags, Surface, Zone, ZoneMask,
};
pub use plane::{PLANE_EPSILON, Plane, PlaneSide};
pub use polygon::Polygon;
pub use projector::{
    ProjectorBlend, ProjectorDesc, ProjectorFlags, ProjectorId, ProjectorInfo, ProjectorVertex,
    StaticProjectorInfo,
};
pub use query::{LineHit, PointRegion, TraversalStack};
pub use render::{RenderSection, SectionKey, SectionVertex};
pub use settings::IndexSettings;
