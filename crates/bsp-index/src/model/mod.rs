//! Level model: the flat BSP node array and the arrays it references.
//!
//! Everything a query needs is owned by [`BspModel`] as index-addressable
//! arrays, so a loaded level can be validated, relocated and dropped as one
//! block.
//!
//! # Architecture
//!
//! - [`BspModel`]: owner of every array; node 0 is the root
//! - [`BspNode`]: splitting plane, child/leaf links, bounds and an optional polygon
//! - [`Surface`]: material and texture axes shared by coplanar nodes
//! - [`Leaf`]: a convex region and the zones visible from it
//! - [`Zone`] / [`ZoneMask`]: coarse visibility partitions, at most 64

mod leaf;
mod node;
mod surface;
mod tree;
mod zone;

pub use leaf::{Leaf, LeafIndex};
pub use node::{BspNode, NodeIndex};
pub use surface::{PolyFlags, Surface};
pub use tree::BspModel;
pub use zone::{MAX_ZONES, Zone, ZoneMask};
