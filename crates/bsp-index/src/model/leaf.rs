//! Leaves: convex regions bounded by the tree's planes.

use super::zone::ZoneMask;

/// Index of a leaf in [`BspModel::leaves`](crate::BspModel::leaves).
pub type LeafIndex = usize;

/// A convex region of space.
///
/// `visible_zones` comes from an offline visibility pass and is taken as
/// ground truth by every query.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Zone containing this leaf.
    pub zone: usize,
    /// Zones potentially visible from this leaf.
    pub visible_zones: ZoneMask,
}

impl Leaf {
    /// Creates a leaf in `zone` that sees `visible_zones`.
    pub fn new(zone: usize, visible_zones: ZoneMask) -> Self {
        Self {
            zone,
            visible_zones,
        }
    }
}
