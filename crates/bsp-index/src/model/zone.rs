//! Zones: coarse visibility partitions of a level.

use std::fmt;

/// Maximum number of zones in one model.
pub const MAX_ZONES: usize = 64;

/// A set of zones, one bit per zone index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ZoneMask(pub u64);

impl ZoneMask {
    /// The empty set.
    pub const NONE: ZoneMask = ZoneMask(0);
    /// Every zone.
    pub const ALL: ZoneMask = ZoneMask(u64::MAX);

    /// A mask holding a single zone.
    ///
    /// # Panics
    /// Panics if `zone >= MAX_ZONES`.
    #[inline]
    pub fn single(zone: usize) -> Self {
        assert!(zone < MAX_ZONES, "zone {zone} exceeds {MAX_ZONES}");
        ZoneMask(1 << zone)
    }

    /// Returns `true` if `zone` is in the set.
    #[inline]
    pub fn contains(self, zone: usize) -> bool {
        zone < MAX_ZONES && self.0 & (1 << zone) != 0
    }

    /// Adds `zone` to the set.
    #[inline]
    pub fn insert(&mut self, zone: usize) {
        *self = self.union(Self::single(zone));
    }

    /// Returns the union of both sets.
    #[inline]
    pub fn union(self, other: ZoneMask) -> ZoneMask {
        ZoneMask(self.0 | other.0)
    }

    /// Returns `true` if the sets share a zone.
    #[inline]
    pub fn intersects(self, other: ZoneMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the zone indices in the set, lowest first.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_ZONES).filter(move |&zone| self.contains(zone))
    }
}

impl fmt::Debug for ZoneMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZoneMask({:#018x})", self.0)
    }
}

impl FromIterator<usize> for ZoneMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut mask = ZoneMask::NONE;
        for zone in iter {
            mask.insert(zone);
        }
        mask
    }
}

/// Adjacency and precomputed visibility for one zone.
///
/// Bit `j` of `connectivity` is set when this zone touches zone `j`; bit `j`
/// of `visibility` when zone `j` is potentially visible from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Zone {
    /// Zones sharing a portal with this one.
    pub connectivity: ZoneMask,
    /// Zones potentially visible from this one.
    pub visibility: ZoneMask,
    /// Actor that owns the zone, if any.
    pub owner: Option<u32>,
    /// Time the zone was last rendered.
    pub last_render_time: f32,
}

impl Zone {
    /// A zone that sees and touches only itself.
    pub fn isolated(index: usize) -> Self {
        Self {
            connectivity: ZoneMask::single(index),
            visibility: ZoneMask::single(index),
            owner: None,
            last_render_time: 0.0,
        }
    }
}
