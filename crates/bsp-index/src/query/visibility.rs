//! Zone visibility lookups.
//!
//! Leaf-to-zone visibility comes from each leaf's precomputed
//! `visible_zones` mask. There is no leaf-to-leaf visibility data, so
//! [`BspModel::potentially_visible`] answers `true` for every pair.

use crate::error::{ModelError, ModelResult};
use crate::{BspModel, LeafIndex, ZoneMask};

impl BspModel {
    /// Zone containing `leaf`.
    pub fn leaf_zone(&self, leaf: LeafIndex) -> ModelResult<usize> {
        Ok(self.leaf(leaf)?.zone)
    }

    /// Zones potentially visible from `leaf`.
    pub fn visible_zones(&self, leaf: LeafIndex) -> ModelResult<ZoneMask> {
        Ok(self.leaf(leaf)?.visible_zones)
    }

    /// Returns `true` if `zone` is potentially visible from `leaf`.
    pub fn is_zone_visible(&self, leaf: LeafIndex, zone: usize) -> ModelResult<bool> {
        Ok(self.visible_zones(leaf)?.contains(zone))
    }

    /// Returns `true` if zones `a` and `b` share a portal.
    pub fn zones_connected(&self, a: usize, b: usize) -> ModelResult<bool> {
        let zone = self.zones().get(a).ok_or(ModelError::ZoneOutOfRange(a))?;
        if b >= self.zones().len() {
            return Err(ModelError::ZoneOutOfRange(b));
        }
        Ok(zone.connectivity.contains(b))
    }

    /// Returns `true` if zone `b` is potentially visible from zone `a`.
    pub fn zone_sees(&self, a: usize, b: usize) -> ModelResult<bool> {
        let zone = self.zones().get(a).ok_or(ModelError::ZoneOutOfRange(a))?;
        if b >= self.zones().len() {
            return Err(ModelError::ZoneOutOfRange(b));
        }
        Ok(zone.visibility.contains(b))
    }

    /// Records that `zone` was rendered at `now`.
    pub fn mark_zone_rendered(&mut self, zone: usize, now: f32) -> ModelResult<()> {
        self.zone_mut(zone)?.last_render_time = now;
        Ok(())
    }

    /// Leaf-to-leaf visibility. Always `true`: zone masks are the only
    /// visibility data a model carries.
    pub fn potentially_visible(&self, _a: LeafIndex, _b: LeafIndex) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Leaf, Zone};

    fn zoned_model() -> BspModel {
        let mut model = BspModel::default();
        let mut hall = Zone::isolated(0);
        hall.connectivity.insert(1);
        hall.visibility.insert(1);
        hall.visibility.insert(2);
        model.push_zone(hall).unwrap();
        model.push_zone(Zone::isolated(1)).unwrap();
        model.push_zone(Zone::isolated(2)).unwrap();
        model.push_leaf(Leaf::new(0, ZoneMask(0b011)));
        model.push_leaf(Leaf::new(2, ZoneMask(0b100)));
        model
    }

    #[test]
    fn leaf_visibility_comes_from_mask() {
        let model = zoned_model();
        assert_eq!(model.leaf_zone(1), Ok(2));
        assert!(model.is_zone_visible(0, 1).unwrap());
        assert!(!model.is_zone_visible(0, 2).unwrap());
        assert!(model.is_zone_visible(1, 2).unwrap());
        assert_eq!(model.visible_zones(7), Err(ModelError::LeafOutOfRange(7)));
    }

    #[test]
    fn zone_connectivity_and_visibility() {
        let model = zoned_model();
        assert!(model.zones_connected(0, 1).unwrap());
        assert!(!model.zones_connected(0, 2).unwrap());
        assert!(model.zone_sees(0, 2).unwrap());
        assert!(!model.zone_sees(1, 0).unwrap());
        assert_eq!(model.zones_connected(0, 9), Err(ModelError::ZoneOutOfRange(9)));
    }

    #[test]
    fn mark_zone_rendered_updates_timestamp() {
        let mut model = zoned_model();
        model.mark_zone_rendered(2, 4.5).unwrap();
        assert_eq!(model.zones()[2].last_render_time, 4.5);
        assert!(model.mark_zone_rendered(3, 1.0).is_err());
    }

    #[test]
    fn leaves_are_always_potentially_visible() {
        let model = zoned_model();
        assert!(model.potentially_visible(0, 1));
    }
}
