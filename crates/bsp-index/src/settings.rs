//! Tunables for queries, projectors and render batching.

use serde::{Deserialize, Serialize};

use crate::PLANE_EPSILON;

/// Runtime settings held by a [`BspModel`](crate::BspModel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// A projector not rendered for longer than this expires.
    pub projector_idle_timeout: f32,
    /// Exclusive upper bound on vertices per render section.
    pub section_vertex_limit: usize,
    /// Boxes whose smallest extent exceeds this fraction of the largest are
    /// tested as spheres during leaf queries.
    pub cube_ratio: f32,
    /// Distance under which a point counts as lying on a plane.
    pub plane_epsilon: f32,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            projector_idle_timeout: 1.0,
            section_vertex_limit: 65536,
            cube_ratio: 0.5,
            plane_epsilon: PLANE_EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = IndexSettings::default();
        assert_eq!(settings.projector_idle_timeout, 1.0);
        assert_eq!(settings.section_vertex_limit, 65536);
        assert_eq!(settings.cube_ratio, 0.5);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let settings: IndexSettings =
            serde_json::from_str(r#"{ "section_vertex_limit": 1024 }"#).unwrap();
        assert_eq!(settings.section_vertex_limit, 1024);
        assert_eq!(settings.projector_idle_timeout, 1.0);
    }
}
