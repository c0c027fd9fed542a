//! Error types for model validation and index operations.

use thiserror::Error;

use crate::projector::ProjectorId;

/// Errors reported by the spatial index.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// A node index is outside the node array.
    #[error("node {0} is out of range")]
    NodeOutOfRange(usize),

    /// A leaf index is outside the leaf array.
    #[error("leaf {0} is out of range")]
    LeafOutOfRange(usize),

    /// A surface index is outside the surface array.
    #[error("surface {0} is out of range")]
    SurfaceOutOfRange(usize),

    /// A point or vector index is outside the shared geometry arrays.
    #[error("{kind} {index} is out of range")]
    GeometryOutOfRange {
        /// Which array was indexed.
        kind: &'static str,
        /// The offending index.
        index: usize,
    },

    /// A node's vertex range runs past the vertex pool.
    #[error("node {node} vertex range {start}..{end} exceeds the vertex pool")]
    VertexPoolOutOfRange {
        /// Node carrying the range.
        node: usize,
        /// First pool entry.
        start: usize,
        /// One past the last pool entry.
        end: usize,
    },

    /// A zone index is outside the zone array.
    #[error("zone {0} is out of range")]
    ZoneOutOfRange(usize),

    /// More than 64 zones were requested.
    #[error("a model holds at most 64 zones, got {0}")]
    TooManyZones(usize),

    /// A lightmap index is outside the lightmap array.
    #[error("light map {0} is out of range")]
    LightMapOutOfRange(usize),

    /// A coplanar node has front or back children.
    #[error("coplanar node {0} has front or back children")]
    PlaneChildHasChildren(usize),

    /// A node is reachable twice while walking the tree.
    #[error("node {0} is reachable more than once")]
    NodeReachedTwice(usize),

    /// The projector id is unknown or already destroyed.
    #[error("projector {0} does not exist")]
    UnknownProjector(ProjectorId),

    /// A projector's reference count disagrees with its attachments.
    #[error("projector {id} holds {count} references but attachments imply {expected}")]
    ProjectorReferenceMismatch {
        /// The projector.
        id: ProjectorId,
        /// Its stored reference count.
        count: u32,
        /// The count implied by node attachments.
        expected: u32,
    },
}

/// Result type for index operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
