//! Read-only queries over a [`BspModel`](crate::BspModel).
//!
//! # Example
//!
//! ```ignore
//! use bsp_index::{BoundingBox, TraversalStack};
//!
//! let mut scratch = TraversalStack::new();
//! let leaves = model.find_touched_leaves(&actor_bounds, &mut scratch);
//! for leaf in leaves {
//!     let zones = model.visible_zones(leaf)?;
//! }
//! ```
//!
//! - [`TraversalStack`]: scratch stack reused across descents
//! - box queries: `find_touched_leaves`, `find_touched_nodes`
//! - collision: `point_region`, `point_check`, `line_check`
//! - visibility: `visible_zones`, `is_zone_visible`, `potentially_visible`
//! - ordering: `traverse_front_to_back` with a [`NodeVisitor`]

mod leaves;
mod point;
mod visibility;
mod visitor;

pub use leaves::TraversalStack;
pub use point::{LineHit, PointRegion};
pub use visitor::{CollectingVisitor, FnVisitor, NodeVisitor};
