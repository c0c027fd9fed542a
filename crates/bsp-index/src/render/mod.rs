//! Render batches built from node polygons.
//!
//! [`BspModel::build_render_data`](crate::BspModel::build_render_data)
//! replaces every [`RenderSection`] in one pass. Any section handed out
//! before a rebuild is stale afterwards.

mod build;
mod section;

pub use section::{RenderSection, SectionKey, SectionVertex};
