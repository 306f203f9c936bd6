//! CPU-side mesh buffers built from table rows.
//!
//! This module provides:
//!
//! - [`MeshBuffer`] - Control points, triangles and optional attribute layers
//! - [`LayerElement`] - One attribute array with its mapping and reference mode
//! - Builders that map column ranges onto buffers ([`build_positions`],
//!   [`build_triangles`], [`build_uv`], [`build_normals`], [`build_tangents`],
//!   [`build_vertex_colors`])

mod buffer;
mod builder;
mod error;

pub use buffer::{LayerElement, MappingMode, MeshBuffer, ReferenceMode, UvChannel};
pub use builder::{
    Triangulation, build_normals, build_positions, build_tangents, build_triangles, build_uv,
    build_vertex_colors, uv_channel_name,
};
pub use error::{Attribute, MeshError};
