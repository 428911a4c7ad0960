//! Coloring and rendering for cosmoscope.
//!
//! This crate turns scalar fields into colors and colored meshes into images:
//! - Color maps and the [`ColorMapRegistry`]
//! - [`map_colors`], the scalar-to-RGB mapper with robust bounds
//! - An orthographic [`Camera`] and a CPU rasterizer ([`render_mesh`])
//! - Image output through the `image` crate

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Pixel coordinates and color channels move between integer and float types constantly
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]

pub mod camera;
pub mod color_maps;
pub mod colorize;
pub mod error;
pub mod raster;
pub mod screenshot;

pub use camera::{Camera, WORLD_UP};
pub use color_maps::{ColorMap, ColorMapRegistry};
pub use colorize::{map_colors, percentile, quantize, resolve_range, Rgb8};
pub use error::{RenderError, RenderResult};
pub use raster::{fit_colors, parse_color, render_mesh, RenderMesh};
pub use screenshot::{save_image, save_to_buffer};
