//! cosmoscope: mesh, color and render COSMO solvation surfaces.
//!
//! A COSMO calculation writes the segments of the molecular cavity surface to a `.cpcm`
//! file: one point per segment with its area, screening charge, potential and the atomic
//! sphere it belongs to. cosmoscope turns those points into a triangle mesh, colors it by
//! one of the scalar channels, writes it as VRML and renders it to PNG.
//!
//! # Quick Start
//!
//! ```no_run
//! use cosmoscope::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let options = Options::default();
//!     let summary = process_all(
//!         Path::new("input"),
//!         Path::new("output"),
//!         &options,
//!         &ProcessFlags::default(),
//!     )?;
//!     println!("{} meshes built", summary.meshes_built);
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - `cosmoscope-core`: samples, neighbor index, mesh builder, options
//! - `cosmoscope-render`: color maps, color mapper, CPU rasterizer
//! - `cosmoscope-io`: `.cpcm`, VRML and PQR files

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod error;
mod pipeline;

pub use error::{Error, Result};
pub use pipeline::{
    build_mesh_file, list_files, process_all, render_file, MeshOutput, ProcessFlags,
    ProcessSummary,
};

// Re-export core types
pub use cosmoscope_core::{
    build_faces, build_faces_with_events, build_sample_faces, neighbor_sets, patch_radius,
    ColorBy, ColorOptions, CosmoError, DVec3, Face, FaceSet, LogEvents, MeshEvents,
    MeshOptions, NeighborIndex, NeighborStats, NoEvents, Options, RenderSettings,
    SurfaceSamples, Vec3, ANGSTROM_PER_BOHR,
};

// Re-export render types
pub use cosmoscope_render::{
    map_colors, render_mesh, save_image, Camera, ColorMap, ColorMapRegistry, RenderError,
    RenderMesh, Rgb8,
};

// Re-export file formats
pub use cosmoscope_io::{
    read_cpcm, read_vrml, write_pqr, write_vrml, VrmlMesh, DEFAULT_PQR_RADIUS,
};

/// Version of the cosmoscope crates.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
