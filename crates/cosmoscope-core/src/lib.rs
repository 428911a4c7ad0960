//! Core abstractions for cosmoscope.
//!
//! This crate provides the data model and the geometric algorithms used throughout
//! cosmoscope:
//! - [`SurfaceSamples`], the per-segment arrays read from a COSMO calculation
//! - [`NeighborIndex`], a k-d tree answering radius queries
//! - [`build_faces`], the ownership-aware proximity triangulation
//! - Configuration [`Options`] and the shared error type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Options structs legitimately have several boolean flags
#![allow(clippy::struct_excessive_bools)]
// Mesh code indexes points by usize and reports statistics as f64
#![allow(clippy::cast_precision_loss)]

pub mod error;
pub mod mesh;
pub mod options;
pub mod samples;
pub mod spatial;

pub use error::{CosmoError, Result};
pub use mesh::{
    build_faces, build_faces_with_events, build_sample_faces, neighbor_sets, Face, FaceSet,
    LogEvents, MeshEvents, NeighborStats, NoEvents,
};
pub use options::{ColorBy, ColorOptions, MeshOptions, Options, RenderSettings};
pub use samples::{patch_radius, SurfaceSamples, ANGSTROM_PER_BOHR};
pub use spatial::NeighborIndex;

// Re-export glam types for convenience
pub use glam::{DVec3, Vec3};
