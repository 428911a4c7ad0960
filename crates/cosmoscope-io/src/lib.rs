//! File formats for cosmoscope.
//!
//! - [`read_cpcm`]: COSMO surface segments from `.cpcm` files
//! - [`write_vrml`] / [`read_vrml`]: colored `IndexedFaceSet` meshes
//! - [`write_pqr`]: surface points as PQR pseudo-atoms

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

pub mod cpcm;
pub mod pqr;
pub mod vrml;

pub use cpcm::{parse_cpcm, read_cpcm};
pub use pqr::{write_pqr, write_pqr_to, DEFAULT_PQR_RADIUS};
pub use vrml::{parse_vrml, read_vrml, read_vrml_colors, write_vrml, write_vrml_to, VrmlMesh};
