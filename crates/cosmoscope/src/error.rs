//! Error type for the batch pipeline.

use std::path::PathBuf;

use cosmoscope_core::CosmoError;
use cosmoscope_render::RenderError;
use thiserror::Error;

/// Errors raised while processing a directory of surfaces.
#[derive(Error, Debug)]
pub enum Error {
    /// Parsing, meshing, coloring or configuration failed.
    #[error(transparent)]
    Cosmo(#[from] CosmoError),

    /// Rasterization or image encoding failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A directory could not be listed or created.
    #[error("cannot access directory {}", path.display())]
    Dir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A step failed for a specific file.
    #[error("failed to process {}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attaches the file being processed to an error.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// A specialized Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
