//! Rendering error types.

use thiserror::Error;

/// Errors that can occur while rasterizing or saving an image.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The mesh refers to vertices it does not have, or its arrays disagree.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// The mesh has no vertices to frame.
    #[error("mesh has no vertices")]
    EmptyMesh,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Requested image dimensions are unusable.
    #[error("invalid image size {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The output extension is not a supported image format.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Image encoding error.
    #[error("image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Failed to write the image.
    #[error("failed to save image: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(RenderError::EmptyMesh.to_string(), "mesh has no vertices");
        let err = RenderError::InvalidSize {
            width: 0,
            height: 10,
        };
        assert_eq!(err.to_string(), "invalid image size 0x10");
    }
}
