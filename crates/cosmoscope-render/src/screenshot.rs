//! Saving rendered frames.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbImage};

use crate::error::{RenderError, RenderResult};

/// Returns the image format for `path` from its extension (png, jpg, jpeg).
pub fn image_format(path: &Path) -> RenderResult<ImageFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        _ => Err(RenderError::UnsupportedFormat(extension)),
    }
}

/// Saves an image, choosing the encoder from the file extension.
///
/// Parent directories are created as needed.
///
/// # Errors
/// Returns an error if the format is unsupported or the file cannot be written.
pub fn save_image(path: impl AsRef<Path>, image: &RgbImage) -> RenderResult<()> {
    let path = path.as_ref();
    let format = image_format(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image.save_with_format(path, format)?;
    log::info!("wrote image {}", path.display());
    Ok(())
}

/// Encodes an image as PNG in memory.
pub fn save_to_buffer(image: &RgbImage) -> RenderResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
