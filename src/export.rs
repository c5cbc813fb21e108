//! PNG import and export of height images.

use std::path::Path;

use image::RgbaImage;
use tracing::debug;

use crate::codec;
use crate::error::{PseudoErosionError, Result};
use crate::height_image::HeightImage;
use crate::tilemap::Tilemap;

/// Convert to an RGBA buffer (R = G = B = height channel, A = 255).
pub fn to_rgba_image(image: &HeightImage) -> RgbaImage {
    let size = image.size() as u32;
    RgbaImage::from_fn(size, size, |x, y| image::Rgba(codec::to_rgba(image.pixel(x as usize, y as usize))))
}

/// Write a height image as a 4-channel PNG (or any format the extension names).
pub fn save_height_image(image: &HeightImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    to_rgba_image(image)
        .save(path)
        .map_err(|e| PseudoErosionError::from_image_error(path, e))?;
    debug!(path = %path.display(), size = image.size(), "saved height image");
    Ok(())
}

/// Read a square image as heights, taking the first color channel.
///
/// Gray, RGB and RGBA inputs are accepted; alpha is discarded.
pub fn load_height_image(path: impl AsRef<Path>) -> Result<HeightImage> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|e| PseudoErosionError::from_image_error(path, e))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width != height {
        return Err(PseudoErosionError::Format {
            path: path.to_path_buf(),
            message: format!("image is {}x{}, expected a square image", width, height),
        });
    }

    let pixels: Vec<u32> = rgba
        .pixels()
        .map(|p| codec::from_rgba([p[0], p[0], p[0], 255]))
        .collect();
    let pixels = Tilemap::from_vec(width as usize, height as usize, pixels).ok_or_else(|| {
        PseudoErosionError::Format {
            path: path.to_path_buf(),
            message: "pixel buffer does not match image dimensions".into(),
        }
    })?;
    debug!(path = %path.display(), size = width, "loaded height image");
    HeightImage::from_pixels(pixels).ok_or_else(|| PseudoErosionError::Format {
        path: path.to_path_buf(),
        message: "image is not square".into(),
    })
}

/// Read an input image that must be exactly `size x size`.
pub fn load_input_image(path: impl AsRef<Path>, size: usize) -> Result<HeightImage> {
    let path = path.as_ref();
    let image = load_height_image(path)?;
    if image.size() != size {
        return Err(PseudoErosionError::Format {
            path: path.to_path_buf(),
            message: format!("image is {0}x{0}, expected {1}x{1}", image.size(), size),
        });
    }
    Ok(image)
}
