//! Image normalization for menu photos
//!
//! Decodes uploaded bytes into a [`PixelGrid`] that detectors and recognizers
//! read from. Optional grayscale conversion and histogram equalization help
//! with low-contrast menus printed on textured paper.

use image::DynamicImage;
use imageproc::contrast::equalize_histogram;
use tracing::{debug, info};

use super::detection::BoundingBox;
use super::error::VisionError;

/// Preprocessing configuration
#[derive(Debug, Clone, Default)]
pub struct PreprocessConfig {
    /// Convert to single-channel luma after decoding
    pub grayscale: bool,
    /// Histogram-equalize the luma image (implies grayscale)
    pub enhance_contrast: bool,
}

/// Decoded image shared read-only by every stage after normalization
#[derive(Debug, Clone)]
pub struct PixelGrid {
    image: DynamicImage,
}

impl PixelGrid {
    /// Wrap an already decoded image
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Get dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// The underlying image
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Copy out the pixels covered by `bbox`.
    ///
    /// The box is expected to lie within the image; `image` clamps it otherwise.
    pub fn crop(&self, bbox: &BoundingBox) -> DynamicImage {
        self.image.crop_imm(bbox.x1, bbox.y1, bbox.width(), bbox.height())
    }
}

/// Decode raw bytes in any format the `image` crate can guess
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, VisionError> {
    if bytes.is_empty() {
        return Err(VisionError::EmptyInput);
    }

    let image = image::load_from_memory(bytes)?;
    debug!("Decoded {} bytes as {:?}", bytes.len(), image.color());
    Ok(image)
}

/// Decode and preprocess an uploaded image
pub fn normalize_image(bytes: &[u8], config: &PreprocessConfig) -> Result<PixelGrid, VisionError> {
    let decoded = decode_image(bytes)?;

    let image = if config.enhance_contrast {
        let gray = decoded.to_luma8();
        DynamicImage::ImageLuma8(equalize_histogram(&gray))
    } else if config.grayscale {
        DynamicImage::ImageLuma8(decoded.to_luma8())
    } else {
        decoded
    };

    let grid = PixelGrid::new(image);
    info!(
        "Image preprocessed successfully: {}x{} (grayscale={}, enhance_contrast={})",
        grid.width(),
        grid.height(),
        config.grayscale,
        config.enhance_contrast
    );

    Ok(grid)
}
