//! Image loading and conversion helpers.
//!
//! Page rasterization (PDF handling) belongs to the calling service; these
//! helpers cover the plain-image path and the conversions tests need.

use std::path::Path;

use image::{DynamicImage, RgbImage};

use crate::core::errors::OcrError;

/// Loads an image file as an RGB page.
///
/// A decode failure is the one unrecoverable input error of a run; it is
/// surfaced as [`OcrError::ImageLoad`] with no partial output.
pub fn load_image(path: &Path) -> Result<RgbImage, OcrError> {
    let img = image::open(path)?;
    Ok(dynamic_to_rgb(img))
}

/// Converts any decoded image to the RGB form the pipeline consumes.
pub fn dynamic_to_rgb(image: DynamicImage) -> RgbImage {
    image.to_rgb8()
}
