//! Region cropping ahead of recognition.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};

use crate::core::config::CropConfig;
use crate::core::errors::OcrError;
use crate::processors::geometry::Region;

/// Crops a region from a page for recognition.
///
/// The region is padded on all sides (clamped to the page), optionally
/// upscaled for legibility, and optionally re-thresholded independently of
/// the page-level binarization: local contrast inside a small crop is
/// often better than global.
pub fn crop_region(
    page: &RgbImage,
    region: Region,
    config: &CropConfig,
) -> Result<RgbImage, OcrError> {
    let (page_w, page_h) = page.dimensions();
    let padded = region
        .padded(config.padding, page_w, page_h)
        .ok_or_else(|| {
            OcrError::invalid_input(format!(
                "region {region:?} lies outside the {page_w}x{page_h} page"
            ))
        })?;

    let mut crop = imageops::crop_imm(page, padded.x, padded.y, padded.width, padded.height)
        .to_image();

    if config.scale > 1.0 {
        let width = ((padded.width as f32 * config.scale).round() as u32).max(1);
        let height = ((padded.height as f32 * config.scale).round() as u32).max(1);
        crop = imageops::resize(&crop, width, height, FilterType::Triangle);
    }

    if config.rethreshold {
        crop = rethreshold(&crop);
    }

    Ok(crop)
}

/// Re-binarizes a crop with a local Otsu level, keeping dark text on a
/// light background (recognition engines expect non-inverted input).
fn rethreshold(crop: &RgbImage) -> RgbImage {
    let gray: GrayImage = imageops::grayscale(crop);
    let level = otsu_level(&gray);
    let binary = threshold(&gray, level, ThresholdType::Binary);
    image::DynamicImage::ImageLuma8(binary).to_rgb8()
}
