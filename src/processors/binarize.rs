//! Grayscale conversion, denoising, and binarization.
//!
//! Both binarization paths emit an inverted binary image: ink and rule
//! lines become foreground (255) on a black background, which is what the
//! morphology and contour stages expect.

use image::{GrayImage, RgbImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::filter::gaussian_blur_f32;

use crate::core::config::BinarizeMethod;

/// Converts an RGB page to grayscale.
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Gaussian blur for denoising ahead of thresholding. A sigma of zero (or
/// anything non-positive) returns the input unchanged.
pub fn blur(gray: &GrayImage, sigma: f32) -> GrayImage {
    if sigma > 0.0 {
        gaussian_blur_f32(gray, sigma)
    } else {
        gray.clone()
    }
}

/// Binarizes a grayscale page with the configured method, inverted so that
/// ink is the "on" value.
///
/// `block_size` and `offset` only apply to the adaptive method: each pixel
/// is compared against the mean of its `block_size x block_size` window
/// minus `offset`.
pub fn binarize_inverted(
    gray: &GrayImage,
    method: BinarizeMethod,
    block_size: u32,
    offset: f32,
) -> GrayImage {
    match method {
        BinarizeMethod::Otsu => {
            let level = otsu_level(gray);
            threshold(gray, level, ThresholdType::BinaryInverted)
        }
        BinarizeMethod::Adaptive => adaptive_inverted(gray, block_size as usize, offset),
    }
}

/// Local-mean adaptive threshold with an offset, inverted output.
///
/// Window means come from an integral image so the cost is independent of
/// the block size. Windows are clamped at the page edges.
fn adaptive_inverted(gray: &GrayImage, block_size: usize, offset: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let w = width as usize;
    let h = height as usize;
    let src = gray.as_raw();

    // integral[(y + 1) * (w + 1) + (x + 1)] = sum of src[0..=y][0..=x]
    let iw = w + 1;
    let mut integral = vec![0u64; iw * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += src[y * w + x] as u64;
            integral[(y + 1) * iw + (x + 1)] = row_sum + integral[y * iw + (x + 1)];
        }
    }

    let half = (block_size / 2) as isize;
    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let y0 = (y as isize - half).max(0) as usize;
            let x0 = (x as isize - half).max(0) as usize;
            let y1 = ((y as isize + half).min(h as isize - 1) + 1) as usize;
            let x1 = ((x as isize + half).min(w as isize - 1) + 1) as usize;

            let area = ((y1 - y0) * (x1 - x0)) as f32;
            let sum = (integral[y1 * iw + x1] + integral[y0 * iw + x0])
                - (integral[y0 * iw + x1] + integral[y1 * iw + x0]);
            let mean = sum as f32 / area;

            out[y * w + x] = if (src[y * w + x] as f32) <= mean - offset {
                255
            } else {
                0
            };
        }
    }

    GrayImage::from_raw(width, height, out).expect("buffer matches dimensions")
}

/// Estimates the dominant skew of the binary foreground, in degrees.
///
/// Uses the orientation of the foreground's principal axis (second-order
/// central moments). Near-horizontal text yields a small angle; a positive
/// value means the text rises to the right. Returns 0.0 for a blank mask.
pub fn estimate_skew_degrees(binary: &GrayImage) -> f32 {
    let (width, height) = binary.dimensions();
    let w = width as usize;
    let src = binary.as_raw();

    let mut count = 0u64;
    let mut sum_x = 0f64;
    let mut sum_y = 0f64;
    for y in 0..height as usize {
        for x in 0..w {
            if src[y * w + x] > 0 {
                count += 1;
                sum_x += x as f64;
                sum_y += y as f64;
            }
        }
    }
    if count == 0 {
        return 0.0;
    }
    let cx = sum_x / count as f64;
    let cy = sum_y / count as f64;

    let mut mu20 = 0f64;
    let mut mu02 = 0f64;
    let mut mu11 = 0f64;
    for y in 0..height as usize {
        for x in 0..w {
            if src[y * w + x] > 0 {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                mu20 += dx * dx;
                mu02 += dy * dy;
                mu11 += dx * dy;
            }
        }
    }

    // Image rows grow downward, so negate to express "rises to the right".
    let theta = 0.5 * (2.0 * mu11).atan2(mu20 - mu02);
    -(theta.to_degrees() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn page_with_dark_band(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb([230, 230, 230]));
        for y in height / 3..height / 2 {
            for x in 10..width - 10 {
                img.put_pixel(x, y, Rgb([20, 20, 20]));
            }
        }
        img
    }

    #[test]
    fn otsu_marks_ink_as_foreground() {
        let gray = to_grayscale(&page_with_dark_band(100, 60));
        let bin = binarize_inverted(&gray, BinarizeMethod::Otsu, 15, 8.0);
        assert_eq!(bin.get_pixel(50, 25)[0], 255);
        assert_eq!(bin.get_pixel(50, 5)[0], 0);
    }

    #[test]
    fn adaptive_marks_ink_as_foreground() {
        let gray = to_grayscale(&page_with_dark_band(100, 60));
        let bin = binarize_inverted(&gray, BinarizeMethod::Adaptive, 15, 8.0);
        assert_eq!(bin.get_pixel(50, 25)[0], 255);
        assert_eq!(bin.get_pixel(50, 5)[0], 0);
    }

    #[test]
    fn adaptive_survives_illumination_gradient() {
        // Dark text on a background that darkens towards the right; a
        // global threshold would swallow one side.
        let width = 200u32;
        let height = 40u32;
        let mut img = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let shade = 220 - (x * 60 / width) as u8;
                img.put_pixel(x, y, Rgb([shade, shade, shade]));
            }
        }
        for x in (10..190).step_by(20) {
            for y in 15..25 {
                for dx in 0..8 {
                    img.put_pixel(x + dx, y, Rgb([10, 10, 10]));
                }
            }
        }
        let gray = to_grayscale(&img);
        let bin = binarize_inverted(&gray, BinarizeMethod::Adaptive, 15, 8.0);
        // Strokes at both ends of the gradient survive.
        assert_eq!(bin.get_pixel(12, 20)[0], 255);
        assert_eq!(bin.get_pixel(172, 20)[0], 255);
    }

    #[test]
    fn blur_spreads_intensity() {
        let mut gray = GrayImage::new(11, 11);
        gray.put_pixel(5, 5, image::Luma([255]));
        let blurred = blur(&gray, 1.1);
        assert!(blurred.get_pixel(5, 5)[0] < 255);
        assert!(blurred.get_pixel(4, 5)[0] > 0);
    }

    #[test]
    fn blur_zero_sigma_is_identity() {
        let gray = to_grayscale(&page_with_dark_band(30, 30));
        assert_eq!(blur(&gray, 0.0), gray);
    }

    #[test]
    fn skew_of_horizontal_band_is_near_zero() {
        let mut bin = GrayImage::new(200, 100);
        for x in 20..180 {
            for y in 48..52 {
                bin.put_pixel(x, y, image::Luma([255]));
            }
        }
        assert!(estimate_skew_degrees(&bin).abs() < 1.0);
    }

    #[test]
    fn skew_detects_rising_diagonal() {
        let mut bin = GrayImage::new(200, 200);
        // A band rising to the right: y decreases as x increases.
        for x in 20..180u32 {
            let y = 160 - x / 2;
            for dy in 0..4 {
                bin.put_pixel(x, y + dy, image::Luma([255]));
            }
        }
        let angle = estimate_skew_degrees(&bin);
        assert!(angle > 10.0, "expected a positive skew, got {angle}");
    }

    #[test]
    fn skew_of_blank_mask_is_zero() {
        let bin = GrayImage::new(50, 50);
        assert_eq!(estimate_skew_degrees(&bin), 0.0);
    }
}
