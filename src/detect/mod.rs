//! Candidate-region detection on page images.
//!
//! Two structural families are handled. Unruled row listings (row-band
//! mode) fuse each line of text into one blob with a wide closing kernel.
//! Ruled tables (grid-cell mode) isolate the horizontal and vertical rule
//! lines with long thin kernels and treat the areas the line network
//! encloses as candidate cells. Both modes end in contour tracing, size
//! filtering, and a reading-order sort.
//!
//! Morphological detection fails silently on low-contrast scans and skewed
//! photos, so two content-driven fallbacks exist: an equal-height strip
//! split, and clustering of OCR word positions when a whole-page
//! recognition pass is available. The pipeline wires those in when fewer
//! than two usable regions come back.

pub mod rows;

use image::{GrayImage, Rgb, RgbImage};
use imageproc::contours::find_contours;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

use crate::core::config::{DetectionMode, DetectorConfig};
use crate::core::errors::OcrError;
use crate::processors::binarize;
use crate::processors::geometry::{Region, sort_reading_order};
use crate::processors::morphology::{close_rect, dilate_rect, erode_rect, union_masks};
use crate::recognize::Token;

/// Foreground fraction below which a page counts as blank.
const BLANK_FOREGROUND_FRACTION: f64 = 0.0005;

/// Skew angles beyond this are assumed to be mis-estimates, not page skew.
const MAX_DESKEW_DEGREES: f32 = 15.0;

/// A page prepared for detection: binarized and, when deskew is enabled,
/// rotated upright. Crops must be taken from [`PreparedPage::image`] so
/// they line up with the detected regions.
#[derive(Debug)]
pub struct PreparedPage {
    /// The page the regions refer to (rotated when deskew applied).
    pub image: RgbImage,
    /// Inverted binary mask of the same page.
    pub binary: GrayImage,
    /// Skew correction that was applied, in degrees. Zero when disabled or
    /// below the correction threshold.
    pub skew_degrees: f32,
}

/// Locates candidate rectangular regions on one page image.
#[derive(Debug, Clone)]
pub struct RegionDetector {
    config: DetectorConfig,
}

impl RegionDetector {
    /// Creates a detector after validating the configuration.
    pub fn new(config: DetectorConfig) -> Result<Self, OcrError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The detector's configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Binarizes (and optionally deskews) a page ahead of detection.
    pub fn prepare(&self, page: &RgbImage) -> PreparedPage {
        let binary = self.binarize(page);

        if self.config.deskew {
            let skew = binarize::estimate_skew_degrees(&binary);
            if skew.abs() > 0.5 && skew.abs() <= MAX_DESKEW_DEGREES {
                tracing::debug!(target: "detect", skew_degrees = skew, "correcting page skew");
                // Positive skew means the content rises to the right; a
                // clockwise rotation by the same angle levels it.
                let rotated = rotate_about_center(
                    page,
                    skew.to_radians(),
                    Interpolation::Bilinear,
                    Rgb([255u8, 255u8, 255u8]),
                );
                let binary = self.binarize(&rotated);
                return PreparedPage {
                    image: rotated,
                    binary,
                    skew_degrees: skew,
                };
            }
        }

        PreparedPage {
            image: page.clone(),
            binary,
            skew_degrees: 0.0,
        }
    }

    fn binarize(&self, page: &RgbImage) -> GrayImage {
        let gray = binarize::to_grayscale(page);
        let gray = binarize::blur(&gray, self.config.blur_sigma);
        binarize::binarize_inverted(
            &gray,
            self.config.binarize,
            self.config.adaptive_block_size,
            self.config.adaptive_offset,
        )
    }

    /// Runs structural detection over a prepared binary mask.
    ///
    /// Returns regions sorted ascending by `(top, left)`. May legitimately
    /// return zero or one region; the caller decides whether to engage a
    /// fallback.
    pub fn detect(&self, binary: &GrayImage) -> Vec<Region> {
        let mask = match self.config.mode {
            DetectionMode::RowBand => self.band_mask(binary),
            DetectionMode::GridCell => self.grid_mask(binary),
        };
        let regions = self.boxes_from_mask(&mask);
        tracing::debug!(
            target: "detect",
            mode = ?self.config.mode,
            regions = regions.len(),
            "structural detection finished"
        );
        regions
    }

    /// True when the mask has essentially no foreground. Blank pages are
    /// allowed to produce zero regions; non-blank pages are not.
    pub fn is_blank(&self, binary: &GrayImage) -> bool {
        let total = binary.as_raw().len() as f64;
        if total == 0.0 {
            return true;
        }
        let foreground = binary.as_raw().iter().filter(|&&p| p > 0).count() as f64;
        foreground / total < BLANK_FOREGROUND_FRACTION
    }

    /// Row-band mode: fuse each text line into one blob.
    fn band_mask(&self, binary: &GrayImage) -> GrayImage {
        let (kw, kh) = self.config.band_kernel;
        let closed = close_rect(binary, kw, kh);
        // Small isotropic dilation bridges the remaining intra-row gaps.
        morphology::dilate(&closed, Norm::LInf, 1)
    }

    /// Grid-cell mode: isolate rule lines, union them into a line mask.
    fn grid_mask(&self, binary: &GrayImage) -> GrayImage {
        let len = self.config.line_kernel_len;
        let iterations = self.config.line_iterations;

        let mut horizontal = binary.clone();
        for _ in 0..iterations {
            horizontal = erode_rect(&horizontal, len, 1);
        }
        for _ in 0..iterations {
            horizontal = dilate_rect(&horizontal, len, 1);
        }

        let mut vertical = binary.clone();
        for _ in 0..iterations {
            vertical = erode_rect(&vertical, 1, len);
        }
        for _ in 0..iterations {
            vertical = dilate_rect(&vertical, 1, len);
        }

        union_masks(&horizontal, &vertical)
    }

    /// Contour bounding boxes of a mask, size-filtered and sorted.
    fn boxes_from_mask(&self, mask: &GrayImage) -> Vec<Region> {
        let (page_w, page_h) = mask.dimensions();
        let contours = find_contours::<u32>(mask);

        let mut regions: Vec<Region> = contours
            .iter()
            .filter_map(|contour| {
                Region::bounding(contour.points.iter().map(|p| (p.x, p.y)))
            })
            .filter_map(|r| r.clamped(page_w, page_h))
            .filter(|r| r.width >= self.config.min_width && r.height >= self.config.min_height)
            .filter(|r| !r.covers_page(page_w, page_h, self.config.max_page_fraction))
            .collect();

        sort_reading_order(&mut regions);
        regions
    }

    /// Strip fallback: the page as a fixed number of equal-height
    /// full-width bands. Always yields at least one region for a non-empty
    /// page.
    pub fn strip_regions(&self, page_width: u32, page_height: u32) -> Vec<Region> {
        let strips = self.config.fallback_strips.min(page_height.max(1));
        let strip_height = (page_height / strips).max(1);
        let mut regions = Vec::with_capacity(strips as usize);
        for i in 0..strips {
            let y = i * strip_height;
            if y >= page_height {
                break;
            }
            // The last strip absorbs the remainder.
            let height = if i == strips - 1 {
                page_height - y
            } else {
                strip_height
            };
            if let Some(region) = Region::new(0, y, page_width, height).clamped(page_width, page_height)
            {
                regions.push(region);
            }
        }
        regions
    }

    /// OCR-position fallback: cluster word tokens by text line and
    /// horizontal bucket, bypassing image-space detection entirely.
    ///
    /// Tokens are assigned to lines by top-coordinate proximity (within the
    /// detector's minimum region height), then split into buckets of
    /// `token_bucket_width` pixels; each occupied (line, bucket) cell
    /// becomes the bounding region of its tokens.
    pub fn regions_from_tokens(&self, tokens: &[Token]) -> Vec<Region> {
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut ordered: Vec<&Token> = tokens.iter().collect();
        ordered.sort_by_key(|t| (t.top, t.left));

        let line_tolerance = self.config.min_height;
        let mut lines: Vec<(u32, Vec<&Token>)> = Vec::new();
        for token in ordered {
            match lines.last_mut() {
                Some((line_top, members))
                    if token.top.abs_diff(*line_top) <= line_tolerance =>
                {
                    members.push(token);
                }
                _ => lines.push((token.top, vec![token])),
            }
        }

        let bucket_width = self.config.token_bucket_width;
        let mut regions = Vec::new();
        for (_, members) in &lines {
            let mut buckets: Vec<(u32, Vec<&Token>)> = Vec::new();
            for token in members {
                let bucket = token.left / bucket_width;
                match buckets.iter_mut().find(|(b, _)| *b == bucket) {
                    Some((_, group)) => group.push(token),
                    None => buckets.push((bucket, vec![token])),
                }
            }
            for (_, group) in buckets {
                let corners = group.iter().flat_map(|t| {
                    [(t.left, t.top), (t.left + t.width, t.top + t.height)]
                });
                if let Some(region) = Region::bounding(corners.collect::<Vec<_>>()) {
                    regions.push(region);
                }
            }
        }

        sort_reading_order(&mut regions);
        tracing::debug!(
            target: "detect",
            lines = lines.len(),
            regions = regions.len(),
            "built regions from OCR token positions"
        );
        regions
    }
}
