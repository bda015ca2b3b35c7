//! Configuration for the detection, grouping, and cropping stages.
//!
//! All config structs deserialize with serde and fill unspecified fields
//! from the defaults below. Defaults target 200-300 dpi roll scans; the
//! size filters and the row tolerance scale with resolution and are the
//! first knobs to adjust for other material.

use serde::{Deserialize, Serialize};

use crate::core::errors::OcrError;

/// Structural layout family of the scanned page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Unruled row listing: lines of text are fused into one blob per row.
    #[default]
    RowBand,
    /// Ruled table: horizontal and vertical rule lines enclose cells.
    GridCell,
}

/// Page-level binarization method.
///
/// Adaptive thresholding handles uneven lighting and handwritten forms;
/// global Otsu is sufficient for clean printed tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinarizeMethod {
    /// Local mean threshold with an offset, computed per pixel.
    #[default]
    Adaptive,
    /// Global Otsu threshold.
    Otsu,
}

/// How a page is turned into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStrategy {
    /// Detect regions, group rows, recognize each region, one record per
    /// region.
    #[default]
    Segmented,
    /// Recognize the whole page once and accumulate records across the
    /// line stream, keyed on serial-shaped lines.
    WholePage,
}

/// Region detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Structural detection mode.
    pub mode: DetectionMode,
    /// Page binarization method.
    pub binarize: BinarizeMethod,
    /// Gaussian blur sigma applied before thresholding. Zero disables.
    pub blur_sigma: f32,
    /// Estimate the dominant skew of the binarized foreground and rotate
    /// the page before detection.
    pub deskew: bool,
    /// Closing kernel (width, height) for row-band mode. Wide and short so
    /// a line of text fuses into one blob.
    pub band_kernel: (u32, u32),
    /// Length of the rule-line kernels in grid-cell mode. The horizontal
    /// kernel is `line_kernel_len x 1`, the vertical `1 x line_kernel_len`.
    pub line_kernel_len: u32,
    /// Open iterations when isolating rule lines.
    pub line_iterations: u32,
    /// Minimum region width in pixels.
    pub min_width: u32,
    /// Minimum region height in pixels.
    pub min_height: u32,
    /// Regions covering more than this fraction of both page dimensions
    /// are rejected as "the whole page".
    pub max_page_fraction: f32,
    /// Number of equal-height strips in the strip fallback.
    pub fallback_strips: u32,
    /// Adaptive threshold window edge length. Must be odd.
    pub adaptive_block_size: u32,
    /// Offset subtracted from the local mean in adaptive thresholding.
    pub adaptive_offset: f32,
    /// Horizontal bucket width for the OCR-position fallback.
    pub token_bucket_width: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::default(),
            binarize: BinarizeMethod::default(),
            blur_sigma: 1.1,
            deskew: false,
            band_kernel: (40, 3),
            line_kernel_len: 40,
            line_iterations: 2,
            min_width: 30,
            min_height: 15,
            max_page_fraction: 0.95,
            fallback_strips: 10,
            adaptive_block_size: 15,
            adaptive_offset: 8.0,
            token_bucket_width: 200,
        }
    }
}

impl DetectorConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), OcrError> {
        if self.band_kernel.0 == 0 || self.band_kernel.1 == 0 {
            return Err(OcrError::invalid_field(
                "band_kernel",
                "positive dimensions",
                format!("{:?}", self.band_kernel),
            ));
        }
        if self.line_kernel_len == 0 {
            return Err(OcrError::invalid_field(
                "line_kernel_len",
                "a positive length",
                self.line_kernel_len,
            ));
        }
        if self.line_iterations == 0 {
            return Err(OcrError::invalid_field(
                "line_iterations",
                "at least one iteration",
                self.line_iterations,
            ));
        }
        if self.min_width == 0 || self.min_height == 0 {
            return Err(OcrError::invalid_field(
                "min_width/min_height",
                "positive sizes",
                format!("{}x{}", self.min_width, self.min_height),
            ));
        }
        if !(self.max_page_fraction > 0.0 && self.max_page_fraction <= 1.0) {
            return Err(OcrError::invalid_field(
                "max_page_fraction",
                "a fraction in (0, 1]",
                self.max_page_fraction,
            ));
        }
        if self.fallback_strips == 0 {
            return Err(OcrError::invalid_field(
                "fallback_strips",
                "at least one strip",
                self.fallback_strips,
            ));
        }
        if self.adaptive_block_size < 3 || self.adaptive_block_size % 2 == 0 {
            return Err(OcrError::invalid_field(
                "adaptive_block_size",
                "an odd value >= 3",
                self.adaptive_block_size,
            ));
        }
        if self.token_bucket_width == 0 {
            return Err(OcrError::invalid_field(
                "token_bucket_width",
                "a positive width",
                self.token_bucket_width,
            ));
        }
        Ok(())
    }
}

/// Row grouping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowGroupConfig {
    /// Maximum distance between a region's vertical center and the running
    /// mean of the current row before a new row opens.
    pub tolerance: f32,
}

impl Default for RowGroupConfig {
    fn default() -> Self {
        Self { tolerance: 12.0 }
    }
}

impl RowGroupConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), OcrError> {
        if !(self.tolerance > 0.0) {
            return Err(OcrError::invalid_field(
                "tolerance",
                "a positive distance",
                self.tolerance,
            ));
        }
        Ok(())
    }
}

/// Pre-recognition crop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Fixed pixel padding added on all sides, clamped to page bounds.
    pub padding: u32,
    /// Upscale factor applied to the crop before recognition. Values at or
    /// below 1.0 disable scaling.
    pub scale: f32,
    /// Re-threshold the crop independently of the page-level binarization.
    pub rethreshold: bool,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            padding: 3,
            scale: 1.5,
            rethreshold: false,
        }
    }
}

impl CropConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), OcrError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(OcrError::invalid_field(
                "scale",
                "a positive finite factor",
                self.scale,
            ));
        }
        Ok(())
    }
}

/// Run-level parameters supplied by the calling service.
///
/// These identify the constituency the uploaded document belongs to; they
/// are copied into every emitted record rather than discovered per record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParams {
    /// Assembly Constituency number.
    pub ac_number: String,
    /// Electoral part number.
    pub part_number: String,
    /// Optional booth or sheet label, carried for the caller's export.
    pub booth: String,
}

impl RunParams {
    /// Creates run parameters for the given constituency identifiers.
    pub fn new(ac_number: impl Into<String>, part_number: impl Into<String>) -> Self {
        Self {
            ac_number: ac_number.into(),
            part_number: part_number.into(),
            booth: String::new(),
        }
    }

    /// Sets the booth/sheet label.
    pub fn with_booth(mut self, booth: impl Into<String>) -> Self {
        self.booth = booth.into();
        self
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Region detector settings.
    pub detector: DetectorConfig,
    /// Row grouping settings.
    pub rows: RowGroupConfig,
    /// Pre-recognition crop settings.
    pub crop: CropConfig,
    /// Page processing strategy.
    pub strategy: PageStrategy,
    /// When enabled the pipeline additionally collects intermediate
    /// artifacts (region overlay, per-region crops) for inspection. Has no
    /// effect on emitted records.
    pub debug: bool,
}

impl PipelineConfig {
    /// Validates every section of the configuration.
    pub fn validate(&self) -> Result<(), OcrError> {
        self.detector.validate()?;
        self.rows.validate()?;
        self.crop.validate()?;
        Ok(())
    }
}
