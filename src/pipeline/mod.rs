//! Pipeline orchestration.
//!
//! [`RollOcrBuilder`] assembles a configured [`RollOcr`] runtime; the
//! runtime drives the detect → group → recognize → extract sequence over a
//! document's pages and collects the ordered record sequence. Pages,
//! regions, and rows are processed strictly top-to-bottom, left-to-right:
//! record boundaries in whole-page mode and the "first match wins" field
//! rules both depend on scan order.

use std::sync::Arc;

use image::RgbImage;

use crate::core::config::{
    CropConfig, DetectionMode, PageStrategy, PipelineConfig, RunParams,
};
use crate::core::errors::OcrError;
use crate::detect::rows::group_into_rows;
use crate::detect::{PreparedPage, RegionDetector};
use crate::extract::record::{RECORD_COLUMNS, VoterRecord};
use crate::extract::{extract_block, extract_lines};
use crate::processors::geometry::Region;
use crate::recognize::{
    FallbackRecognizer, LayoutMode, RecognizeOptions, RecognizedText, TextRecognizer,
};
use crate::utils::crop::crop_region;
use crate::utils::visualization::draw_region_overlay;

/// Intermediate artifacts for one page, collected only when debug output
/// is enabled. Inspection aid; never affects the records.
pub struct PageArtifacts {
    /// 1-based page number.
    pub page: usize,
    /// The page with detected regions outlined.
    pub overlay: RgbImage,
    /// The crops that were sent to recognition, in reading order.
    pub crops: Vec<RgbImage>,
}

impl std::fmt::Debug for PageArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageArtifacts")
            .field("page", &self.page)
            .field(
                "overlay",
                &format_args!("{}x{}", self.overlay.width(), self.overlay.height()),
            )
            .field("crops", &self.crops.len())
            .finish()
    }
}

/// Result of processing one document.
#[derive(Debug, Default)]
pub struct DocumentResult {
    /// All extracted records, in page and reading order.
    pub records: Vec<VoterRecord>,
    /// Number of pages processed.
    pub pages: usize,
    /// Per-page debug artifacts, empty unless debug output was enabled.
    pub artifacts: Vec<PageArtifacts>,
}

impl DocumentResult {
    /// True when no entries were detected document-wide. This is a
    /// user-visible "no records found" condition, not a system error.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The fixed export column headers.
    pub fn headers() -> &'static [&'static str] {
        &RECORD_COLUMNS
    }

    /// Tabular projection of all records, one row per record with every
    /// column present.
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.iter().map(VoterRecord::to_row)
    }
}

/// Builder for the extraction runtime.
///
/// # Example
///
/// ```no_run
/// use roll_ocr::{DetectionMode, PageStrategy, RollOcrBuilder, RunParams, TextRecognizer};
/// use std::sync::Arc;
///
/// # fn engines() -> (Arc<dyn TextRecognizer>, Arc<dyn TextRecognizer>) { unimplemented!() }
/// # fn main() -> Result<(), roll_ocr::OcrError> {
/// let (offline, cloud) = engines();
/// let ocr = RollOcrBuilder::new(offline)
///     .fallback_recognizer(cloud)
///     .detection_mode(DetectionMode::GridCell)
///     .page_strategy(PageStrategy::Segmented)
///     .run_params(RunParams::new("02", "009").with_booth("Booth 14"))
///     .language("eng+ori")
///     .debug_artifacts(true)
///     .build()?;
/// # let _ = ocr;
/// # Ok(())
/// # }
/// ```
pub struct RollOcrBuilder {
    primary: Arc<dyn TextRecognizer>,
    secondary: Option<Arc<dyn TextRecognizer>>,
    config: PipelineConfig,
    params: RunParams,
    options: RecognizeOptions,
}

impl RollOcrBuilder {
    /// Creates a builder with the required primary recognition engine.
    pub fn new(primary: Arc<dyn TextRecognizer>) -> Self {
        Self {
            primary,
            secondary: None,
            config: PipelineConfig::default(),
            params: RunParams::default(),
            options: RecognizeOptions::default(),
        }
    }

    /// Adds a secondary engine tried once when the primary fails or
    /// returns blank output.
    pub fn fallback_recognizer(mut self, secondary: Arc<dyn TextRecognizer>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Replaces the whole pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the structural detection mode.
    pub fn detection_mode(mut self, mode: DetectionMode) -> Self {
        self.config.detector.mode = mode;
        self
    }

    /// Sets the page processing strategy.
    pub fn page_strategy(mut self, strategy: PageStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Sets the run-level constituency parameters.
    pub fn run_params(mut self, params: RunParams) -> Self {
        self.params = params;
        self
    }

    /// Sets the recognition language hint.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.options.language = language.into();
        self
    }

    /// Sets the row grouping tolerance in pixels.
    pub fn row_tolerance(mut self, tolerance: f32) -> Self {
        self.config.rows.tolerance = tolerance;
        self
    }

    /// Replaces the crop configuration.
    pub fn crop(mut self, crop: CropConfig) -> Self {
        self.config.crop = crop;
        self
    }

    /// Enables collection of per-page debug artifacts.
    pub fn debug_artifacts(mut self, enable: bool) -> Self {
        self.config.debug = enable;
        self
    }

    /// Validates the configuration and builds the runtime.
    pub fn build(self) -> Result<RollOcr, OcrError> {
        self.config.validate()?;
        let detector = RegionDetector::new(self.config.detector.clone())?;
        let mut recognizer = FallbackRecognizer::new(self.primary);
        if let Some(secondary) = self.secondary {
            recognizer = recognizer.with_secondary(secondary);
        }
        Ok(RollOcr {
            detector,
            recognizer,
            config: self.config,
            params: self.params,
            options: self.options,
        })
    }
}

/// The extraction runtime: processes one document per invocation,
/// start-to-finish, synchronously. Configuration is immutable after
/// construction, so independent documents may be processed by independent
/// instances (or sequential calls) without interference.
#[derive(Debug)]
pub struct RollOcr {
    detector: RegionDetector,
    recognizer: FallbackRecognizer,
    config: PipelineConfig,
    params: RunParams,
    options: RecognizeOptions,
}

impl RollOcr {
    /// Processes a document's decoded pages into an ordered record
    /// sequence.
    pub fn process(&self, pages: Vec<RgbImage>) -> Result<DocumentResult, OcrError> {
        if pages.is_empty() {
            return Err(OcrError::invalid_input("no pages to process"));
        }

        let page_count = pages.len();
        let mut records = Vec::new();
        let mut artifacts = Vec::new();

        for (index, page) in pages.iter().enumerate() {
            let page_no = index + 1;
            let (page_records, page_artifacts) = match self.config.strategy {
                PageStrategy::Segmented => self.process_segmented(page_no, page),
                PageStrategy::WholePage => self.process_whole_page(page_no, page),
            };
            tracing::info!(
                target: "pipeline",
                page = page_no,
                records = page_records.len(),
                "page processed"
            );
            records.extend(page_records);
            if let Some(page_artifacts) = page_artifacts {
                artifacts.push(page_artifacts);
            }
        }

        if records.is_empty() {
            tracing::info!(target: "pipeline", pages = page_count, "no records found in document");
        }

        Ok(DocumentResult {
            records,
            pages: page_count,
            artifacts,
        })
    }

    /// Segmented shape: detect regions, group rows, recognize each region,
    /// one record per region.
    fn process_segmented(
        &self,
        page_no: usize,
        page: &RgbImage,
    ) -> (Vec<VoterRecord>, Option<PageArtifacts>) {
        let prepared = self.detector.prepare(page);
        let mut regions = self.detector.detect(&prepared.binary);

        if regions.len() < 2 {
            if self.detector.is_blank(&prepared.binary) {
                tracing::info!(target: "pipeline", page = page_no, "blank page, no regions");
                regions.clear();
            } else {
                regions = self.fallback_regions(page_no, &prepared);
            }
        }

        let rows = group_into_rows(&regions, self.config.rows.tolerance);
        let ordered: Vec<Region> = rows.into_iter().flatten().collect();

        let mut records = Vec::with_capacity(ordered.len());
        let mut debug_crops = Vec::new();

        for (index, region) in ordered.iter().enumerate() {
            let block_index = index + 1;
            let recognized = match crop_region(&prepared.image, *region, &self.config.crop) {
                Ok(crop) => {
                    let recognized = self.recognizer.recognize(&crop, &self.options);
                    if self.config.debug {
                        debug_crops.push(crop);
                    }
                    recognized
                }
                Err(err) => {
                    tracing::warn!(
                        target: "pipeline",
                        page = page_no,
                        block = block_index,
                        error = %err,
                        "crop failed, treating block as empty"
                    );
                    RecognizedText::empty()
                }
            };
            records.push(extract_block(
                &recognized.text,
                &self.params,
                page_no,
                block_index,
            ));
        }

        let artifacts = self.config.debug.then(|| PageArtifacts {
            page: page_no,
            overlay: draw_region_overlay(&prepared.image, &ordered),
            crops: debug_crops,
        });

        (records, artifacts)
    }

    /// Whole-page shape: one recognition pass, then line-stream
    /// accumulation keyed on serial-shaped lines.
    fn process_whole_page(
        &self,
        page_no: usize,
        page: &RgbImage,
    ) -> (Vec<VoterRecord>, Option<PageArtifacts>) {
        let recognized = self
            .recognizer
            .recognize(page, &self.options.with_layout(LayoutMode::Block));
        let records = extract_lines(recognized.text.lines(), &self.params, page_no);

        let artifacts = self.config.debug.then(|| {
            let regions = self.detector.regions_from_tokens(&recognized.tokens);
            PageArtifacts {
                page: page_no,
                overlay: draw_region_overlay(page, &regions),
                crops: Vec::new(),
            }
        });

        (records, artifacts)
    }

    /// Fallbacks for a page where structural detection found fewer than
    /// two usable regions: strip split in row-band mode; OCR-position
    /// clustering in grid-cell mode, with strips as the last resort.
    fn fallback_regions(&self, page_no: usize, prepared: &PreparedPage) -> Vec<Region> {
        let (width, height) = prepared.image.dimensions();
        match self.detector.config().mode {
            DetectionMode::RowBand => {
                tracing::warn!(
                    target: "pipeline",
                    page = page_no,
                    "structural detection found too few regions, splitting into strips"
                );
                self.detector.strip_regions(width, height)
            }
            DetectionMode::GridCell => {
                let recognized = self
                    .recognizer
                    .recognize(&prepared.image, &self.options.with_layout(LayoutMode::SparseText));
                let regions = self.detector.regions_from_tokens(&recognized.tokens);
                if regions.is_empty() {
                    tracing::warn!(
                        target: "pipeline",
                        page = page_no,
                        "no OCR token positions available, splitting into strips"
                    );
                    self.detector.strip_regions(width, height)
                } else {
                    tracing::warn!(
                        target: "pipeline",
                        page = page_no,
                        regions = regions.len(),
                        "structural detection found too few regions, using OCR token positions"
                    );
                    regions
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{BinarizeMethod, DetectorConfig};
    use crate::recognize::Token;
    use image::Rgb;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Engine stub: pops scripted outputs in call order, then returns
    /// empty results.
    struct Scripted {
        outputs: Mutex<VecDeque<RecognizedText>>,
    }

    impl Scripted {
        fn new(outputs: impl IntoIterator<Item = RecognizedText>) -> Arc<Self> {
            Arc::new(Self {
                outputs: Mutex::new(outputs.into_iter().collect()),
            })
        }

        fn texts(texts: &[&str]) -> Arc<Self> {
            Self::new(texts.iter().map(|t| RecognizedText::new(*t)))
        }
    }

    impl TextRecognizer for Scripted {
        fn recognize(
            &self,
            _image: &RgbImage,
            _options: &RecognizeOptions,
        ) -> Result<RecognizedText, OcrError> {
            Ok(self
                .outputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn token(text: &str, left: u32, top: u32) -> Token {
        Token {
            text: text.to_string(),
            left,
            top,
            width: 40,
            height: 12,
            confidence: Some(0.9),
        }
    }

    /// White page with three dark text-like bars.
    fn row_listing_page() -> RgbImage {
        let mut img = RgbImage::from_pixel(400, 300, Rgb([245, 245, 245]));
        for top in [40u32, 110, 180] {
            for y in top..top + 20 {
                for x in 30..370 {
                    if x % 25 < 18 {
                        img.put_pixel(x, y, Rgb([15, 15, 15]));
                    }
                }
            }
        }
        img
    }

    /// A page that is not blank but yields no structural regions: a single
    /// small blob below the size filters.
    fn faint_page() -> RgbImage {
        let mut img = RgbImage::from_pixel(200, 200, Rgb([240, 240, 240]));
        for y in 90..102 {
            for x in 90..102 {
                img.put_pixel(x, y, Rgb([20, 20, 20]));
            }
        }
        img
    }

    fn otsu_detector(mode: DetectionMode) -> DetectorConfig {
        DetectorConfig {
            mode,
            binarize: BinarizeMethod::Otsu,
            ..Default::default()
        }
    }

    #[test]
    fn segmented_pipeline_emits_one_record_per_band() {
        let engine = Scripted::texts(&[
            "1 ABC1234567 Son",
            "2 XYZ7654321 Daughter",
            "3 10-20",
        ]);
        let ocr = RollOcrBuilder::new(engine)
            .config(PipelineConfig {
                detector: otsu_detector(DetectionMode::RowBand),
                ..Default::default()
            })
            .run_params(RunParams::new("12", "045"))
            .build()
            .unwrap();

        let result = ocr.process(vec![row_listing_page()]).unwrap();
        assert_eq!(result.records.len(), 3);
        assert_eq!(result.records[0].epic_number, "ABC1234567");
        assert_eq!(result.records[0].relation, "Son");
        assert_eq!(result.records[0].serial_number, "1");
        assert_eq!(result.records[1].epic_number, "XYZ7654321");
        assert_eq!(result.records[2].first_number, "10");
        assert_eq!(result.records[2].last_number, "20");
        // Positional bookkeeping is 1-based and in reading order.
        for (i, record) in result.records.iter().enumerate() {
            assert_eq!(record.page, 1);
            assert_eq!(record.block_index, i + 1);
            assert_eq!(record.ac_number, "12");
        }
    }

    #[test]
    fn row_band_fallback_splits_into_strips() {
        let ocr = RollOcrBuilder::new(Scripted::texts(&[]))
            .config(PipelineConfig {
                detector: otsu_detector(DetectionMode::RowBand),
                ..Default::default()
            })
            .build()
            .unwrap();

        let result = ocr.process(vec![faint_page()]).unwrap();
        // Ten strips, each emitting a (possibly all-empty) record.
        assert_eq!(result.records.len(), 10);
        assert!(result.records.iter().all(|r| !r.has_extracted_fields()));
    }

    #[test]
    fn grid_cell_fallback_uses_token_positions() {
        let whole_page = RecognizedText {
            text: "12 XY1234567".to_string(),
            tokens: vec![token("12", 10, 100), token("XY1234567", 80, 102)],
        };
        let engine = Scripted::new([
            whole_page,
            RecognizedText::new("12"),
            RecognizedText::new("XY1234567"),
        ]);
        let ocr = RollOcrBuilder::new(engine)
            .config(PipelineConfig {
                detector: DetectorConfig {
                    token_bucket_width: 50,
                    ..otsu_detector(DetectionMode::GridCell)
                },
                ..Default::default()
            })
            .build()
            .unwrap();

        let result = ocr.process(vec![faint_page()]).unwrap();
        // Two token buckets become two regions become two records.
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].serial_number, "12");
        assert_eq!(result.records[1].epic_number, "XY1234567");
    }

    #[test]
    fn blank_page_produces_no_records_and_no_error() {
        let ocr = RollOcrBuilder::new(Scripted::texts(&[]))
            .build()
            .unwrap();
        let blank = RgbImage::from_pixel(200, 200, Rgb([240, 240, 240]));
        let result = ocr.process(vec![blank]).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.pages, 1);
    }

    #[test]
    fn whole_page_strategy_accumulates_by_serial() {
        let engine =
            Scripted::texts(&["12\nOR/02/009/22647\nA Son 04/345\n13\nXY1234567"]);
        let ocr = RollOcrBuilder::new(engine)
            .page_strategy(PageStrategy::WholePage)
            .run_params(RunParams::new("02", "009"))
            .build()
            .unwrap();

        let result = ocr.process(vec![faint_page()]).unwrap();
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].epic_number, "OR/02/009/22647");
        assert_eq!(result.records[0].old_part_serial, "04/345");
        assert_eq!(result.records[1].serial_number, "13");
    }

    #[test]
    fn debug_artifacts_are_collected_when_enabled() {
        let engine = Scripted::texts(&["a", "b", "c"]);
        let ocr = RollOcrBuilder::new(engine)
            .config(PipelineConfig {
                detector: otsu_detector(DetectionMode::RowBand),
                debug: true,
                ..Default::default()
            })
            .build()
            .unwrap();

        let page = row_listing_page();
        let (width, height) = page.dimensions();
        let result = ocr.process(vec![page]).unwrap();
        assert_eq!(result.artifacts.len(), 1);
        let artifacts = &result.artifacts[0];
        assert_eq!(artifacts.page, 1);
        assert_eq!(artifacts.overlay.dimensions(), (width, height));
        assert_eq!(artifacts.crops.len(), result.records.len());
    }

    #[test]
    fn debug_artifacts_are_absent_by_default() {
        let ocr = RollOcrBuilder::new(Scripted::texts(&["x"]))
            .config(PipelineConfig {
                detector: otsu_detector(DetectionMode::RowBand),
                ..Default::default()
            })
            .build()
            .unwrap();
        let result = ocr.process(vec![row_listing_page()]).unwrap();
        assert!(result.artifacts.is_empty());
    }

    #[test]
    fn empty_page_list_is_invalid_input() {
        let ocr = RollOcrBuilder::new(Scripted::texts(&[])).build().unwrap();
        assert!(matches!(
            ocr.process(Vec::new()),
            Err(OcrError::InvalidInput { .. })
        ));
    }

    #[test]
    fn multi_page_documents_number_pages_from_one() {
        let engine = Scripted::texts(&["12\nABC1234567", "44\nXYZ7654321"]);
        let ocr = RollOcrBuilder::new(engine)
            .page_strategy(PageStrategy::WholePage)
            .build()
            .unwrap();
        let result = ocr
            .process(vec![faint_page(), faint_page()])
            .unwrap();
        assert_eq!(result.pages, 2);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].page, 1);
        assert_eq!(result.records[1].page, 2);
    }

    #[test]
    fn result_rows_match_headers() {
        let engine = Scripted::texts(&["12\nABC1234567"]);
        let ocr = RollOcrBuilder::new(engine)
            .page_strategy(PageStrategy::WholePage)
            .build()
            .unwrap();
        let result = ocr.process(vec![faint_page()]).unwrap();
        for row in result.rows() {
            assert_eq!(row.len(), DocumentResult::headers().len());
        }
    }

    #[test]
    fn invalid_config_fails_at_build() {
        let builder = RollOcrBuilder::new(Scripted::texts(&[])).row_tolerance(0.0);
        assert!(builder.build().is_err());
    }
}
