//! Block segmentation and field extraction for scanned voter-roll pages.
//!
//! This crate implements the algorithmic core of a voter-roll digitization
//! pipeline: it locates candidate text regions on a decoded page image,
//! clusters them into reading-order rows, hands each region to a pluggable
//! text-recognition capability, and parses the recognized text into a fixed
//! record schema suitable for tabular export.
//!
//! The pipeline runs in three stages per page:
//!
//! 1. **Region detection** ([`detect`]) - morphological image operations
//!    locate table cells or row bands, with strip-split and OCR-position
//!    fallbacks for pages where structural detection fails.
//! 2. **Text recognition** ([`recognize`]) - each region crop is passed to
//!    an external recognizer behind the [`TextRecognizer`] trait, with a
//!    retry-once fallback chain.
//! 3. **Field extraction** ([`extract`]) - regex and heuristic rules turn
//!    recognized text into [`VoterRecord`]s, either one per region or by
//!    accumulating across a whole-page line stream.
//!
//! Page rasterization (PDF decoding), transport, and spreadsheet writing
//! are collaborator concerns; callers supply decoded [`image::RgbImage`]
//! pages and receive an ordered sequence of records back.
//!
//! # Example
//!
//! ```no_run
//! use roll_ocr::{RollOcrBuilder, RunParams, TextRecognizer};
//! use std::sync::Arc;
//!
//! # fn recognizer() -> Arc<dyn TextRecognizer> { unimplemented!() }
//! # fn main() -> Result<(), roll_ocr::OcrError> {
//! let ocr = RollOcrBuilder::new(recognizer())
//!     .run_params(RunParams::new("12", "045"))
//!     .build()?;
//!
//! let page = roll_ocr::utils::load_image("roll-page-1.png".as_ref())?;
//! let result = ocr.process(vec![page])?;
//! for record in &result.records {
//!     println!("{:?}", record.to_row());
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod detect;
pub mod extract;
pub mod pipeline;
pub mod processors;
pub mod recognize;
pub mod utils;

pub use crate::core::config::{
    BinarizeMethod, CropConfig, DetectionMode, DetectorConfig, PageStrategy, PipelineConfig,
    RowGroupConfig, RunParams,
};
pub use crate::core::errors::{OcrError, ProcessingStage};
pub use crate::detect::RegionDetector;
pub use crate::extract::record::{RECORD_COLUMNS, VoterRecord};
pub use crate::pipeline::{DocumentResult, PageArtifacts, RollOcr, RollOcrBuilder};
pub use crate::processors::geometry::Region;
pub use crate::recognize::{
    FallbackRecognizer, LayoutMode, RecognizeOptions, RecognizedText, TextRecognizer, Token,
};
