//! Error types for the extraction pipeline.
//!
//! A failed page decode aborts a document run; everything downstream of
//! decoding degrades softly (fallback detection, empty recognition results,
//! empty record fields) and is reported through [`tracing`] rather than
//! through the error channel.

use thiserror::Error;

/// Pipeline stage in which a processing error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Grayscale conversion, blurring, or thresholding.
    Binarization,
    /// Structuring-element operations on the binary mask.
    Morphology,
    /// Contour tracing and bounding-box extraction.
    RegionDetection,
    /// Row clustering of detected regions.
    RowGrouping,
    /// Region cropping and pre-recognition scaling.
    Cropping,
    /// Text recognition via an external engine.
    Recognition,
    /// Field extraction from recognized text.
    Extraction,
    /// Top-level pipeline orchestration.
    PipelineExecution,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Binarization => write!(f, "binarization"),
            ProcessingStage::Morphology => write!(f, "morphology"),
            ProcessingStage::RegionDetection => write!(f, "region detection"),
            ProcessingStage::RowGrouping => write!(f, "row grouping"),
            ProcessingStage::Cropping => write!(f, "cropping"),
            ProcessingStage::Recognition => write!(f, "recognition"),
            ProcessingStage::Extraction => write!(f, "extraction"),
            ProcessingStage::PipelineExecution => write!(f, "pipeline execution"),
        }
    }
}

/// Errors surfaced by the extraction pipeline.
#[derive(Debug, Error)]
pub enum OcrError {
    /// A page image failed to decode. This is the one unrecoverable input
    /// error: the whole document run fails with no partial output.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// A processing step failed.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage that failed.
        stage: ProcessingStage,
        /// What was being processed when the failure occurred.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An external recognition engine reported a failure.
    ///
    /// Callers inside the pipeline catch this at the adapter boundary and
    /// fall back to the secondary engine or to empty text; it only escapes
    /// when a recognizer is invoked directly.
    #[error("recognition failed in engine '{engine}': {context}")]
    Recognition {
        /// Name of the engine that failed.
        engine: String,
        /// Additional context about the failure.
        context: String,
    },

    /// The caller supplied invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// A configuration value is out of range or inconsistent.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration problem.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for OcrError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl OcrError {
    /// Creates a processing error with stage and context.
    pub fn processing(
        stage: ProcessingStage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            stage,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a recognition error for the named engine.
    pub fn recognition(engine: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Recognition {
            engine: engine.into(),
            context: context.into(),
        }
    }

    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error for an invalid field value.
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::Config {
            message: format!(
                "invalid value for field '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual
            ),
        }
    }
}
