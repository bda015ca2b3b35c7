//! The recognizer seam.
//!
//! Text recognition is an external capability: the pipeline only depends
//! on the [`TextRecognizer`] trait, which every backend (offline engine,
//! cloud vision API, document-conversion service) implements with a single
//! `recognize` method. The retry-once fallback policy lives in
//! [`FallbackRecognizer`], not at the call sites.

pub mod fallback;

pub use fallback::FallbackRecognizer;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::core::errors::OcrError;

/// Layout assumption passed to the recognition engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// The crop contains a single line of text.
    SingleLine,
    /// The crop contains a uniform block of text.
    #[default]
    Block,
    /// Text is sparse and may appear anywhere in the crop.
    SparseText,
}

/// Per-call options for a recognition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizeOptions {
    /// Target language hint, e.g. `"eng+ori"`.
    pub language: String,
    /// Layout assumption for the engine's segmentation.
    pub layout: LayoutMode,
}

impl Default for RecognizeOptions {
    fn default() -> Self {
        Self {
            language: "eng+ori".to_string(),
            layout: LayoutMode::Block,
        }
    }
}

impl RecognizeOptions {
    /// Returns a copy of the options with a different layout assumption.
    pub fn with_layout(&self, layout: LayoutMode) -> Self {
        Self {
            language: self.language.clone(),
            layout,
        }
    }
}

/// One recognized word with its position in the recognized image.
///
/// Engines that cannot report word geometry simply return no tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The word text.
    pub text: String,
    /// Left edge in pixels of the recognized image.
    pub left: u32,
    /// Top edge in pixels.
    pub top: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Engine confidence. `None` means the engine reported no score; such
    /// tokens are dropped by [`RecognizedText::sanitized`].
    pub confidence: Option<f32>,
}

/// Output of one recognition call: plain text plus optional word tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    /// The recognized text, possibly multi-line.
    pub text: String,
    /// Word-level tokens when the engine provides them, empty otherwise.
    pub tokens: Vec<Token>,
}

impl RecognizedText {
    /// Creates a text-only result.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens: Vec::new(),
        }
    }

    /// Creates an empty result, used when recognition fails outright.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the text is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Returns the result with unusable tokens removed: empty token text
    /// or a missing confidence score.
    pub fn sanitized(mut self) -> Self {
        self.tokens
            .retain(|t| !t.text.trim().is_empty() && t.confidence.is_some());
        self
    }
}

/// An external text-recognition capability.
///
/// Implementations must be callable per region crop and for a whole page.
/// Total failure should be reported as an error; the pipeline's fallback
/// wrapper converts it into an empty result rather than aborting the run.
pub trait TextRecognizer: Send + Sync {
    /// Recognizes text in the given pixel region.
    fn recognize(
        &self,
        image: &RgbImage,
        options: &RecognizeOptions,
    ) -> Result<RecognizedText, OcrError>;

    /// Engine name used in logs.
    fn name(&self) -> &str {
        "recognizer"
    }
}
