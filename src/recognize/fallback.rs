//! Retry-once fallback across recognition backends.

use std::sync::Arc;

use image::RgbImage;

use crate::recognize::{RecognizeOptions, RecognizedText, TextRecognizer};

/// Wraps a primary recognizer and an optional secondary one.
///
/// When the primary errors or returns blank output, the secondary is tried
/// once; when that also fails, the result is empty text. Extraction always
/// receives a defined (possibly empty) [`RecognizedText`], so a flaky
/// engine can never abort a document run.
pub struct FallbackRecognizer {
    primary: Arc<dyn TextRecognizer>,
    secondary: Option<Arc<dyn TextRecognizer>>,
}

impl std::fmt::Debug for FallbackRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackRecognizer")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl FallbackRecognizer {
    /// Creates a wrapper with only a primary engine.
    pub fn new(primary: Arc<dyn TextRecognizer>) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Adds a secondary engine tried when the primary fails.
    pub fn with_secondary(mut self, secondary: Arc<dyn TextRecognizer>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Recognizes text, applying the fallback policy. Never fails.
    pub fn recognize(&self, image: &RgbImage, options: &RecognizeOptions) -> RecognizedText {
        match self.attempt(&*self.primary, image, options) {
            Some(result) => result,
            None => {
                let Some(ref secondary) = self.secondary else {
                    return RecognizedText::empty();
                };
                self.attempt(&**secondary, image, options)
                    .unwrap_or_else(RecognizedText::empty)
            }
        }
    }

    fn attempt(
        &self,
        engine: &dyn TextRecognizer,
        image: &RgbImage,
        options: &RecognizeOptions,
    ) -> Option<RecognizedText> {
        match engine.recognize(image, options) {
            Ok(result) if !result.is_blank() => Some(result.sanitized()),
            Ok(_) => {
                tracing::debug!(
                    target: "recognize",
                    engine = engine.name(),
                    "engine returned blank output"
                );
                None
            }
            Err(err) => {
                tracing::warn!(
                    target: "recognize",
                    engine = engine.name(),
                    error = %err,
                    "recognition failed"
                );
                None
            }
        }
    }
}
