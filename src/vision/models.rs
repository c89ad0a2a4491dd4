//! Detection and recognition capabilities
//!
//! The OCR models behind these traits are expensive to build, so they are
//! constructed once at process startup, wrapped in [`OcrCapabilities`], and
//! handed to every [`crate::vision::MenuPipeline`] that needs them.

use std::fmt;
use std::sync::Arc;

use super::detection::RegionDetector;
use super::ocr::TextRecognizer;

/// Process-wide, read-only handles to the detector and recognizer
#[derive(Clone)]
pub struct OcrCapabilities {
    detector: Arc<dyn RegionDetector>,
    recognizer: Arc<dyn TextRecognizer>,
}

impl OcrCapabilities {
    /// Bundle a detector and a recognizer
    pub fn new(detector: Arc<dyn RegionDetector>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            detector,
            recognizer,
        }
    }

    /// Use one backend for both detection and recognition
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: RegionDetector + TextRecognizer + 'static,
    {
        Self {
            detector: backend.clone(),
            recognizer: backend,
        }
    }

    pub fn detector(&self) -> &dyn RegionDetector {
        self.detector.as_ref()
    }

    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.recognizer.as_ref()
    }
}

impl fmt::Debug for OcrCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrCapabilities").finish_non_exhaustive()
    }
}
