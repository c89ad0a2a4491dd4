//! Vision Layer
//!
//! Takes an uploaded menu photo through decode, region detection, region
//! recognition and fragment merging. Detection and recognition are supplied
//! by the caller through [`OcrCapabilities`]; everything else lives here.

pub mod detection;
pub mod error;
pub mod models;
pub mod ocr;
pub mod preprocess;
pub mod replay;

pub use detection::{detect_regions, polygon_to_bounds, BoundingBox, Polygon, RegionDetector};
pub use error::VisionError;
pub use models::OcrCapabilities;
pub use ocr::{recognize_regions, TextRecognizer};
pub use preprocess::{normalize_image, PixelGrid, PreprocessConfig};
pub use replay::{RecordedOcr, RecordedRegion};

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::VisionSettings;
use crate::menu::{MenuItem, MenuResponse, MergeEvent, Merger};

/// Recognized text with the region it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Region in image-pixel coordinates
    pub bbox: BoundingBox,
    /// Recognized text
    pub text: String,
}

impl TextFragment {
    pub fn new(bbox: BoundingBox, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
        }
    }

    /// Whether the fragment can be merged: a non-degenerate box and some text
    pub fn is_usable(&self) -> bool {
        self.bbox.is_valid() && !self.text.trim().is_empty()
    }

    /// Keep only usable fragments, logging each one that is dropped
    pub fn retain_usable(fragments: Vec<TextFragment>) -> Vec<TextFragment> {
        fragments
            .into_iter()
            .filter(|fragment| {
                let usable = fragment.is_usable();
                if !usable {
                    warn!("Dropping unusable fragment: {:?}", fragment);
                }
                usable
            })
            .collect()
    }
}

/// Configuration for the vision pipeline
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Decode-time preprocessing
    pub preprocess: PreprocessConfig,
    /// Recognize regions on the rayon thread pool
    pub parallel_recognition: bool,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            parallel_recognition: true,
        }
    }
}

impl From<&VisionSettings> for VisionConfig {
    fn from(settings: &VisionSettings) -> Self {
        Self {
            preprocess: PreprocessConfig {
                grayscale: settings.grayscale,
                enhance_contrast: settings.enhance_contrast,
            },
            parallel_recognition: settings.parallel_recognition,
        }
    }
}

/// Menu extraction pipeline.
///
/// Holds no per-request state, so one instance can serve concurrent callers.
pub struct MenuPipeline {
    capabilities: OcrCapabilities,
    config: VisionConfig,
    merger: Merger,
}

impl MenuPipeline {
    /// Create a pipeline with default configuration
    pub fn new(capabilities: OcrCapabilities) -> Self {
        Self::with_config(capabilities, VisionConfig::default())
    }

    /// Create a pipeline with custom configuration
    pub fn with_config(capabilities: OcrCapabilities, config: VisionConfig) -> Self {
        Self {
            capabilities,
            config,
            merger: Merger::new(),
        }
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Extract the structured menu from raw image bytes.
    ///
    /// Fails only when the bytes cannot be decoded; an unreadable menu
    /// yields an empty response.
    pub fn extract_menu(&self, image_bytes: &[u8]) -> Result<MenuResponse, VisionError> {
        Ok(self.process(image_bytes)?.into_response())
    }

    /// Run every stage and keep the intermediate counts and merge trace
    pub fn process(&self, image_bytes: &[u8]) -> Result<PipelineResult, VisionError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("extract_menu", request_id = %request_id);
        let _guard = span.enter();

        let start = Instant::now();

        let image = normalize_image(image_bytes, &self.config.preprocess)?;

        let regions = detect_regions(self.capabilities.detector(), &image);

        let fragments = recognize_regions(
            self.capabilities.recognizer(),
            &image,
            &regions,
            self.config.parallel_recognition,
        );

        let outcome = self.merger.merge_traced(&fragments);
        if outcome.items.is_empty() {
            info!("No menu items extracted");
        }

        let processing_time = start.elapsed();
        debug!(
            "Menu extraction complete in {:?}: {} regions, {} fragments, {} items",
            processing_time,
            regions.len(),
            fragments.len(),
            outcome.items.len()
        );

        Ok(PipelineResult {
            items: outcome.items,
            events: outcome.events,
            regions_detected: regions.len(),
            fragments_recognized: fragments.len(),
            processing_time_ms: processing_time.as_millis() as u64,
        })
    }
}

/// Result of running the pipeline on one image
#[derive(Debug)]
pub struct PipelineResult {
    /// Extracted menu items in top-to-bottom order
    pub items: Vec<MenuItem>,
    /// Merge decisions, one per fragment
    pub events: Vec<MergeEvent>,
    /// Regions that survived box validation
    pub regions_detected: usize,
    /// Regions that produced non-empty text
    pub fragments_recognized: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl PipelineResult {
    pub fn into_response(self) -> MenuResponse {
        MenuResponse::new(self.items)
    }
}
