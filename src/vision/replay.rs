//! Recorded OCR backend
//!
//! Replays detector polygons and recognized text captured from a real OCR
//! run. Useful for reproducing a merge problem from a customer photo without
//! shipping the models.
//!
//! Recording format:
//!
//! ```json
//! { "regions": [ { "polygon": [[10, 8], [220, 8], [220, 40], [10, 40]], "text": "MAINS" } ] }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::detection::{polygon_to_bounds, BoundingBox, Polygon, RegionDetector};
use super::ocr::TextRecognizer;
use super::preprocess::PixelGrid;

/// One recorded region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedRegion {
    /// Detector polygon
    pub polygon: Polygon,
    /// Text the recognizer returned for it
    #[serde(default)]
    pub text: String,
}

/// A full recording for one image
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedOcr {
    pub regions: Vec<RecordedRegion>,
}

impl RecordedOcr {
    pub fn new(regions: Vec<RecordedRegion>) -> Self {
        Self { regions }
    }

    /// Parse a recording from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid OCR recording")
    }

    /// Load a recording from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read OCR recording: {:?}", path))?;
        let recording = Self::from_json(&content)?;
        info!(
            "Loaded OCR recording with {} regions from {:?}",
            recording.regions.len(),
            path
        );
        Ok(recording)
    }
}

impl RegionDetector for RecordedOcr {
    fn detect(&self, _image: &PixelGrid) -> Result<Vec<Polygon>> {
        Ok(self.regions.iter().map(|r| r.polygon.clone()).collect())
    }
}

impl TextRecognizer for RecordedOcr {
    fn recognize(&self, image: &PixelGrid, region: &BoundingBox) -> Result<String> {
        let (width, height) = image.dimensions();
        let text = self
            .regions
            .iter()
            .find(|r| polygon_to_bounds(&r.polygon, width, height).as_ref() == Some(region))
            .map(|r| r.text.clone())
            .unwrap_or_default();
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    const RECORDING: &str = r#"{
        "regions": [
            { "polygon": [[0, 0], [50, 0], [50, 10], [0, 10]], "text": "MAINS" },
            { "polygon": [[0, 20], [80, 20], [80, 30], [0, 30]], "text": "Burger 22" },
            { "polygon": [[0, 40], [10, 40], [10, 40]] }
        ]
    }"#;

    fn grid() -> PixelGrid {
        PixelGrid::new(DynamicImage::ImageRgb8(RgbImage::new(100, 100)))
    }

    #[test]
    fn test_parse_recording() {
        let recording = RecordedOcr::from_json(RECORDING).unwrap();
        assert_eq!(recording.regions.len(), 3);
        assert_eq!(recording.regions[2].text, "");
    }

    #[test]
    fn test_replays_polygons_and_text() {
        let recording = RecordedOcr::from_json(RECORDING).unwrap();
        let image = grid();

        assert_eq!(recording.detect(&image).unwrap().len(), 3);
        let text = recording
            .recognize(&image, &BoundingBox::new(0, 20, 80, 30))
            .unwrap();
        assert_eq!(text, "Burger 22");
    }

    #[test]
    fn test_unknown_region_reads_as_empty() {
        let recording = RecordedOcr::from_json(RECORDING).unwrap();
        let text = recording
            .recognize(&grid(), &BoundingBox::new(1, 1, 2, 2))
            .unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_invalid_recording() {
        assert!(RecordedOcr::from_json("{\"regions\": 3}").is_err());
    }
}
