//! Text region detection
//!
//! Detection itself is delegated to a [`RegionDetector`] capability. This
//! module turns the detector's raw polygons into axis-aligned boxes clipped
//! to the image, and drops the ones that end up degenerate.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::preprocess::PixelGrid;

/// Polygon points in image-pixel space, as emitted by a detector
pub type Polygon = Vec<(f32, f32)>;

/// Axis-aligned box in image-pixel coordinates.
///
/// `x2`/`y2` are exclusive. A valid box has `x1 < x2` and `y1 < y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Whether the box encloses at least one pixel
    pub fn is_valid(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Clip to an image of the given size, `None` if nothing is left
    pub fn clip_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        let clipped = BoundingBox {
            x1: self.x1.min(width),
            y1: self.y1.min(height),
            x2: self.x2.min(width),
            y2: self.y2.min(height),
        };
        clipped.is_valid().then_some(clipped)
    }
}

/// Source of raw text-region polygons.
///
/// Implementations are built once at startup and shared across requests, so
/// they take `&self` and must not keep per-request state.
pub trait RegionDetector: Send + Sync {
    fn detect(&self, image: &PixelGrid) -> Result<Vec<Polygon>>;
}

impl<F> RegionDetector for F
where
    F: Fn(&PixelGrid) -> Result<Vec<Polygon>> + Send + Sync,
{
    fn detect(&self, image: &PixelGrid) -> Result<Vec<Polygon>> {
        self(image)
    }
}

/// Convert polygon points to a bounding box clipped to `width` x `height`.
///
/// Returns `None` for polygons with fewer than three points, non-finite
/// coordinates, or a degenerate clipped box.
pub fn polygon_to_bounds(polygon: &[(f32, f32)], width: u32, height: u32) -> Option<BoundingBox> {
    if polygon.len() < 3 {
        return None;
    }
    if polygon.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return None;
    }

    let min_x = polygon.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
    let min_y = polygon.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
    let max_x = polygon.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
    let max_y = polygon.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);

    let clamp = |v: f32, limit: u32| v.max(0.0).min(limit as f32) as u32;

    let bbox = BoundingBox {
        x1: clamp(min_x.floor(), width),
        y1: clamp(min_y.floor(), height),
        x2: clamp(max_x.ceil(), width),
        y2: clamp(max_y.ceil(), height),
    };

    bbox.is_valid().then_some(bbox)
}

/// Run the detector and keep the usable boxes, in detector emission order.
///
/// Never fails: a detector error yields no regions.
pub fn detect_regions(detector: &dyn RegionDetector, image: &PixelGrid) -> Vec<BoundingBox> {
    let polygons = match detector.detect(image) {
        Ok(polygons) => polygons,
        Err(e) => {
            warn!("Region detection failed: {:#}", e);
            return Vec::new();
        }
    };

    let (width, height) = image.dimensions();
    let total = polygons.len();

    let boxes: Vec<BoundingBox> = polygons
        .iter()
        .filter_map(|polygon| {
            let bbox = polygon_to_bounds(polygon, width, height);
            if bbox.is_none() {
                debug!("Rejected region polygon {:?}", polygon);
            }
            bbox
        })
        .collect();

    info!(
        "Region detection: {} regions accepted, {} rejected",
        boxes.len(),
        total - boxes.len()
    );

    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn grid(width: u32, height: u32) -> PixelGrid {
        PixelGrid::new(DynamicImage::ImageRgb8(RgbImage::new(width, height)))
    }

    fn rect(x1: f32, y1: f32, x2: f32, y2: f32) -> Polygon {
        vec![(x1, y1), (x2, y1), (x2, y2), (x1, y2)]
    }

    #[test]
    fn test_polygon_to_bounds() {
        let polygon = vec![(10.2, 5.0), (50.0, 4.6), (49.5, 20.1), (9.9, 20.0)];
        let bbox = polygon_to_bounds(&polygon, 100, 100).unwrap();
        assert_eq!(bbox, BoundingBox::new(9, 4, 50, 21));
    }

    #[test]
    fn test_polygon_clipped_to_image() {
        let bbox = polygon_to_bounds(&rect(-5.0, -3.0, 150.0, 30.0), 100, 50).unwrap();
        assert_eq!(bbox, BoundingBox::new(0, 0, 100, 30));
    }

    #[test]
    fn test_degenerate_polygons_rejected() {
        // Flat line
        assert!(polygon_to_bounds(&rect(10.0, 10.0, 40.0, 10.0), 100, 100).is_none());
        // Entirely outside the image
        assert!(polygon_to_bounds(&rect(120.0, 10.0, 140.0, 20.0), 100, 100).is_none());
        // Too few points
        assert!(polygon_to_bounds(&[(0.0, 0.0), (10.0, 10.0)], 100, 100).is_none());
        // Non-finite coordinates
        assert!(polygon_to_bounds(&rect(f32::NAN, 0.0, 10.0, 10.0), 100, 100).is_none());
    }

    #[test]
    fn test_clip_to() {
        let bbox = BoundingBox::new(90, 10, 120, 20);
        assert_eq!(bbox.clip_to(100, 100), Some(BoundingBox::new(90, 10, 100, 20)));
        assert_eq!(bbox.clip_to(80, 100), None);
    }

    #[test]
    fn test_detect_regions_keeps_emission_order() {
        let detector = |_: &PixelGrid| -> Result<Vec<Polygon>> {
            Ok(vec![
                rect(0.0, 50.0, 10.0, 60.0),
                rect(5.0, 5.0, 5.0, 9.0),
                rect(0.0, 10.0, 10.0, 20.0),
            ])
        };

        let boxes = detect_regions(&detector, &grid(100, 100));
        assert_eq!(
            boxes,
            vec![BoundingBox::new(0, 50, 10, 60), BoundingBox::new(0, 10, 10, 20)]
        );
    }

    #[test]
    fn test_detector_failure_yields_no_regions() {
        let detector =
            |_: &PixelGrid| -> Result<Vec<Polygon>> { Err(anyhow::anyhow!("model exploded")) };

        assert!(detect_regions(&detector, &grid(10, 10)).is_empty());
    }
}
