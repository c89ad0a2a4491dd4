//! OCR (Optical Character Recognition) module
//!
//! Runs a [`TextRecognizer`] over every detected region. Regions are
//! independent, so a failure in one is logged and the region is dropped
//! without affecting the others. A panicking recognizer counts as a failure.

use anyhow::Result;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

use super::detection::BoundingBox;
use super::preprocess::PixelGrid;
use super::TextFragment;

/// Reads the text inside one region of the image.
///
/// `region` is always clipped to the image bounds and non-degenerate.
/// Implementations may use [`PixelGrid::crop`] to get at the pixels.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &PixelGrid, region: &BoundingBox) -> Result<String>;
}

impl<F> TextRecognizer for F
where
    F: Fn(&PixelGrid, &BoundingBox) -> Result<String> + Send + Sync,
{
    fn recognize(&self, image: &PixelGrid, region: &BoundingBox) -> Result<String> {
        self(image, region)
    }
}

/// Recognize every region and return the non-empty fragments.
///
/// Fragments come back in the same order as `regions`, whether or not
/// recognition runs in parallel.
pub fn recognize_regions(
    recognizer: &dyn TextRecognizer,
    image: &PixelGrid,
    regions: &[BoundingBox],
    parallel: bool,
) -> Vec<TextFragment> {
    info!("Running OCR on {} regions...", regions.len());

    let recognize_one =
        |(index, region): (usize, &BoundingBox)| recognize_region(recognizer, image, index, region);

    let results: Vec<Option<TextFragment>> = if parallel {
        regions.par_iter().enumerate().map(recognize_one).collect()
    } else {
        regions.iter().enumerate().map(recognize_one).collect()
    };

    let fragments: Vec<TextFragment> = results.into_iter().flatten().collect();

    info!(
        "OCR completed. Recognized text for {}/{} regions.",
        fragments.len(),
        regions.len()
    );

    fragments
}

fn recognize_region(
    recognizer: &dyn TextRecognizer,
    image: &PixelGrid,
    index: usize,
    region: &BoundingBox,
) -> Option<TextFragment> {
    let Some(bbox) = region.clip_to(image.width(), image.height()) else {
        debug!("Invalid crop for region {}: {:?}", index, region);
        return None;
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| recognizer.recognize(image, &bbox)));

    match outcome {
        Ok(Ok(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            debug!("OCR region {}: {:?}", index, text);
            Some(TextFragment::new(bbox, text))
        }
        Ok(Err(e)) => {
            warn!("OCR failed for region {}: {:#}", index, e);
            None
        }
        Err(_) => {
            warn!("OCR panicked for region {}", index);
            None
        }
    }
}
