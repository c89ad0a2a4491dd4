//! menu-vision - structured menus from restaurant menu photos
//!
//! Decodes a menu photo, asks an OCR backend for text regions and their
//! text, then classifies and merges those fragments into an ordered list of
//! [`MenuItem`]s grouped by section.

pub mod config;
pub mod menu;
pub mod storage;
pub mod vision;

pub use menu::{MenuItem, MenuResponse};
pub use vision::{MenuPipeline, OcrCapabilities, VisionError};
