//! Error types for the vision pipeline
//!
//! Only image decoding can fail a request. Everything after the pixel grid
//! exists is isolated per region or per fragment and never surfaces here.

use thiserror::Error;

/// Fatal errors raised by [`crate::vision::MenuPipeline`]
#[derive(Error, Debug)]
pub enum VisionError {
    /// The uploaded bytes could not be decoded as a raster image
    #[error("failed to decode image data")]
    Decode(#[from] image::ImageError),

    /// No bytes were supplied at all
    #[error("image data is empty")]
    EmptyInput,
}

impl VisionError {
    /// Whether this error was caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, VisionError::Decode(_) | VisionError::EmptyInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_errors_are_client_errors() {
        let err = image::load_from_memory(b"not an image").unwrap_err();
        let err = VisionError::from(err);
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "failed to decode image data");
    }

    #[test]
    fn test_empty_input_is_client_error() {
        assert!(VisionError::EmptyInput.is_client_error());
    }
}
