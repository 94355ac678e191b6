//! Watermark error types.
//!
//! None of these abort the pipeline. The renderer logs them and leaves the
//! base image as it was (or falls back to the bitmap font).

use std::fmt;

/// Errors that can occur during watermark processing.
#[derive(Debug)]
pub enum WatermarkError {
    /// Overlay image path missing or undecodable
    OverlayUnavailable(String),

    /// Scalable font file absent or unparseable
    FontUnavailable(String),

    /// Color string is not 3 or 6 hex digits
    InvalidColor(String),

    /// Failed to render or resize the overlay
    RenderError(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverlayUnavailable(msg) => write!(f, "Watermark image unavailable: {}", msg),
            Self::FontUnavailable(msg) => write!(f, "Watermark font unavailable: {}", msg),
            Self::InvalidColor(value) => write!(f, "Invalid hex color '{}'", value),
            Self::RenderError(msg) => write!(f, "Failed to render watermark: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}
