//! Image codec module
//!
//! Provides the decode, resample and encode steps around the watermark
//! stage:
//! - Header probing and full decoding (JPEG, PNG, GIF)
//! - Lanczos3 resampling for watermark overlays
//! - Encoders for the original formats and lossy WebP with alpha
//!
//! # Output Paths
//!
//! WebP output is written next to the source with the extension swapped:
//! ```text
//! /uploads/2024/05/photo.JPG -> /uploads/2024/05/photo.webp
//! ```

// Core modules
pub mod encoder;
pub mod error;
pub mod format;
pub mod processor;

// Re-export commonly used types
pub use encoder::{
    convert_to_webp, save_in_format, EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder,
    RESAVE_JPEG_QUALITY,
};
pub use error::ImageError;
pub use format::{webp_path_for, RasterFormat};
pub use processor::{decode_file, probe_file, resize_rgba, ImageProbe};
