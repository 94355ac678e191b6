//! Raster formats handled by the pipeline
//!
//! Sources are recognized by extension against a fixed allow-list (JPEG,
//! PNG, GIF). WebP is an output-only format.

use std::path::{Path, PathBuf};

use super::error::ImageError;

/// An image format the pipeline reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl RasterFormat {
    /// Source format for an extension on the allow-list (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(RasterFormat::Jpeg),
            "png" => Some(RasterFormat::Png),
            "gif" => Some(RasterFormat::Gif),
            _ => None,
        }
    }

    /// Source format for a path, or `None` if it is not a processable image
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Map a format detected from file contents
    pub fn from_image_format(format: image::ImageFormat) -> Result<Self, ImageError> {
        match format {
            image::ImageFormat::Jpeg => Ok(RasterFormat::Jpeg),
            image::ImageFormat::Png => Ok(RasterFormat::Png),
            image::ImageFormat::Gif => Ok(RasterFormat::Gif),
            image::ImageFormat::WebP => Ok(RasterFormat::WebP),
            other => Err(ImageError::unsupported_format(format!("{:?}", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RasterFormat::Jpeg => "jpeg",
            RasterFormat::Png => "png",
            RasterFormat::Gif => "gif",
            RasterFormat::WebP => "webp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            RasterFormat::Jpeg => "image/jpeg",
            RasterFormat::Png => "image/png",
            RasterFormat::Gif => "image/gif",
            RasterFormat::WebP => "image/webp",
        }
    }

    /// Extension written for this format, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Jpeg => "jpg",
            RasterFormat::Png => "png",
            RasterFormat::Gif => "gif",
            RasterFormat::WebP => "webp",
        }
    }

    pub fn supports_transparency(&self) -> bool {
        !matches!(self, RasterFormat::Jpeg)
    }
}

/// Sibling path with the source extension swapped for `.webp`
///
/// Returns `None` when the path does not end in an allow-listed extension.
///
/// ```
/// use std::path::Path;
/// use imgmark::image_optimizer::format::webp_path_for;
///
/// let out = webp_path_for(Path::new("/uploads/2024/photo.JPG")).unwrap();
/// assert_eq!(out, Path::new("/uploads/2024/photo.webp"));
/// ```
pub fn webp_path_for(path: &Path) -> Option<PathBuf> {
    RasterFormat::from_path(path).map(|_| path.with_extension("webp"))
}
