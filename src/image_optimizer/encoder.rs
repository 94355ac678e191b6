//! Image encoder abstraction
//!
//! Every encoder takes raw RGBA pixels so the watermarked buffer can be
//! handed to any of them. WebP goes through libwebp (the `webp` crate) for
//! lossy output with an alpha channel; the others use the `image` codecs.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::debug;

use super::error::ImageError;
use super::format::{webp_path_for, RasterFormat};

/// JPEG quality used when writing a watermarked image back in place
pub const RESAVE_JPEG_QUALITY: u8 = 90;

/// Quality settings for image encoding
#[derive(Debug, Clone, Copy)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self { quality: 80 }
    }
}

impl EncoderQuality {
    /// Create quality settings with specified quality level
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

/// Result of encoding an image
#[derive(Debug)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// The output format
    pub format: RasterFormat,
    /// Content-Type of the data
    pub content_type: &'static str,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, format: RasterFormat) -> Self {
        Self {
            data,
            content_type: format.content_type(),
            format,
        }
    }

    /// Write the encoded bytes to `path`, returning the number of bytes written
    pub fn write_to(&self, path: &Path) -> Result<u64, ImageError> {
        std::fs::write(path, &self.data).map_err(|e| ImageError::write_failed(path, e))?;
        Ok(self.data.len() as u64)
    }
}

/// Trait for image encoders
///
/// The trait is object-safe to allow dynamic dispatch through [`EncoderFactory`].
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> RasterFormat;

    /// Encode raw RGBA image data (4 bytes per pixel) to the target format
    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError>;

    /// Check if this encoder keeps the alpha channel
    fn supports_transparency(&self) -> bool {
        self.format().supports_transparency()
    }
}

fn check_buffer(data: &[u8], width: u32, height: u32, format: RasterFormat) -> Result<(), ImageError> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 || data.len() != expected {
        return Err(ImageError::encode_failed(
            format.as_str(),
            format!(
                "expected {} RGBA bytes for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            ),
        ));
    }
    Ok(())
}

/// JPEG encoder using the image crate
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> RasterFormat {
        RasterFormat::Jpeg
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
        use image::ImageEncoder as _;

        check_buffer(data, width, height, self.format())?;

        // JPEG has no alpha channel
        let rgb_data = rgba_to_rgb(data);

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, quality.quality);

        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8)
            .map_err(|e| ImageError::encode_failed("jpeg", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), RasterFormat::Jpeg))
    }
}

/// PNG encoder using the image crate
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> RasterFormat {
        RasterFormat::Png
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;
        use image::ImageEncoder as _;

        check_buffer(data, width, height, self.format())?;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new(&mut output);

        encoder
            .write_image(data, width, height, image::ColorType::Rgba8)
            .map_err(|e| ImageError::encode_failed("png", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), RasterFormat::Png))
    }
}

/// GIF encoder using the image crate (single frame)
pub struct GifEncoder;

impl ImageEncoder for GifEncoder {
    fn format(&self) -> RasterFormat {
        RasterFormat::Gif
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::gif::GifEncoder as ImageGifEncoder;

        check_buffer(data, width, height, self.format())?;

        let mut output = Vec::new();
        {
            let mut encoder = ImageGifEncoder::new(&mut output);
            encoder
                .encode(data, width, height, image::ColorType::Rgba8)
                .map_err(|e| ImageError::encode_failed("gif", e.to_string()))?;
        }

        Ok(EncodedImage::new(output, RasterFormat::Gif))
    }
}

/// Lossy WebP encoder with alpha, backed by libwebp
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> RasterFormat {
        RasterFormat::WebP
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        check_buffer(data, width, height, self.format())?;

        let encoder = webp::Encoder::from_rgba(data, width, height);
        let memory = encoder
            .encode_simple(false, quality.quality as f32)
            .map_err(|e| ImageError::encode_failed("webp", format!("{:?}", e)))?;

        Ok(EncodedImage::new(memory.to_vec(), RasterFormat::WebP))
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    /// Create an encoder for the specified output format
    pub fn create(format: RasterFormat) -> Box<dyn ImageEncoder> {
        match format {
            RasterFormat::Jpeg => Box::new(JpegEncoder),
            RasterFormat::Png => Box::new(PngEncoder),
            RasterFormat::Gif => Box::new(GifEncoder),
            RasterFormat::WebP => Box::new(WebPEncoder),
        }
    }
}

/// Encode `image` as WebP next to `source` (same stem, `.webp` extension).
///
/// Returns the written path and its size in bytes.
pub fn convert_to_webp(
    image: &RgbaImage,
    source: &Path,
    quality: u8,
) -> Result<(PathBuf, u64), ImageError> {
    let target = webp_path_for(source).ok_or_else(|| {
        ImageError::unsupported_format(format!("no WebP path for {}", source.display()))
    })?;

    let encoded = WebPEncoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        EncoderQuality::with_quality(quality),
    )?;
    let size = encoded.write_to(&target)?;

    debug!(path = %target.display(), size, quality, "Wrote WebP image");
    Ok((target, size))
}

/// Write `image` over `path` in `format`.
///
/// JPEG uses [`RESAVE_JPEG_QUALITY`]; PNG and GIF keep the alpha channel.
pub fn save_in_format(image: &RgbaImage, path: &Path, format: RasterFormat) -> Result<u64, ImageError> {
    let quality = match format {
        RasterFormat::Jpeg => EncoderQuality::with_quality(RESAVE_JPEG_QUALITY),
        _ => EncoderQuality::default(),
    };

    let encoded = EncoderFactory::create(format).encode(
        image.as_raw(),
        image.width(),
        image.height(),
        quality,
    )?;
    encoded.write_to(path)
}

/// Convert RGBA pixel data to RGB by dropping the alpha channel
fn rgba_to_rgb(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}
