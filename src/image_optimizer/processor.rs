//! Image decoding and resampling
//!
//! Probing reads only the header; decoding produces the RGBA buffer the
//! watermark stage mutates.

use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::num::NonZeroU32;
use std::path::Path;

use super::error::ImageError;
use super::format::RasterFormat;

/// Dimensions and detected format of an image file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageProbe {
    pub width: u32,
    pub height: u32,
    pub format: RasterFormat,
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, ImageError> {
    ImageReader::open(path)
        .map_err(|e| ImageError::decode_failed(format!("{}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(format!("{}: {}", path.display(), e)))
}

/// Read dimensions and format from the file header without decoding pixels
pub fn probe_file(path: &Path) -> Result<ImageProbe, ImageError> {
    let reader = open_reader(path)?;
    let format = reader
        .format()
        .ok_or_else(|| ImageError::decode_failed(format!("{}: unknown format", path.display())))
        .and_then(RasterFormat::from_image_format)?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ImageError::decode_failed(format!("{}: {}", path.display(), e)))?;

    Ok(ImageProbe {
        width,
        height,
        format,
    })
}

/// Decode an image file into an RGBA buffer
pub fn decode_file(path: &Path) -> Result<RgbaImage, ImageError> {
    let image = open_reader(path)?
        .decode()
        .map_err(|e| ImageError::decode_failed(format!("{}: {}", path.display(), e)))?;
    Ok(image.into_rgba8())
}

/// Resize an RGBA image using fast-image-resize with Lanczos3 filter
///
/// Alpha is premultiplied during resampling so transparent pixels do not
/// bleed their color into visible edges.
pub fn resize_rgba(img: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage, ImageError> {
    if img.width() == target_w && img.height() == target_h {
        return Ok(img.clone());
    }

    let src_width =
        NonZeroU32::new(img.width()).ok_or_else(|| ImageError::resize_failed("Source width is 0"))?;
    let src_height =
        NonZeroU32::new(img.height()).ok_or_else(|| ImageError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| ImageError::resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| ImageError::resize_failed("Target height is 0"))?;

    let mut src_image =
        Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x4)
            .map_err(|e| ImageError::resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let alpha_mul_div = MulDiv::default();
    alpha_mul_div
        .multiply_alpha_inplace(&mut src_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Premultiply failed: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
    let mut dst_view = dst_image.view_mut();

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_view)
        .map_err(|e| ImageError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    alpha_mul_div
        .divide_alpha_inplace(&mut dst_view)
        .map_err(|e| ImageError::resize_failed(format!("Unpremultiply failed: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ImageError::resize_failed("Failed to create output image buffer"))
}
