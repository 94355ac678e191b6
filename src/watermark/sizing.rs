//! Dynamic sizing of watermarks relative to the base image.
//!
//! Text watermarks get a font size derived from the image dimensions; image
//! watermarks are shrunk (never enlarged) to fit a share of the image.

/// Largest font size the text renderer draws; larger requests are capped.
pub const MAX_FONT_SIZE: u32 = 1024;

/// Policy for computing a text watermark's font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSizing {
    /// When false, `fixed_size` is used as-is
    pub dynamic: bool,
    pub fixed_size: u32,
    /// Percent of the image width the whole text may span
    pub width_ratio: f64,
    /// Percent of the image height used as font size
    pub height_ratio: f64,
    pub adjustment: f64,
    pub min_size: u32,
    pub max_size: u32,
}

impl Default for TextSizing {
    fn default() -> Self {
        Self {
            dynamic: true,
            fixed_size: 24,
            width_ratio: 30.0,
            height_ratio: 5.0,
            adjustment: 0.8,
            min_size: 12,
            max_size: 72,
        }
    }
}

/// Policy for shrinking an image watermark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySizing {
    pub dynamic: bool,
    /// Maximum overlay width as a percent of the image width
    pub max_width_ratio: f64,
    /// Maximum overlay height as a percent of the image height
    pub max_height_ratio: f64,
}

impl Default for OverlaySizing {
    fn default() -> Self {
        Self {
            dynamic: true,
            max_width_ratio: 25.0,
            max_height_ratio: 25.0,
        }
    }
}

/// Compute the font size for `text` on an image of `image_width` × `image_height`.
///
/// The width-based size spreads `width_ratio`% of the image width over the
/// text's characters (Unicode scalar values, not bytes); the height-based
/// size is `height_ratio`% of the image height. The smaller one wins, then
/// it is clamped to `[min_size, max_size]` and truncated. The result never
/// exceeds [`MAX_FONT_SIZE`].
///
/// ```
/// use imgmark::watermark::sizing::{dynamic_font_size, TextSizing};
///
/// let size = dynamic_font_size("Copyright", 1000, 800, &TextSizing::default());
/// assert_eq!(size, 26); // 300 / 9 * 0.8 = 26.67 < 40
/// ```
pub fn dynamic_font_size(text: &str, image_width: u32, image_height: u32, sizing: &TextSizing) -> u32 {
    if !sizing.dynamic {
        return sizing.fixed_size.min(MAX_FONT_SIZE);
    }

    let height_based = image_height as f64 * sizing.height_ratio / 100.0;
    let char_count = text.chars().count();

    let size = if char_count == 0 {
        height_based
    } else {
        let width_based =
            image_width as f64 * sizing.width_ratio / 100.0 / char_count as f64 * sizing.adjustment;
        width_based.min(height_based)
    };

    let lo = sizing.min_size.min(MAX_FONT_SIZE) as f64;
    let hi = sizing.max_size.max(sizing.min_size).min(MAX_FONT_SIZE) as f64;
    size.max(lo).min(hi) as u32
}

/// Compute the size an overlay of `overlay_width` × `overlay_height` should be
/// drawn at on an image of `image_width` × `image_height`.
///
/// Returns the original size when dynamic sizing is off or the overlay
/// already fits. Otherwise scales uniformly so both sides fit their caps,
/// keeping at least one pixel per side. Returns `None` when a cap is below
/// one pixel, since no overlay can fit.
pub fn fit_overlay(
    overlay_width: u32,
    overlay_height: u32,
    image_width: u32,
    image_height: u32,
    sizing: &OverlaySizing,
) -> Option<(u32, u32)> {
    if !sizing.dynamic || overlay_width == 0 || overlay_height == 0 {
        return Some((overlay_width, overlay_height));
    }

    let max_width = image_width as f64 * sizing.max_width_ratio / 100.0;
    let max_height = image_height as f64 * sizing.max_height_ratio / 100.0;

    let ow = overlay_width as f64;
    let oh = overlay_height as f64;

    if ow <= max_width && oh <= max_height {
        return Some((overlay_width, overlay_height));
    }
    if !(max_width >= 1.0 && max_height >= 1.0) {
        return None;
    }

    let scale = (max_width / ow).min(max_height / oh);
    let width = ((ow * scale).floor() as u32).max(1);
    let height = ((oh * scale).floor() as u32).max(1);

    Some((width, height))
}

/// Size tier (1-5) of the built-in bitmap font for a requested font size.
pub fn bitmap_tier(font_size: u32) -> u32 {
    match font_size {
        0..=10 => 1,
        11..=15 => 2,
        16..=20 => 3,
        21..=30 => 4,
        _ => 5,
    }
}
