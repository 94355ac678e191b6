//! Watermark compositor for blending overlays onto images.
//!
//! Blending is Porter-Duff "over" with an extra opacity factor applied to the
//! overlay's own alpha. Overlays are clipped to the target bounds, so
//! positions may be negative or extend past the edges.

use super::position::PlacementPosition;
use image::{Rgba, RgbaImage};

/// A watermark layer to be composited onto an image.
#[derive(Clone)]
pub struct WatermarkLayer {
    /// The watermark image (RGBA).
    pub image: RgbaImage,
    /// Top-left corner on the target.
    pub position: PlacementPosition,
    /// Opacity to apply (0.0 to 1.0). Applied on top of the image's alpha channel.
    pub opacity: f32,
}

impl std::fmt::Debug for WatermarkLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("position", &self.position)
            .field("opacity", &self.opacity)
            .finish()
    }
}

impl WatermarkLayer {
    /// Build a layer from a 0-100 opacity percentage.
    pub fn new(image: RgbaImage, position: PlacementPosition, opacity_percent: u8) -> Self {
        Self {
            image,
            position,
            opacity: opacity_percent.min(100) as f32 / 100.0,
        }
    }

    /// Blend this layer onto `target` in place.
    pub fn apply(&self, target: &mut RgbaImage) {
        blend_layer(target, self);
    }
}

/// Blend a single watermark layer onto the target image.
pub fn blend_layer(target: &mut RgbaImage, layer: &WatermarkLayer) {
    if layer.opacity <= 0.0 {
        return;
    }

    let target_width = target.width() as i64;
    let target_height = target.height() as i64;

    let wm_width = layer.image.width() as i64;
    let wm_height = layer.image.height() as i64;

    let pos_x = layer.position.x as i64;
    let pos_y = layer.position.y as i64;

    // Visible region, clamped to target bounds
    let x_start = pos_x.max(0);
    let y_start = pos_y.max(0);
    let x_end = (pos_x + wm_width).min(target_width);
    let y_end = (pos_y + wm_height).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let wx = (tx - pos_x) as u32;
            let wy = (ty - pos_y) as u32;

            let wm_pixel = *layer.image.get_pixel(wx, wy);
            let target_pixel = target.get_pixel_mut(tx as u32, ty as u32);

            *target_pixel = blend_pixels(*target_pixel, wm_pixel, layer.opacity);
        }
    }
}

/// Blend two pixels using alpha compositing with additional opacity.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
pub fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    if fg_alpha <= 0.0 {
        return background;
    }
    if fg_alpha >= 1.0 {
        return foreground;
    }

    let bg_alpha = background[3] as f32 / 255.0;

    // Porter-Duff "over" operator
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
