//! Watermark application.
//!
//! Chooses between the image and text overlay, sizes and positions it, and
//! composites it onto the base image in place. Failures are logged and the
//! base image is left untouched.

use std::path::Path;

use image::RgbaImage;
use tracing::{debug, warn};

use super::color::{hex_to_rgb_or, Color};
use super::compositor::WatermarkLayer;
use super::position::{calculate_position, ImageDimensions, PlacementPosition, WatermarkDimensions};
use super::sizing::{dynamic_font_size, fit_overlay};
use super::text_renderer::{render_text_clipped, surface_alpha, GlyphRenderer, TextStyle, TextWindow};
use super::WatermarkError;
use crate::config::{ProcessingConfig, MAX_BORDER_WIDTH};
use crate::image_optimizer::processor::{decode_file, resize_rgba};

/// Which overlay the configuration asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkSource<'a> {
    Image(&'a Path),
    Text(&'a str),
    None,
}

impl<'a> WatermarkSource<'a> {
    /// An existing image path wins over text; empty values are unusable.
    pub fn select(config: &'a ProcessingConfig) -> Self {
        let image_path = config.watermark_image.trim();
        if !image_path.is_empty() && Path::new(image_path).exists() {
            return WatermarkSource::Image(Path::new(image_path));
        }
        if !config.watermark_text.is_empty() {
            return WatermarkSource::Text(&config.watermark_text);
        }
        WatermarkSource::None
    }
}

/// What the renderer drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedWatermark {
    Image,
    Text { font_size: u32 },
}

/// Applies image or text watermarks.
///
/// Holds the glyph source so a font file is read once, not per image.
#[derive(Debug)]
pub struct WatermarkRenderer {
    glyphs: GlyphRenderer,
}

impl WatermarkRenderer {
    pub fn new(glyphs: GlyphRenderer) -> Self {
        Self { glyphs }
    }

    /// Resolve the glyph source from `fontPath` (or the default location).
    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(GlyphRenderer::resolve(config.font_path.as_deref()))
    }

    pub fn glyphs(&self) -> &GlyphRenderer {
        &self.glyphs
    }

    /// Apply the configured watermark to `image`.
    ///
    /// Returns what was drawn, or `None` when nothing was usable or the
    /// overlay failed. `config` should already be normalized.
    pub fn apply(&self, image: &mut RgbaImage, config: &ProcessingConfig) -> Option<AppliedWatermark> {
        let result = match WatermarkSource::select(config) {
            WatermarkSource::Image(path) => {
                self.apply_image(image, path, config).map(|_| AppliedWatermark::Image)
            }
            WatermarkSource::Text(text) => self
                .apply_text(image, text, config)
                .map(|font_size| AppliedWatermark::Text { font_size }),
            WatermarkSource::None => {
                debug!("No usable watermark image or text configured");
                return None;
            }
        };

        match result {
            Ok(applied) => Some(applied),
            Err(e) => {
                warn!(error = %e, "Skipping watermark");
                None
            }
        }
    }

    /// Composite the overlay at `path`, shrunk to fit if configured.
    pub fn apply_image(
        &self,
        image: &mut RgbaImage,
        path: &Path,
        config: &ProcessingConfig,
    ) -> Result<(), WatermarkError> {
        let overlay = decode_file(path)
            .map_err(|e| WatermarkError::OverlayUnavailable(e.to_string()))?;

        let (width, height) = fit_overlay(
            overlay.width(),
            overlay.height(),
            image.width(),
            image.height(),
            &config.overlay_sizing(),
        )
        .ok_or_else(|| {
            WatermarkError::RenderError(format!(
                "No room for a watermark image on {}x{} with the configured size ratios",
                image.width(),
                image.height()
            ))
        })?;
        let overlay = if (width, height) != overlay.dimensions() {
            debug!(
                from_width = overlay.width(),
                from_height = overlay.height(),
                width,
                height,
                "Resizing watermark image"
            );
            resize_rgba(&overlay, width, height)
                .map_err(|e| WatermarkError::RenderError(e.to_string()))?
        } else {
            overlay
        };

        let position = calculate_position(
            config.watermark_position,
            &dimensions_of(image),
            &WatermarkDimensions { width, height },
            config.watermark_margin,
        );

        WatermarkLayer::new(overlay, position, config.watermark_opacity).apply(image);
        Ok(())
    }

    /// Draw `text` with its outline; returns the font size used.
    pub fn apply_text(
        &self,
        image: &mut RgbaImage,
        text: &str,
        config: &ProcessingConfig,
    ) -> Result<u32, WatermarkError> {
        let font_size = dynamic_font_size(text, image.width(), image.height(), &config.text_sizing());
        let style = TextStyle {
            font_size,
            fill: hex_to_rgb_or(&config.watermark_text_color, Color::white()),
            border: hex_to_rgb_or(&config.watermark_border_color, Color::black()),
            border_width: config.watermark_border_width,
        };

        // anchor on the text box; the outline may spill past it
        let (text_width, text_height) = self.glyphs.measure(text, font_size);
        let anchor = calculate_position(
            config.watermark_position,
            &dimensions_of(image),
            &WatermarkDimensions {
                width: text_width,
                height: text_height,
            },
            config.watermark_margin,
        );

        // only the part of the outlined text box that lands on the image is rendered
        let border = style.border_width.min(MAX_BORDER_WIDTH) as i64;
        let (anchor_x, anchor_y) = (anchor.x as i64, anchor.y as i64);
        let x0 = (anchor_x - border).max(0);
        let y0 = (anchor_y - border).max(0);
        let x1 = (anchor_x + text_width as i64 + border).min(image.width() as i64);
        let y1 = (anchor_y + text_height as i64 + border).min(image.height() as i64);
        if x0 >= x1 || y0 >= y1 {
            return Err(WatermarkError::RenderError(
                "Text watermark lies entirely outside the image".to_string(),
            ));
        }

        let clip = TextWindow::new(
            x0 - anchor_x,
            y0 - anchor_y,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        );
        let layer = WatermarkLayer {
            image: render_text_clipped(&self.glyphs, text, &style, clip)?,
            position: PlacementPosition::new(x0 as i32, y0 as i32),
            opacity: surface_alpha(config.watermark_opacity) as f32 / 255.0,
        };
        layer.apply(image);

        debug!(
            font_size,
            text_width,
            text_height,
            x = anchor.x,
            y = anchor.y,
            scalable = self.glyphs.is_scalable(),
            "Applied text watermark"
        );
        Ok(font_size)
    }
}

fn dimensions_of(image: &RgbaImage) -> ImageDimensions {
    ImageDimensions {
        width: image.width(),
        height: image.height(),
    }
}
