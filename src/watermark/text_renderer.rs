//! Text watermark rendering.
//!
//! Text is rasterized into a coverage mask by a [`GlyphRenderer`], then
//! turned into an RGBA layer with an outline: the mask is stamped in the
//! border color at every offset within `border_width`, and once more in the
//! fill color on top.
//!
//! Two glyph sources are supported:
//!
//! - a scalable TrueType/OpenType font loaded from disk (`ab_glyph`)
//! - the built-in 8×8 bitmap font (`font8x8`), scaled by a size tier
//!
//! # Example
//!
//! ```
//! use imgmark::watermark::text_renderer::{render_text, GlyphRenderer, TextStyle};
//! use imgmark::watermark::Color;
//!
//! let renderer = GlyphRenderer::Bitmap;
//! let style = TextStyle {
//!     font_size: 24,
//!     fill: Color::white(),
//!     border: Color::black(),
//!     border_width: 1,
//! };
//!
//! let layer = render_text(&renderer, "Copyright", &style).unwrap();
//! assert_eq!(layer.width(), 9 * 32 + 2);
//! ```

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use tracing::{debug, warn};

use super::color::Color;
use super::compositor::blend_pixels;
use super::sizing::{bitmap_tier, MAX_FONT_SIZE};
use super::WatermarkError;
use crate::config::MAX_BORDER_WIDTH;

/// File name of the scalable font looked up next to the executable.
pub const DEFAULT_FONT_FILE: &str = "font.ttf";

/// Width and height of a built-in bitmap glyph at tier 1.
const BITMAP_CELL: u32 = 8;

/// Padding added around scalable text so antialiased edges are not clipped.
const SCALABLE_PADDING: u32 = 2;

/// Source of glyph shapes for text watermarks.
pub enum GlyphRenderer {
    /// A scalable font file
    Scalable(FontVec),
    /// The built-in 8×8 bitmap font
    Bitmap,
}

impl std::fmt::Debug for GlyphRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalable(_) => f.write_str("GlyphRenderer::Scalable"),
            Self::Bitmap => f.write_str("GlyphRenderer::Bitmap"),
        }
    }
}

impl GlyphRenderer {
    /// Load a scalable font from a file.
    pub fn from_font_file(path: &Path) -> Result<Self, WatermarkError> {
        let data = std::fs::read(path).map_err(|e| {
            WatermarkError::FontUnavailable(format!("{}: {}", path.display(), e))
        })?;
        let font = FontVec::try_from_vec(data).map_err(|e| {
            WatermarkError::FontUnavailable(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self::Scalable(font))
    }

    /// Pick the glyph source for a pipeline.
    ///
    /// Uses `configured` when given, otherwise `font.ttf` next to the running
    /// executable. Falls back to the bitmap font when neither loads.
    pub fn resolve(configured: Option<&Path>) -> Self {
        let candidate = configured.map(Path::to_path_buf).or_else(default_font_path);

        let Some(path) = candidate else {
            debug!("No scalable font location available, using bitmap font");
            return Self::Bitmap;
        };

        match Self::from_font_file(&path) {
            Ok(renderer) => {
                debug!(font = %path.display(), "Loaded scalable watermark font");
                renderer
            }
            Err(e) => {
                // A missing default font is the normal case; only a configured one is worth a warning
                if configured.is_some() {
                    warn!(error = %e, "Falling back to built-in bitmap font");
                } else {
                    debug!(error = %e, "Falling back to built-in bitmap font");
                }
                Self::Bitmap
            }
        }
    }

    pub fn is_scalable(&self) -> bool {
        matches!(self, Self::Scalable(_))
    }

    /// Calculate the dimensions of rendered text.
    ///
    /// Returns (width, height) in pixels. Sizes above [`MAX_FONT_SIZE`] are
    /// measured at [`MAX_FONT_SIZE`].
    pub fn measure(&self, text: &str, font_size: u32) -> (u32, u32) {
        let font_size = font_size.min(MAX_FONT_SIZE);
        match self {
            Self::Scalable(font) => measure_scalable(font, text, font_size),
            Self::Bitmap => {
                let cell = BITMAP_CELL * bitmap_tier(font_size);
                ((text.chars().count() as u32).saturating_mul(cell), cell)
            }
        }
    }

    /// Rasterize `text` into a coverage mask the size of [`measure`](Self::measure).
    pub fn rasterize(&self, text: &str, font_size: u32) -> GrayImage {
        let (width, height) = self.measure(text, font_size);
        self.rasterize_window(text, font_size, TextWindow::new(0, 0, width, height))
    }

    /// Rasterize only the part of the text box covered by `window`.
    ///
    /// The mask is `window`-sized; pixel (0, 0) is text-box pixel
    /// (`window.x`, `window.y`). Glyphs entirely outside the window are
    /// skipped.
    pub fn rasterize_window(&self, text: &str, font_size: u32, window: TextWindow) -> GrayImage {
        let font_size = font_size.min(MAX_FONT_SIZE);
        let mut mask = GrayImage::new(window.width.max(1), window.height.max(1));

        match self {
            Self::Scalable(font) => rasterize_scalable(font, text, font_size, window, &mut mask),
            Self::Bitmap => rasterize_bitmap(text, bitmap_tier(font_size), window, &mut mask),
        }

        mask
    }
}

/// A rectangle in text-box coordinates, where (0, 0) is the top-left corner
/// of the measured text box. It may extend past the box on any side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextWindow {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl TextWindow {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The same window grown by `by` pixels on every side.
    fn expand(&self, by: u32) -> Self {
        Self {
            x: self.x - by as i64,
            y: self.y - by as i64,
            width: self.width.saturating_add(by.saturating_mul(2)),
            height: self.height.saturating_add(by.saturating_mul(2)),
        }
    }

    fn right(&self) -> i64 {
        self.x + self.width as i64
    }

    fn bottom(&self) -> i64 {
        self.y + self.height as i64
    }
}

/// `font.ttf` in the directory of the running executable.
pub fn default_font_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(DEFAULT_FONT_FILE))
}

fn measure_scalable(font: &FontVec, text: &str, font_size: u32) -> (u32, u32) {
    let scaled_font = font.as_scaled(PxScale::from(font_size as f32));

    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            width += scaled_font.kern(prev, glyph_id);
        }
        width += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    let height = scaled_font.height();

    (
        (width.ceil().max(0.0) as u32).saturating_add(SCALABLE_PADDING),
        (height.ceil().max(0.0) as u32).saturating_add(SCALABLE_PADDING),
    )
}

fn rasterize_scalable(
    font: &FontVec,
    text: &str,
    font_size: u32,
    window: TextWindow,
    mask: &mut GrayImage,
) {
    let scale = PxScale::from(font_size as f32);
    let scaled_font = font.as_scaled(scale);

    let offset = SCALABLE_PADDING as f32 / 2.0;
    let baseline_y = offset + scaled_font.ascent();
    let mut cursor_x = offset;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            cursor_x += scaled_font.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let (min_x, min_y) = (bounds.min.x as i64, bounds.min.y as i64);
            let visible = (bounds.max.x as i64) > window.x
                && (bounds.max.y as i64) > window.y
                && min_x < window.right()
                && min_y < window.bottom();

            if visible {
                outlined.draw(|px, py, coverage| {
                    let x = min_x + px as i64 - window.x;
                    let y = min_y + py as i64 - window.y;

                    if x >= 0 && y >= 0 && x < mask.width() as i64 && y < mask.height() as i64 {
                        let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                        let pixel = mask.get_pixel_mut(x as u32, y as u32);
                        // overlapping glyph edges keep the stronger coverage
                        pixel.0[0] = pixel.0[0].max(value);
                    }
                });
            }
        }

        cursor_x += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }
}

fn rasterize_bitmap(text: &str, tier: u32, window: TextWindow, mask: &mut GrayImage) {
    let cell = (BITMAP_CELL * tier) as i64;

    for (index, ch) in text.chars().enumerate() {
        let origin_x = index as i64 * cell;
        if origin_x + cell <= window.x {
            continue;
        }
        if origin_x >= window.right() {
            break;
        }

        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or_default();

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..BITMAP_CELL {
                // font8x8 stores the leftmost pixel in the least significant bit
                if bits & (1 << col) == 0 {
                    continue;
                }
                for sy in 0..tier {
                    for sx in 0..tier {
                        let x = origin_x + (col * tier + sx) as i64 - window.x;
                        let y = (row as u32 * tier + sy) as i64 - window.y;
                        if x >= 0 && y >= 0 && x < mask.width() as i64 && y < mask.height() as i64 {
                            mask.put_pixel(x as u32, y as u32, Luma([255]));
                        }
                    }
                }
            }
        }
    }
}

/// Appearance of a text watermark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: u32,
    pub fill: Color,
    pub border: Color,
    /// Outline thickness in pixels; 0 disables the outline
    pub border_width: u32,
}

/// Offsets of every outline pass for a border of `width` pixels.
///
/// Covers all rings of radius 1..=width around the origin, innermost first:
/// 8 offsets for width 1, 24 for width 2.
pub fn outline_offsets(width: u32) -> Vec<(i32, i32)> {
    let n = width as i32;
    let mut offsets = Vec::with_capacity(((2 * n + 1) * (2 * n + 1) - 1).max(0) as usize);

    for radius in 1..=n {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() == radius || dy.abs() == radius {
                    offsets.push((dx, dy));
                }
            }
        }
    }

    offsets
}

/// Transparency on a `max_alpha` scale where 0 is opaque and `max_alpha` is
/// fully transparent, for an opacity percentage.
pub fn transparency_for_opacity(opacity: u8, max_alpha: u8) -> u8 {
    let opacity = opacity.min(100) as f32;
    let max = max_alpha as f32;
    max_alpha - (opacity * max / 100.0).round() as u8
}

/// Alpha on an RGBA surface (255 = opaque) for an opacity percentage.
pub fn surface_alpha(opacity: u8) -> u8 {
    u8::MAX - transparency_for_opacity(opacity, u8::MAX)
}

/// Render `text` into an opaque RGBA layer with its outline.
///
/// The layer is `border_width` pixels larger than the measured text box on
/// every side; the text box itself starts at `(border_width, border_width)`.
/// Opacity is applied later when the layer is composited.
pub fn render_text(
    renderer: &GlyphRenderer,
    text: &str,
    style: &TextStyle,
) -> Result<RgbaImage, WatermarkError> {
    let (width, height) = renderer.measure(text, style.font_size);
    let border = style.border_width.min(MAX_BORDER_WIDTH);
    let full = TextWindow::new(0, 0, width.max(1), height.max(1)).expand(border);
    render_text_clipped(renderer, text, style, full)
}

/// Render the part of the outlined text layer that falls inside `clip`.
///
/// `clip` is in text-box coordinates, so the full layer of [`render_text`]
/// is the measured box grown by the border width. The result is
/// `clip`-sized and only the glyphs reaching into it are rasterized, which
/// keeps memory bounded by the clip rather than by the text.
pub fn render_text_clipped(
    renderer: &GlyphRenderer,
    text: &str,
    style: &TextStyle,
    clip: TextWindow,
) -> Result<RgbaImage, WatermarkError> {
    if text.is_empty() {
        return Err(WatermarkError::RenderError(
            "Cannot render empty text".to_string(),
        ));
    }
    if style.font_size == 0 {
        return Err(WatermarkError::RenderError(
            "Font size must be positive".to_string(),
        ));
    }
    if clip.width == 0 || clip.height == 0 {
        return Err(WatermarkError::RenderError(
            "Empty text clip region".to_string(),
        ));
    }

    // outline passes read up to `border` pixels beyond the clip
    let border = style.border_width.min(MAX_BORDER_WIDTH);
    let mask = renderer.rasterize_window(text, style.font_size, clip.expand(border));
    let mut layer = RgbaImage::new(clip.width, clip.height);

    let pad = border as i32;
    for (dx, dy) in outline_offsets(border) {
        stamp(&mut layer, &mask, dx - pad, dy - pad, style.border);
    }
    stamp(&mut layer, &mask, -pad, -pad, style.fill);

    Ok(layer)
}

/// Draw `mask` onto `layer` at (`x`, `y`) in `color`, coverage as alpha.
fn stamp(layer: &mut RgbaImage, mask: &GrayImage, x: i32, y: i32, color: Color) {
    for (mx, my, coverage) in mask.enumerate_pixels() {
        if coverage.0[0] == 0 {
            continue;
        }

        let tx = x + mx as i32;
        let ty = y + my as i32;
        if tx < 0 || ty < 0 || tx >= layer.width() as i32 || ty >= layer.height() as i32 {
            continue;
        }

        let existing = layer.get_pixel_mut(tx as u32, ty as u32);
        let top = Rgba([color.r, color.g, color.b, coverage.0[0]]);
        *existing = blend_pixels(*existing, top, 1.0);
    }
}
