//! Watermark module for applying text and image watermarks to uploads.
//!
//! # Features
//!
//! - **Image watermarks** loaded from disk, shrunk to a share of the base
//!   image and alpha blended with a configurable opacity
//! - **Text watermarks** with an outline, sized dynamically from the base
//!   image dimensions
//! - **9 anchor positions** with an edge margin
//! - **Scalable or bitmap glyphs**: a TrueType font when one is available,
//!   the built-in 8×8 font otherwise
//!
//! # Configuration Example
//!
//! ```yaml
//! watermarkEnable: true
//! watermarkText: "© example.com"
//! watermarkPosition: bottom-right
//! watermarkMargin: 10
//! watermarkOpacity: 80
//! watermarkTextColor: "ffffff"
//! watermarkBorderColor: "000000"
//! watermarkBorderWidth: 1
//! ```

pub mod color;
pub mod compositor;
pub mod error;
pub mod position;
pub mod processor;
pub mod sizing;
pub mod text_renderer;

// Re-export main types for convenience
pub use color::{hex_to_rgb, Color};
pub use compositor::{blend_pixels, WatermarkLayer};
pub use error::WatermarkError;
pub use position::{
    calculate_position, is_visible, ImageDimensions, PlacementPosition, WatermarkDimensions,
    WatermarkPosition,
};
pub use processor::{AppliedWatermark, WatermarkRenderer, WatermarkSource};
pub use sizing::{
    bitmap_tier, dynamic_font_size, fit_overlay, OverlaySizing, TextSizing, MAX_FONT_SIZE,
};
pub use text_renderer::{
    outline_offsets, render_text, render_text_clipped, GlyphRenderer, TextStyle, TextWindow,
};
