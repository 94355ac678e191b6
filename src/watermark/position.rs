//! Anchor positions for watermark placement.
//!
//! A watermark is placed on a 3×3 grid of anchors. The margin pushes the
//! overlay toward the interior on every edge the anchor touches; centered
//! axes ignore the margin.
//!
//! # Example
//!
//! ```
//! use imgmark::watermark::position::{calculate_position, ImageDimensions, WatermarkDimensions};
//! use imgmark::watermark::WatermarkPosition;
//!
//! let image = ImageDimensions { width: 800, height: 600 };
//! let watermark = WatermarkDimensions { width: 100, height: 50 };
//!
//! let pos = calculate_position(WatermarkPosition::BottomRight, &image, &watermark, 10);
//! assert_eq!((pos.x, pos.y), (690, 540));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the nine anchor positions.
///
/// Parsing never fails: unrecognized tokens map to [`WatermarkPosition::BottomRight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WatermarkPosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl WatermarkPosition {
    pub const ALL: [WatermarkPosition; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::Center,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Resolve an anchor token such as `top-left` or `center`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "top-left" => Self::TopLeft,
            "top-center" => Self::TopCenter,
            "top-right" => Self::TopRight,
            "middle-left" => Self::MiddleLeft,
            "center" => Self::Center,
            "middle-right" => Self::MiddleRight,
            "bottom-left" => Self::BottomLeft,
            "bottom-center" => Self::BottomCenter,
            _ => Self::BottomRight,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::Center => "center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for WatermarkPosition {
    fn from(token: String) -> Self {
        Self::from_token(&token)
    }
}

impl From<WatermarkPosition> for String {
    fn from(position: WatermarkPosition) -> Self {
        position.as_str().to_string()
    }
}

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the watermark to be placed.
#[derive(Debug, Clone, Copy)]
pub struct WatermarkDimensions {
    pub width: u32,
    pub height: u32,
}

/// Top-left corner where a watermark should be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by an offset, used for outline passes.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Calculate the top-left coordinate for a watermark at the given anchor.
///
/// Coordinates may be negative if the watermark is larger than the image;
/// the compositor clips anything outside the target. Margins too large for
/// an `i32` coordinate saturate, which places the watermark off the image.
pub fn calculate_position(
    position: WatermarkPosition,
    image: &ImageDimensions,
    watermark: &WatermarkDimensions,
    margin: u32,
) -> PlacementPosition {
    let m = margin as i64;
    let center_x = (image.width as i64 - watermark.width as i64) / 2;
    let center_y = (image.height as i64 - watermark.height as i64) / 2;
    let right = image.width as i64 - watermark.width as i64 - m;
    let bottom = image.height as i64 - watermark.height as i64 - m;

    let (x, y) = match position {
        // Top row
        WatermarkPosition::TopLeft => (m, m),
        WatermarkPosition::TopCenter => (center_x, m),
        WatermarkPosition::TopRight => (right, m),

        // Middle row
        WatermarkPosition::MiddleLeft => (m, center_y),
        WatermarkPosition::Center => (center_x, center_y),
        WatermarkPosition::MiddleRight => (right, center_y),

        // Bottom row
        WatermarkPosition::BottomLeft => (m, bottom),
        WatermarkPosition::BottomCenter => (center_x, bottom),
        WatermarkPosition::BottomRight => (right, bottom),
    };

    PlacementPosition::new(saturate(x), saturate(y))
}

/// Whether any part of a watermark at `position` falls inside the image.
pub fn is_visible(
    position: &PlacementPosition,
    watermark: &WatermarkDimensions,
    image: &ImageDimensions,
) -> bool {
    let (x, y) = (position.x as i64, position.y as i64);
    let right = x + watermark.width as i64;
    let bottom = y + watermark.height as i64;

    right > 0 && bottom > 0 && x < image.width as i64 && y < image.height as i64
}
