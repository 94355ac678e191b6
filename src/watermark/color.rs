//! Hex color parsing.
//!
//! Colors are written the way the upload settings store them: three or six
//! hex digits with no leading `#`. A leading `#` is tolerated.

use super::WatermarkError;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }
}

/// Parse a hex color string into RGB components.
///
/// Accepts `RRGGBB` and the `RGB` shorthand, where each digit is doubled.
///
/// ```
/// use imgmark::watermark::color::{hex_to_rgb, Color};
///
/// assert_eq!(hex_to_rgb("fff").unwrap(), Color::new(255, 255, 255));
/// assert_eq!(hex_to_rgb("ff0000").unwrap(), Color::new(255, 0, 0));
/// ```
pub fn hex_to_rgb(hex: &str) -> Result<Color, WatermarkError> {
    let trimmed = hex.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WatermarkError::InvalidColor(hex.to_string()));
    }

    let channel = |s: &str| {
        u8::from_str_radix(s, 16).map_err(|_| WatermarkError::InvalidColor(hex.to_string()))
    };

    match digits.len() {
        3 => {
            // Double each digit: 0xF -> 0xFF, 0xA -> 0xAA
            let r = channel(&digits[0..1])?;
            let g = channel(&digits[1..2])?;
            let b = channel(&digits[2..3])?;
            Ok(Color::new(r * 17, g * 17, b * 17))
        }
        6 => Ok(Color::new(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        _ => Err(WatermarkError::InvalidColor(hex.to_string())),
    }
}

/// Parse `hex`, falling back to `fallback` and logging when it is malformed.
pub fn hex_to_rgb_or(hex: &str, fallback: Color) -> Color {
    hex_to_rgb(hex).unwrap_or_else(|e| {
        tracing::warn!(color = %hex, error = %e, "Using fallback watermark color");
        fallback
    })
}
