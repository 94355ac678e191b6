// Lenient scalar parsing for option values.
//
// The upload settings store everything as strings ("1"/"0" flags, numbers
// as text), while YAML files carry native scalars. Both paths go through
// OptionValue so they accept the same spellings.

use serde::de::{Deserializer, Error};
use serde::Deserialize;
use std::path::PathBuf;

use crate::watermark::WatermarkPosition;

/// A type that can be parsed from a raw option string.
pub trait OptionValue: Sized {
    fn parse_option(raw: &str) -> Option<Self>;
}

impl OptionValue for bool {
    fn parse_option(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "0" | "false" | "off" | "no" | "" => Some(false),
            _ => None,
        }
    }
}

impl OptionValue for u32 {
    fn parse_option(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        raw.parse::<u32>().ok().or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v as u32)
        })
    }
}

impl OptionValue for u8 {
    fn parse_option(raw: &str) -> Option<Self> {
        u32::parse_option(raw).map(|v| v.min(u8::MAX as u32) as u8)
    }
}

impl OptionValue for f64 {
    fn parse_option(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl OptionValue for String {
    fn parse_option(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl OptionValue for Option<PathBuf> {
    fn parse_option(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Some((!raw.is_empty()).then(|| PathBuf::from(raw)))
    }
}

impl OptionValue for WatermarkPosition {
    fn parse_option(raw: &str) -> Option<Self> {
        Some(WatermarkPosition::from_token(raw))
    }
}

/// Parse `raw` into `slot`. Returns false and leaves `slot` untouched on failure.
pub(super) fn assign<T: OptionValue>(raw: &str, slot: &mut T) -> bool {
    match T::parse_option(raw) {
        Some(value) => {
            *slot = value;
            true
        }
        None => false,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Flag(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Flag(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s,
            Scalar::Empty => String::new(),
        }
    }
}

/// Deserialize any YAML scalar through [`OptionValue`].
pub(super) fn scalar<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: OptionValue,
{
    let text = Scalar::deserialize(deserializer)?.into_text();
    T::parse_option(&text).ok_or_else(|| D::Error::custom(format!("invalid value '{}'", text)))
}

/// Deserialize a hex color.
///
/// Unquoted all-digit colors such as `000000` arrive as integers; they are
/// zero-padded back to six digits.
pub(super) fn color<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Int(i) if i >= 0 => format!("{:06}", i),
        other => other.into_text(),
    })
}
