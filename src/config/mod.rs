// Configuration module
//
// ProcessingConfig is a flat set of options named the way the upload
// settings store them. It can come from YAML (with ${VAR} substitution),
// from the host's flat string mapping, or be built in code.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ConfigError;
use crate::watermark::color::hex_to_rgb;
use crate::watermark::sizing::{OverlaySizing, TextSizing, MAX_FONT_SIZE};
use crate::watermark::WatermarkPosition;

mod values;

pub use values::OptionValue;

/// Largest outline thickness the renderer will draw.
pub const MAX_BORDER_WIDTH: u32 = 16;

// Default values
fn default_min_dimension() -> u32 {
    200
}

fn default_margin() -> u32 {
    10
}

fn default_opacity() -> u8 {
    100
}

fn default_text_color() -> String {
    "ffffff".to_string()
}

fn default_border_color() -> String {
    "000000".to_string()
}

fn default_border_width() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_font_size() -> u32 {
    24
}

fn default_width_ratio() -> f64 {
    30.0
}

fn default_height_ratio() -> f64 {
    5.0
}

fn default_adjustment_factor() -> f64 {
    0.8
}

fn default_min_font_size() -> u32 {
    12
}

fn default_max_font_size() -> u32 {
    72
}

fn default_overlay_ratio() -> f64 {
    25.0
}

fn default_webp_quality() -> u8 {
    80
}

/// Options for one pipeline invocation.
///
/// Every field has an explicit default; see [`ProcessingConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingConfig {
    #[serde(default = "default_min_dimension", deserialize_with = "values::scalar")]
    pub min_width: u32,
    #[serde(default = "default_min_dimension", deserialize_with = "values::scalar")]
    pub min_height: u32,

    #[serde(default, deserialize_with = "values::scalar")]
    pub watermark_enable: bool,
    #[serde(default, deserialize_with = "values::scalar")]
    pub watermark_image: String,
    #[serde(default, deserialize_with = "values::scalar")]
    pub watermark_text: String,
    #[serde(default)]
    pub watermark_position: WatermarkPosition,
    #[serde(default = "default_margin", deserialize_with = "values::scalar")]
    pub watermark_margin: u32,
    #[serde(default = "default_opacity", deserialize_with = "values::scalar")]
    pub watermark_opacity: u8,
    #[serde(default = "default_text_color", deserialize_with = "values::color")]
    pub watermark_text_color: String,
    #[serde(default = "default_border_color", deserialize_with = "values::color")]
    pub watermark_border_color: String,
    #[serde(default = "default_border_width", deserialize_with = "values::scalar")]
    pub watermark_border_width: u32,

    #[serde(default = "default_true", deserialize_with = "values::scalar")]
    pub enable_dynamic_font_size: bool,
    #[serde(default = "default_font_size", deserialize_with = "values::scalar")]
    pub watermark_font_size: u32,
    #[serde(default = "default_width_ratio", deserialize_with = "values::scalar")]
    pub font_size_width_ratio: f64,
    #[serde(default = "default_height_ratio", deserialize_with = "values::scalar")]
    pub font_size_height_ratio: f64,
    #[serde(default = "default_adjustment_factor", deserialize_with = "values::scalar")]
    pub font_size_adjustment_factor: f64,
    #[serde(default = "default_min_font_size", deserialize_with = "values::scalar")]
    pub min_dynamic_font_size: u32,
    #[serde(default = "default_max_font_size", deserialize_with = "values::scalar")]
    pub max_dynamic_font_size: u32,

    #[serde(default = "default_true", deserialize_with = "values::scalar")]
    pub enable_dynamic_image_size: bool,
    #[serde(default = "default_overlay_ratio", deserialize_with = "values::scalar")]
    pub image_watermark_max_width_ratio: f64,
    #[serde(default = "default_overlay_ratio", deserialize_with = "values::scalar")]
    pub image_watermark_max_height_ratio: f64,

    #[serde(default, deserialize_with = "values::scalar")]
    pub webp_enable: bool,
    #[serde(default = "default_webp_quality", deserialize_with = "values::scalar")]
    pub webp_quality: u8,
    #[serde(default, deserialize_with = "values::scalar")]
    pub webp_keep_original: bool,

    /// Scalable font for text watermarks; `font.ttf` next to the executable when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
    /// Prefix stripped from output paths to form the public `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_root: Option<PathBuf>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            min_width: default_min_dimension(),
            min_height: default_min_dimension(),
            watermark_enable: false,
            watermark_image: String::new(),
            watermark_text: String::new(),
            watermark_position: WatermarkPosition::default(),
            watermark_margin: default_margin(),
            watermark_opacity: default_opacity(),
            watermark_text_color: default_text_color(),
            watermark_border_color: default_border_color(),
            watermark_border_width: default_border_width(),
            enable_dynamic_font_size: true,
            watermark_font_size: default_font_size(),
            font_size_width_ratio: default_width_ratio(),
            font_size_height_ratio: default_height_ratio(),
            font_size_adjustment_factor: default_adjustment_factor(),
            min_dynamic_font_size: default_min_font_size(),
            max_dynamic_font_size: default_max_font_size(),
            enable_dynamic_image_size: true,
            image_watermark_max_width_ratio: default_overlay_ratio(),
            image_watermark_max_height_ratio: default_overlay_ratio(),
            webp_enable: false,
            webp_quality: default_webp_quality(),
            webp_keep_original: false,
            font_path: None,
            document_root: None,
        }
    }
}

impl ProcessingConfig {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            })
        });

        if let Some(var_name) = missing {
            return Err(ConfigError::MissingEnvVar(var_name));
        }

        // An empty document deserializes as unit; treat it as all defaults
        if substituted.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(&substituted)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_with_env(&yaml)
    }

    /// Build from the host's flat option mapping.
    ///
    /// Unknown keys are ignored. Values that do not parse keep the default
    /// and are logged.
    pub fn from_map(options: &HashMap<String, String>) -> Self {
        let mut config = Self::default();

        for (key, raw) in options {
            let applied = match key.as_str() {
                "minWidth" => values::assign(raw, &mut config.min_width),
                "minHeight" => values::assign(raw, &mut config.min_height),
                "watermarkEnable" => values::assign(raw, &mut config.watermark_enable),
                "watermarkImage" => values::assign(raw, &mut config.watermark_image),
                "watermarkText" => values::assign(raw, &mut config.watermark_text),
                "watermarkPosition" => values::assign(raw, &mut config.watermark_position),
                "watermarkMargin" => values::assign(raw, &mut config.watermark_margin),
                "watermarkOpacity" => values::assign(raw, &mut config.watermark_opacity),
                "watermarkTextColor" => values::assign(raw, &mut config.watermark_text_color),
                "watermarkBorderColor" => values::assign(raw, &mut config.watermark_border_color),
                "watermarkBorderWidth" => values::assign(raw, &mut config.watermark_border_width),
                "enableDynamicFontSize" => values::assign(raw, &mut config.enable_dynamic_font_size),
                "watermarkFontSize" => values::assign(raw, &mut config.watermark_font_size),
                "fontSizeWidthRatio" => values::assign(raw, &mut config.font_size_width_ratio),
                "fontSizeHeightRatio" => values::assign(raw, &mut config.font_size_height_ratio),
                "fontSizeAdjustmentFactor" => {
                    values::assign(raw, &mut config.font_size_adjustment_factor)
                }
                "minDynamicFontSize" => values::assign(raw, &mut config.min_dynamic_font_size),
                "maxDynamicFontSize" => values::assign(raw, &mut config.max_dynamic_font_size),
                "enableDynamicImageSize" => {
                    values::assign(raw, &mut config.enable_dynamic_image_size)
                }
                "imageWatermarkMaxWidthRatio" => {
                    values::assign(raw, &mut config.image_watermark_max_width_ratio)
                }
                "imageWatermarkMaxHeightRatio" => {
                    values::assign(raw, &mut config.image_watermark_max_height_ratio)
                }
                "webpEnable" => values::assign(raw, &mut config.webp_enable),
                "webpQuality" => values::assign(raw, &mut config.webp_quality),
                "webpKeepOriginal" => values::assign(raw, &mut config.webp_keep_original),
                "fontPath" => values::assign(raw, &mut config.font_path),
                "documentRoot" => values::assign(raw, &mut config.document_root),
                _ => continue,
            };

            if !applied {
                warn!(option = %key, value = %raw, "Ignoring unparseable option value, keeping default");
            }
        }

        config
    }

    /// Copy with every range-bound option clamped into its documented range.
    pub fn normalized(&self) -> Self {
        let clamp_ratio = |v: f64| if v.is_finite() { v.clamp(0.0, 100.0) } else { 0.0 };

        let mut config = self.clone();
        config.watermark_opacity = config.watermark_opacity.min(100);
        config.watermark_border_width = config.watermark_border_width.min(MAX_BORDER_WIDTH);
        config.watermark_font_size = config.watermark_font_size.clamp(1, MAX_FONT_SIZE);
        config.font_size_width_ratio = clamp_ratio(config.font_size_width_ratio);
        config.font_size_height_ratio = clamp_ratio(config.font_size_height_ratio);
        config.font_size_adjustment_factor = if config.font_size_adjustment_factor.is_finite() {
            config.font_size_adjustment_factor.clamp(0.1, 2.0)
        } else {
            default_adjustment_factor()
        };
        config.min_dynamic_font_size = config.min_dynamic_font_size.clamp(1, MAX_FONT_SIZE);
        config.max_dynamic_font_size = config
            .max_dynamic_font_size
            .min(MAX_FONT_SIZE)
            .max(config.min_dynamic_font_size);
        config.image_watermark_max_width_ratio = clamp_ratio(config.image_watermark_max_width_ratio);
        config.image_watermark_max_height_ratio =
            clamp_ratio(config.image_watermark_max_height_ratio);
        config.webp_quality = config.webp_quality.clamp(1, 100);
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watermark_opacity > 100 {
            return Err(ConfigError::Invalid(format!(
                "watermarkOpacity must be 0-100, got {}",
                self.watermark_opacity
            )));
        }

        if !(1..=100).contains(&self.webp_quality) {
            return Err(ConfigError::Invalid(format!(
                "webpQuality must be 1-100, got {}",
                self.webp_quality
            )));
        }

        for (name, value) in [
            ("watermarkTextColor", &self.watermark_text_color),
            ("watermarkBorderColor", &self.watermark_border_color),
        ] {
            hex_to_rgb(value)
                .map_err(|e| ConfigError::Invalid(format!("{}: {}", name, e)))?;
        }

        if self.min_dynamic_font_size > self.max_dynamic_font_size {
            return Err(ConfigError::Invalid(format!(
                "minDynamicFontSize ({}) exceeds maxDynamicFontSize ({})",
                self.min_dynamic_font_size, self.max_dynamic_font_size
            )));
        }

        if self.watermark_font_size == 0 {
            return Err(ConfigError::Invalid(
                "watermarkFontSize must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Text sizing policy derived from the font size options.
    pub fn text_sizing(&self) -> TextSizing {
        TextSizing {
            dynamic: self.enable_dynamic_font_size,
            fixed_size: self.watermark_font_size,
            width_ratio: self.font_size_width_ratio,
            height_ratio: self.font_size_height_ratio,
            adjustment: self.font_size_adjustment_factor,
            min_size: self.min_dynamic_font_size,
            max_size: self.max_dynamic_font_size,
        }
    }

    /// Overlay sizing policy derived from the image watermark options.
    pub fn overlay_sizing(&self) -> OverlaySizing {
        OverlaySizing {
            dynamic: self.enable_dynamic_image_size,
            max_width_ratio: self.image_watermark_max_width_ratio,
            max_height_ratio: self.image_watermark_max_height_ratio,
        }
    }
}
