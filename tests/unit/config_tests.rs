// Configuration unit tests

use imgmark::config::*;
use imgmark::watermark::WatermarkPosition;
use imgmark::ConfigError;
use std::collections::HashMap;
use std::path::PathBuf;

fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_can_deserialize_full_yaml_config() {
    let yaml = r#"
minWidth: 300
minHeight: 240
watermarkEnable: true
watermarkImage: /srv/assets/logo.png
watermarkText: "© example"
watermarkPosition: top-center
watermarkMargin: 16
watermarkOpacity: 60
watermarkTextColor: "ff0000"
watermarkBorderColor: "333"
watermarkBorderWidth: 2
enableDynamicFontSize: false
watermarkFontSize: 32
fontSizeWidthRatio: 40
fontSizeHeightRatio: 6.5
fontSizeAdjustmentFactor: 1.2
minDynamicFontSize: 14
maxDynamicFontSize: 64
enableDynamicImageSize: false
imageWatermarkMaxWidthRatio: 30
imageWatermarkMaxHeightRatio: 20
webpEnable: true
webpQuality: 90
webpKeepOriginal: true
fontPath: /usr/share/fonts/custom.ttf
documentRoot: /var/www/html
"#;
    let config = ProcessingConfig::from_yaml_with_env(yaml).expect("Failed to parse config");

    assert_eq!(config.min_width, 300);
    assert_eq!(config.min_height, 240);
    assert!(config.watermark_enable);
    assert_eq!(config.watermark_image, "/srv/assets/logo.png");
    assert_eq!(config.watermark_text, "© example");
    assert_eq!(config.watermark_position, WatermarkPosition::TopCenter);
    assert_eq!(config.watermark_margin, 16);
    assert_eq!(config.watermark_opacity, 60);
    assert_eq!(config.watermark_text_color, "ff0000");
    assert_eq!(config.watermark_border_color, "333");
    assert_eq!(config.watermark_border_width, 2);
    assert!(!config.enable_dynamic_font_size);
    assert_eq!(config.watermark_font_size, 32);
    assert_eq!(config.font_size_width_ratio, 40.0);
    assert_eq!(config.font_size_height_ratio, 6.5);
    assert_eq!(config.font_size_adjustment_factor, 1.2);
    assert_eq!(config.min_dynamic_font_size, 14);
    assert_eq!(config.max_dynamic_font_size, 64);
    assert!(!config.enable_dynamic_image_size);
    assert_eq!(config.image_watermark_max_width_ratio, 30.0);
    assert_eq!(config.image_watermark_max_height_ratio, 20.0);
    assert!(config.webp_enable);
    assert_eq!(config.webp_quality, 90);
    assert!(config.webp_keep_original);
    assert_eq!(
        config.font_path,
        Some(PathBuf::from("/usr/share/fonts/custom.ttf"))
    );
    assert_eq!(config.document_root, Some(PathBuf::from("/var/www/html")));
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_fields_use_defaults() {
    let config = ProcessingConfig::from_yaml_with_env("watermarkEnable: true\n").unwrap();
    assert!(config.watermark_enable);
    assert_eq!(
        ProcessingConfig {
            watermark_enable: false,
            ..config
        },
        ProcessingConfig::default()
    );
}

#[test]
fn test_string_flags_and_numbers_from_yaml() {
    let yaml = r#"
watermarkEnable: "1"
webpEnable: "0"
webpKeepOriginal: "on"
minWidth: "640"
webpQuality: "75"
fontSizeAdjustmentFactor: "0.5"
"#;
    let config = ProcessingConfig::from_yaml_with_env(yaml).unwrap();
    assert!(config.watermark_enable);
    assert!(!config.webp_enable);
    assert!(config.webp_keep_original);
    assert_eq!(config.min_width, 640);
    assert_eq!(config.webp_quality, 75);
    assert_eq!(config.font_size_adjustment_factor, 0.5);
}

#[test]
fn test_numeric_flags_from_yaml() {
    let config = ProcessingConfig::from_yaml_with_env("watermarkEnable: 1\nwebpEnable: 0\n").unwrap();
    assert!(config.watermark_enable);
    assert!(!config.webp_enable);
}

#[test]
fn test_unquoted_numeric_colors_keep_digits() {
    let yaml = "watermarkTextColor: 000000\nwatermarkBorderColor: 123456\n";
    let config = ProcessingConfig::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.watermark_text_color, "000000");
    assert_eq!(config.watermark_border_color, "123456");
}

#[test]
fn test_numeric_watermark_text() {
    let config = ProcessingConfig::from_yaml_with_env("watermarkText: 2024\n").unwrap();
    assert_eq!(config.watermark_text, "2024");
}

#[test]
fn test_unknown_position_token_defaults() {
    let config = ProcessingConfig::from_yaml_with_env("watermarkPosition: upper-middle\n").unwrap();
    assert_eq!(config.watermark_position, WatermarkPosition::BottomRight);
}

#[test]
fn test_invalid_flag_is_rejected_in_yaml() {
    let result = ProcessingConfig::from_yaml_with_env("webpEnable: sometimes\n");
    assert!(matches!(result, Err(ConfigError::Yaml(_))));
}

#[test]
fn test_env_var_substitution() {
    std::env::set_var("IMGMARK_TEST_WATERMARK_TEXT", "Copyright Example");
    let config = ProcessingConfig::from_yaml_with_env(
        "watermarkText: \"${IMGMARK_TEST_WATERMARK_TEXT}\"\n",
    )
    .unwrap();
    assert_eq!(config.watermark_text, "Copyright Example");
}

#[test]
fn test_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "webpEnable: true\nwebpQuality: 65\n").unwrap();

    let config = ProcessingConfig::from_file(&path).unwrap();
    assert!(config.webp_enable);
    assert_eq!(config.webp_quality, 65);
}

#[test]
fn test_from_file_missing() {
    let result = ProcessingConfig::from_file("/nonexistent/config.yaml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_from_map_host_options() {
    let config = ProcessingConfig::from_map(&map(&[
        ("watermarkEnable", "1"),
        ("watermarkText", "版权所有"),
        ("watermarkPosition", "middle-left"),
        ("watermarkOpacity", "80"),
        ("webpEnable", "1"),
        ("webpQuality", "70"),
        ("webpKeepOriginal", "0"),
        ("minWidth", "100"),
        ("fontSizeAdjustmentFactor", "1.5"),
        ("watermarkImage", ""),
        ("usageInstructions", "ignored"),
    ]));

    assert!(config.watermark_enable);
    assert_eq!(config.watermark_text, "版权所有");
    assert_eq!(config.watermark_position, WatermarkPosition::MiddleLeft);
    assert_eq!(config.watermark_opacity, 80);
    assert!(config.webp_enable);
    assert_eq!(config.webp_quality, 70);
    assert!(!config.webp_keep_original);
    assert_eq!(config.min_width, 100);
    assert_eq!(config.min_height, 200);
    assert_eq!(config.font_size_adjustment_factor, 1.5);
    assert!(config.watermark_image.is_empty());
}

#[test]
fn test_from_map_bad_values_keep_defaults() {
    let config = ProcessingConfig::from_map(&map(&[
        ("minWidth", "wide"),
        ("webpEnable", "perhaps"),
        ("fontSizeWidthRatio", "NaN"),
    ]));

    assert_eq!(config.min_width, 200);
    assert!(!config.webp_enable);
    assert_eq!(config.font_size_width_ratio, 30.0);
}

#[test]
fn test_from_map_empty_paths_are_unset() {
    let config = ProcessingConfig::from_map(&map(&[("fontPath", " "), ("documentRoot", "/srv")]));
    assert_eq!(config.font_path, None);
    assert_eq!(config.document_root, Some(PathBuf::from("/srv")));
}

#[test]
fn test_validate_rejects_quality_out_of_range() {
    let config = ProcessingConfig {
        webp_quality: 0,
        ..ProcessingConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    assert!(config.normalized().validate().is_ok());
}

#[test]
fn test_serialize_round_trips_through_yaml() {
    let config = ProcessingConfig {
        watermark_enable: true,
        watermark_text: "hello".to_string(),
        watermark_position: WatermarkPosition::Center,
        ..ProcessingConfig::default()
    };
    let yaml = serde_yaml::to_string(&config).unwrap();
    assert!(yaml.contains("watermarkPosition: center"));
    assert_eq!(ProcessingConfig::from_yaml_with_env(&yaml).unwrap(), config);
}
