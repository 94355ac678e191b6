// Watermark rendering unit tests

use image::{Rgba, RgbaImage};
use imgmark::config::ProcessingConfig;
use imgmark::watermark::text_renderer::surface_alpha;
use imgmark::watermark::*;
use rstest::rstest;
use std::path::{Path, PathBuf};

fn dejavu_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf")
}

fn dejavu() -> GlyphRenderer {
    GlyphRenderer::from_font_file(&dejavu_path()).unwrap()
}

fn base(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([40, 80, 120, 255]))
}

#[rstest]
#[case("ffffff", Color::new(255, 255, 255))]
#[case("#000000", Color::new(0, 0, 0))]
#[case("f0a", Color::new(255, 0, 170))]
#[case("1E90FF", Color::new(30, 144, 255))]
fn test_hex_colors(#[case] hex: &str, #[case] expected: Color) {
    assert_eq!(hex_to_rgb(hex).unwrap(), expected);
}

#[rstest]
#[case("")]
#[case("ffff")]
#[case("gggggg")]
#[case("#12345")]
#[case("+12345")]
fn test_invalid_hex_colors(#[case] hex: &str) {
    assert!(matches!(hex_to_rgb(hex), Err(WatermarkError::InvalidColor(_))));
}

#[rstest]
#[case(WatermarkPosition::TopLeft, 10, 10)]
#[case(WatermarkPosition::TopCenter, 350, 10)]
#[case(WatermarkPosition::TopRight, 690, 10)]
#[case(WatermarkPosition::MiddleLeft, 10, 275)]
#[case(WatermarkPosition::Center, 350, 275)]
#[case(WatermarkPosition::MiddleRight, 690, 275)]
#[case(WatermarkPosition::BottomLeft, 10, 540)]
#[case(WatermarkPosition::BottomCenter, 350, 540)]
#[case(WatermarkPosition::BottomRight, 690, 540)]
fn test_anchor_positions(#[case] position: WatermarkPosition, #[case] x: i32, #[case] y: i32) {
    let placed = calculate_position(
        position,
        &ImageDimensions {
            width: 800,
            height: 600,
        },
        &WatermarkDimensions {
            width: 100,
            height: 50,
        },
        10,
    );
    assert_eq!(placed, PlacementPosition::new(x, y));
}

#[test]
fn test_oversized_watermark_goes_negative_but_stays_visible() {
    let img = ImageDimensions {
        width: 200,
        height: 200,
    };
    let wm = WatermarkDimensions {
        width: 400,
        height: 100,
    };
    let placed = calculate_position(WatermarkPosition::BottomRight, &img, &wm, 10);
    assert_eq!(placed, PlacementPosition::new(-210, 90));
    assert!(is_visible(&placed, &wm, &img));
}

#[test]
fn test_position_tokens_round_trip() {
    for position in WatermarkPosition::ALL {
        assert_eq!(WatermarkPosition::from_token(position.as_str()), position);
    }
}

#[test]
fn test_outline_ring_sizes() {
    assert_eq!(outline_offsets(1).len(), 8);
    assert_eq!(outline_offsets(2).len(), 24);
    assert_eq!(outline_offsets(4).len(), 80);
}

#[test]
fn test_blend_full_and_zero_opacity() {
    let bg = Rgba([10, 20, 30, 255]);
    let fg = Rgba([200, 100, 50, 255]);
    assert_eq!(blend_pixels(bg, fg, 1.0), fg);
    assert_eq!(blend_pixels(bg, fg, 0.0), bg);
}

#[test]
fn test_blend_half_opacity_on_opaque_base() {
    let out = blend_pixels(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255]), 0.5);
    for channel in &out.0[..3] {
        assert!((127..=128).contains(channel), "{:?}", out);
    }
    assert_eq!(out.0[3], 255);
}

#[test]
fn test_layer_clipped_at_edges() {
    let mut target = base(20, 20);
    let overlay = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
    WatermarkLayer::new(overlay, PlacementPosition::new(15, -5), 100).apply(&mut target);

    assert_eq!(*target.get_pixel(19, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(*target.get_pixel(15, 4), Rgba([255, 0, 0, 255]));
    assert_eq!(*target.get_pixel(14, 0), Rgba([40, 80, 120, 255]));
    assert_eq!(*target.get_pixel(15, 5), Rgba([40, 80, 120, 255]));
}

#[test]
fn test_render_text_colors() {
    let style = TextStyle {
        font_size: 10,
        fill: Color::new(255, 0, 0),
        border: Color::new(0, 0, 255),
        border_width: 1,
    };
    let layer = render_text(&GlyphRenderer::Bitmap, "X", &style).unwrap();
    assert_eq!(layer.dimensions(), (10, 10));

    let red = layer.pixels().filter(|p| **p == Rgba([255, 0, 0, 255])).count();
    let blue = layer.pixels().filter(|p| **p == Rgba([0, 0, 255, 255])).count();
    assert!(red > 0);
    assert!(blue > 0);
    // untouched pixels stay fully transparent
    assert!(layer.pixels().any(|p| p.0[3] == 0));
}

#[test]
fn test_render_empty_text_fails() {
    let style = TextStyle {
        font_size: 10,
        fill: Color::white(),
        border: Color::black(),
        border_width: 0,
    };
    assert!(render_text(&GlyphRenderer::Bitmap, "", &style).is_err());
}

#[test]
fn test_missing_font_falls_back_to_bitmap() {
    let renderer = GlyphRenderer::resolve(Some(Path::new("/nonexistent/font.ttf")));
    assert!(!renderer.is_scalable());
}

#[test]
fn test_configured_font_is_loaded() {
    let renderer = GlyphRenderer::resolve(Some(&dejavu_path()));
    assert!(renderer.is_scalable());
}

#[test]
fn test_scalable_measure() {
    let renderer = dejavu();
    let (width, height) = renderer.measure("Sample", 40);

    // line height plus two pixels of padding
    assert!((42..=62).contains(&height), "height {}", height);
    // monospaced advances: twice the text, twice the width less padding
    let (double, double_height) = renderer.measure("SampleSample", 40);
    assert_eq!(double_height, height);
    let drift = (double as i64 - 2) - 2 * (width as i64 - 2);
    assert!(drift.abs() <= 1, "{} vs {}", double, width);
    // bigger fonts measure bigger
    let (wide, tall) = renderer.measure("Sample", 80);
    assert!(wide > width && tall > height);
}

#[test]
fn test_scalable_coverage_stays_in_measured_box() {
    let renderer = dejavu();
    let (width, height) = renderer.measure("Sample", 40);

    // rasterize a window well beyond the box and look for strays
    let spill = 16i64;
    let window = TextWindow::new(-spill, -spill, width + 32, height + 32);
    let mask = renderer.rasterize_window("Sample", 40, window);
    assert_eq!(mask.dimensions(), (width + 32, height + 32));

    let mut covered = 0;
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] == 0 {
            continue;
        }
        let (bx, by) = (x as i64 - spill, y as i64 - spill);
        assert!(
            bx >= -1 && by >= -1 && bx <= width as i64 && by <= height as i64,
            "coverage at ({}, {}) outside {}x{}",
            bx,
            by,
            width,
            height
        );
        covered += 1;
    }
    assert!(covered > 0);

    let boxed = renderer.rasterize("Sample", 40);
    assert_eq!(boxed.dimensions(), (width, height));
    assert!(boxed.pixels().any(|p| p.0[0] > 0));
}

#[test]
fn test_scalable_outline_under_fill() {
    let renderer = dejavu();
    let style = TextStyle {
        font_size: 64,
        fill: Color::new(255, 0, 0),
        border: Color::new(0, 0, 255),
        border_width: 2,
    };
    let layer = render_text(&renderer, "HM", &style).unwrap();
    let (width, height) = renderer.measure("HM", 64);
    assert_eq!(layer.dimensions(), (width + 4, height + 4));

    let mask = renderer.rasterize("HM", 64);
    let mut solid = 0;
    for (x, y, coverage) in mask.enumerate_pixels() {
        if coverage.0[0] == 255 {
            // the fill is stamped last, so full coverage is pure fill
            assert_eq!(*layer.get_pixel(x + 2, y + 2), Rgba([255, 0, 0, 255]));
            solid += 1;
        }
    }
    assert!(solid > 0);

    let blue = layer.pixels().filter(|p| **p == Rgba([0, 0, 255, 255])).count();
    assert!(blue > 0);
}

#[test]
fn test_scalable_window_matches_full_render() {
    let renderer = dejavu();
    let style = TextStyle {
        font_size: 48,
        fill: Color::white(),
        border: Color::black(),
        border_width: 1,
    };
    let full = render_text(&renderer, "Wm", &style).unwrap();

    // layer pixel (10, 5) is text-box pixel (9, 4)
    let part = render_text_clipped(&renderer, "Wm", &style, TextWindow::new(9, 4, 30, 20)).unwrap();
    assert_eq!(part.dimensions(), (30, 20));
    for (x, y, pixel) in part.enumerate_pixels() {
        assert_eq!(*pixel, *full.get_pixel(x + 10, y + 5), "at ({}, {})", x, y);
    }
}

#[test]
fn test_scalable_huge_font_window_is_bounded() {
    let renderer = dejavu();
    let mask = renderer.rasterize_window("MM", 60_000, TextWindow::new(0, 0, 64, 64));
    assert_eq!(mask.dimensions(), (64, 64));

    let (width, height) = renderer.measure("MM", 60_000);
    assert_eq!((width, height), renderer.measure("MM", MAX_FONT_SIZE));
}

#[rstest]
#[case(WatermarkPosition::TopLeft)]
#[case(WatermarkPosition::Center)]
#[case(WatermarkPosition::BottomRight)]
fn test_text_watermark_lands_at_anchor(#[case] position: WatermarkPosition) {
    let renderer = WatermarkRenderer::new(GlyphRenderer::Bitmap);
    let config = ProcessingConfig {
        watermark_enable: true,
        watermark_text: "Sample".to_string(),
        watermark_position: position,
        watermark_border_width: 0,
        ..ProcessingConfig::default()
    };
    let mut image = base(1000, 800);

    let applied = renderer.apply(&mut image, &config);
    assert_eq!(applied, Some(AppliedWatermark::Text { font_size: 40 }));

    let (w, h) = renderer.glyphs().measure("Sample", 40);
    let anchor = calculate_position(
        position,
        &ImageDimensions {
            width: 1000,
            height: 800,
        },
        &WatermarkDimensions {
            width: w,
            height: h,
        },
        10,
    );

    let mut changed_inside = 0;
    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel == Rgba([40, 80, 120, 255]) {
            continue;
        }
        let (x, y) = (x as i32, y as i32);
        assert!(
            x >= anchor.x && y >= anchor.y && x < anchor.x + w as i32 && y < anchor.y + h as i32,
            "pixel ({}, {}) changed outside the text box",
            x,
            y
        );
        changed_inside += 1;
    }
    assert!(changed_inside > 0);
}

#[test]
fn test_text_opacity_scales_blend() {
    let renderer = WatermarkRenderer::new(GlyphRenderer::Bitmap);
    let config = ProcessingConfig {
        watermark_enable: true,
        watermark_text: "I".to_string(),
        watermark_text_color: "ffffff".to_string(),
        watermark_border_width: 0,
        watermark_opacity: 50,
        enable_dynamic_font_size: false,
        watermark_font_size: 10,
        watermark_position: WatermarkPosition::TopLeft,
        ..ProcessingConfig::default()
    };
    let mut image = RgbaImage::from_pixel(300, 300, Rgba([0, 0, 0, 255]));
    renderer.apply(&mut image, &config).unwrap();

    let expected = surface_alpha(50);
    let brightest = image.pixels().map(|p| p.0[0]).max().unwrap();
    assert!((brightest as i32 - expected as i32).abs() <= 1, "{}", brightest);
}

#[rstest]
#[case(WatermarkPosition::BottomRight)]
#[case(WatermarkPosition::TopLeft)]
fn test_scalable_text_watermark_lands_at_anchor(#[case] position: WatermarkPosition) {
    let renderer = WatermarkRenderer::new(dejavu());
    let config = ProcessingConfig {
        watermark_enable: true,
        watermark_text: "Sample".to_string(),
        watermark_position: position,
        watermark_border_width: 2,
        ..ProcessingConfig::default()
    };
    let mut image = base(1000, 800);

    let applied = renderer.apply(&mut image, &config);
    assert_eq!(applied, Some(AppliedWatermark::Text { font_size: 40 }));

    let (w, h) = renderer.glyphs().measure("Sample", 40);
    let anchor = calculate_position(
        position,
        &ImageDimensions {
            width: 1000,
            height: 800,
        },
        &WatermarkDimensions {
            width: w,
            height: h,
        },
        10,
    );

    let mut changed_inside = 0;
    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel == Rgba([40, 80, 120, 255]) {
            continue;
        }
        let (x, y) = (x as i32, y as i32);
        assert!(
            x >= anchor.x - 2
                && y >= anchor.y - 2
                && x < anchor.x + w as i32 + 2
                && y < anchor.y + h as i32 + 2,
            "pixel ({}, {}) changed outside the outlined text box",
            x,
            y
        );
        changed_inside += 1;
    }
    assert!(changed_inside > 0);
}
