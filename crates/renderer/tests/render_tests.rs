//! End-to-end tests for `RasterRenderer`.

use renderer::{CanvasSize, RasterImage, RasterRenderer};
use test_utils::{linear_gradient_field, temperature_field};
use viz_common::{Colormap, Field, GridExtent, ValueRange, VisualizationSettings};

// ============================================================================
// Helpers
// ============================================================================

fn renderer(width: usize, height: usize) -> RasterRenderer {
    RasterRenderer::new(CanvasSize::new(width, height), GridExtent::global())
}

fn plain_settings() -> VisualizationSettings {
    VisualizationSettings {
        show_grid: false,
        show_contours: false,
        ..VisualizationSettings::default()
    }
}

fn temperature_range() -> ValueRange {
    ValueRange::new(248.15, 308.45).unwrap()
}

fn differing_pixels(a: &RasterImage, b: &RasterImage) -> usize {
    a.pixels()
        .chunks_exact(4)
        .zip(b.pixels().chunks_exact(4))
        .filter(|(x, y)| x != y)
        .count()
}

// ============================================================================
// Basic output
// ============================================================================

#[test]
fn test_render_dimensions() {
    let field = temperature_field(72, 37);
    let image = renderer(200, 100).render(&field, &temperature_range(), &plain_settings(), 0);
    assert_eq!(image.width(), 200);
    assert_eq!(image.height(), 100);
    assert_eq!(image.pixels().len(), 200 * 100 * 4);
}

#[test]
fn test_zero_canvas_renders_empty_image() {
    let field = temperature_field(72, 37);
    let settings = VisualizationSettings::default();
    for (w, h) in [(0, 0), (0, 100), (100, 0)] {
        let image = renderer(w, h).render(&field, &temperature_range(), &settings, 0);
        assert!(image.is_empty());
    }
}

#[test]
fn test_render_is_idempotent() {
    let field = temperature_field(72, 37);
    let settings = VisualizationSettings {
        show_grid: true,
        colormap: Colormap::Coolwarm,
        ..VisualizationSettings::default()
    };
    let r = renderer(160, 80);
    let first = r.render(&field, &temperature_range(), &settings, 3);
    let second = r.render(&field, &temperature_range(), &settings, 3);
    assert_eq!(first, second);
}

#[test]
fn test_transparency_sets_alpha() {
    let field = temperature_field(72, 37);
    let mut settings = plain_settings();
    settings.set_transparency(50).unwrap();
    let image = renderer(64, 32).render(&field, &temperature_range(), &settings, 0);
    for px in image.pixels().chunks_exact(4) {
        assert_eq!(px[3], 128);
    }

    settings.set_transparency(0).unwrap();
    let opaque = renderer(64, 32).render(&field, &temperature_range(), &settings, 0);
    assert!(opaque.pixels().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn test_fully_transparent_setting() {
    let field = temperature_field(72, 37);
    let mut settings = plain_settings();
    settings.set_transparency(100).unwrap();
    let image = renderer(32, 16).render(&field, &temperature_range(), &settings, 0);
    assert!(image.pixels().chunks_exact(4).all(|px| px[3] == 0));
}

#[test]
fn test_uniform_field_in_degenerate_range() {
    let field = Field::filled(10, 5, 42.0).unwrap();
    let range = ValueRange::new(42.0, 42.0).unwrap();
    let settings = VisualizationSettings {
        colormap: Colormap::Grayscale,
        ..plain_settings()
    };
    let image = renderer(20, 10).render(&field, &range, &settings, 0);
    assert!(image
        .pixels()
        .chunks_exact(4)
        .all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn test_missing_values_are_transparent() {
    let mut values = vec![280.0f32; 4 * 4];
    values[0] = f32::NAN;
    let field = Field::new(4, 4, values).unwrap();
    let settings = VisualizationSettings {
        smoothing: false,
        ..plain_settings()
    };
    let image = renderer(4, 4).render(&field, &temperature_range(), &settings, 0);
    assert_eq!(image.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(image.pixel(3, 3).map(|p| p[3]), Some(255));
}

// ============================================================================
// Overlays
// ============================================================================

#[test]
fn test_grid_overlay_changes_pixels() {
    let field = temperature_field(72, 37);
    let r = renderer(181, 91);
    let base = r.render(&field, &temperature_range(), &plain_settings(), 0);
    let gridded = r.render(
        &field,
        &temperature_range(),
        &VisualizationSettings {
            show_grid: true,
            ..plain_settings()
        },
        0,
    );
    assert!(differing_pixels(&base, &gridded) > 0);
    // Equator row lies on the 0° graticule line
    assert_ne!(base.pixel(10, 45), gridded.pixel(10, 45));
    // Base color stays visible under the line
    let px = gridded.pixel(10, 45).unwrap();
    assert_ne!(px, [255, 255, 255, 255]);
}

#[test]
fn test_contour_overlay_changes_pixels() {
    let field = linear_gradient_field(36, 18, 0.0, 100.0);
    let range = ValueRange::new(0.0, 100.0).unwrap();
    let r = renderer(120, 60);
    let base = r.render(&field, &range, &plain_settings(), 0);
    let contoured = r.render(
        &field,
        &range,
        &VisualizationSettings {
            show_contours: true,
            contour_levels: 10,
            ..plain_settings()
        },
        0,
    );
    // Ten vertical lines, each one pixel wide, at least one per row
    assert!(differing_pixels(&base, &contoured) >= 10 * 60);
}

#[test]
fn test_zero_contour_levels_draws_nothing() {
    let field = linear_gradient_field(36, 18, 0.0, 100.0);
    let range = ValueRange::new(0.0, 100.0).unwrap();
    let r = renderer(120, 60);
    let base = r.render(&field, &range, &plain_settings(), 0);
    let none = r.render(
        &field,
        &range,
        &VisualizationSettings {
            show_contours: true,
            contour_levels: 0,
            ..plain_settings()
        },
        0,
    );
    assert_eq!(base, none);
}

#[test]
fn test_placeholder_is_transparent_canvas() {
    let placeholder = renderer(50, 20).placeholder();
    assert_eq!(placeholder.width(), 50);
    assert_eq!(placeholder.height(), 20);
    assert!(placeholder.pixels().iter().all(|&b| b == 0));
}
