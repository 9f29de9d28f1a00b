//! Tests for contour level placement and marching squares tracing.

use renderer::contour::{contour_levels, march_squares, trace_bands};
use renderer::gradient::{normalize_samples, resample_field, Resampling};
use test_utils::{linear_gradient_field, radial_field};
use viz_common::ValueRange;

// ============================================================================
// Level placement
// ============================================================================

#[test]
fn test_level_count_matches_request() {
    for count in [1, 5, 10, 20, 64] {
        let levels = contour_levels(count);
        assert_eq!(levels.len(), count as usize);
        for &level in &levels {
            assert!(level > 0.0 && level < 1.0);
        }
        for pair in levels.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}

#[test]
fn test_zero_levels() {
    assert!(contour_levels(0).is_empty());
}

#[test]
fn test_ten_levels_evenly_spaced() {
    let levels = contour_levels(10);
    assert!((levels[0] - 1.0 / 11.0).abs() < 1e-6);
    assert!((levels[9] - 10.0 / 11.0).abs() < 1e-6);
}

// ============================================================================
// Tracing
// ============================================================================

fn normalized_canvas(width: usize, height: usize) -> Vec<f32> {
    let field = linear_gradient_field(36, 18, 0.0, 100.0);
    let mut norm = resample_field(&field, width, height, Resampling::Bilinear);
    normalize_samples(&mut norm, &ValueRange::new(0.0, 100.0).unwrap());
    norm
}

#[test]
fn test_band_count_equals_levels() {
    let norm = normalized_canvas(120, 60);
    let levels = contour_levels(10);
    let bands = trace_bands(&norm, 120, 60, &levels);
    assert_eq!(bands.len(), 10);
    for (i, band) in bands.iter().enumerate() {
        assert_eq!(band.index, i);
        assert!(!band.segments.is_empty(), "band {} has no segments", i);
    }
}

#[test]
fn test_vertical_isolines_on_east_west_gradient() {
    let norm = normalized_canvas(120, 60);
    let segments = march_squares(&norm, 120, 60, 0.5);
    // One segment per row of cells
    assert_eq!(segments.len(), 59);
    let x0 = segments[0].start.x;
    for seg in &segments {
        assert!((seg.start.x - x0).abs() < 1e-3);
        assert!((seg.end.x - x0).abs() < 1e-3);
    }
}

#[test]
fn test_radial_field_closed_contour() {
    let field = radial_field(41, 41, 0.0, 1.0);
    let segments = march_squares(field.values(), 41, 41, 0.5);
    assert!(!segments.is_empty());
    for seg in &segments {
        for p in [seg.start, seg.end] {
            let d = ((p.x - 20.0).powi(2) + (p.y - 20.0).powi(2)).sqrt();
            assert!(d > 10.0 && d < 20.0, "point at distance {}", d);
        }
    }
}

#[test]
fn test_missing_cells_are_skipped() {
    let data = vec![0.0, 1.0, f32::NAN, 1.0];
    assert!(march_squares(&data, 2, 2, 0.5).is_empty());
}

#[test]
fn test_degenerate_inputs() {
    assert!(march_squares(&[0.0, 1.0], 2, 1, 0.5).is_empty());
    assert!(march_squares(&[0.0, 1.0, 0.0], 2, 2, 0.5).is_empty());
}
