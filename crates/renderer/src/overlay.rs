//! Overlays composited on top of the base raster.
//!
//! Overlays are source-over blended: the base color stays visible beneath
//! every translucent overlay pixel.

use viz_common::GridExtent;

use crate::contour::{ContourBand, Segment};
use crate::raster::RasterImage;

/// Graticule spacing in degrees, for both latitude and longitude.
pub const GRATICULE_STEP_DEG: f64 = 30.0;

/// Graticule line color, white at 30% opacity.
pub const GRID_COLOR: [u8; 4] = [255, 255, 255, 77];

/// Contour line color, black at 40% opacity.
pub const CONTOUR_COLOR: [u8; 4] = [0, 0, 0, 102];

/// Source-over blend of a straight-alpha color onto a straight-alpha pixel.
#[inline]
pub fn blend_pixel(dst: &mut [u8], src: [u8; 4]) {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    for c in 0..3 {
        let blended = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = blended.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Draw latitude/longitude lines every `step` degrees.
///
/// Returns the number of lines drawn.
pub fn draw_graticule(image: &mut RasterImage, extent: &GridExtent, step: f64, color: [u8; 4]) -> usize {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return 0;
    }

    let mut drawn = 0;

    for lat in extent.graticule_latitudes(step) {
        let frac = extent.lat_fraction(lat);
        let y = (frac * (height - 1) as f64).round();
        if (0.0..height as f64).contains(&y) {
            draw_hline(image, y as usize, color);
            drawn += 1;
        }
    }

    for lon in extent.graticule_longitudes(step) {
        let frac = (lon - extent.west) / extent.lon_span();
        let x = (frac * (width - 1) as f64).round();
        if (0.0..width as f64).contains(&x) {
            draw_vline(image, x as usize, color);
            drawn += 1;
        }
    }

    drawn
}

fn draw_hline(image: &mut RasterImage, y: usize, color: [u8; 4]) {
    for x in 0..image.width() {
        if let Some(px) = image.pixel_mut(x, y) {
            blend_pixel(px, color);
        }
    }
}

fn draw_vline(image: &mut RasterImage, x: usize, color: [u8; 4]) {
    for y in 0..image.height() {
        if let Some(px) = image.pixel_mut(x, y) {
            blend_pixel(px, color);
        }
    }
}

/// Draw every contour band. Lower bands are drawn lighter, higher bands
/// darker, so adjacent tiers stay distinguishable.
pub fn draw_contour_bands(image: &mut RasterImage, bands: &[ContourBand], color: [u8; 4]) {
    let count = bands.len().max(1) as f32;
    for band in bands {
        let shade = 0.6 + 0.4 * (band.index as f32 + 1.0) / count;
        let band_color = [color[0], color[1], color[2], (color[3] as f32 * shade).round() as u8];
        for segment in &band.segments {
            draw_segment(image, segment, band_color);
        }
    }
}

/// Rasterize a segment with a DDA walk, blending each pixel once.
pub fn draw_segment(image: &mut RasterImage, segment: &Segment, color: [u8; 4]) {
    let dx = segment.end.x - segment.start.x;
    let dy = segment.end.y - segment.start.y;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

    let mut last: Option<(i64, i64)> = None;
    for s in 0..=steps {
        let t = s as f32 / steps as f32;
        let x = (segment.start.x + dx * t).round() as i64;
        let y = (segment.start.y + dy * t).round() as i64;
        if last == Some((x, y)) || x < 0 || y < 0 {
            continue;
        }
        last = Some((x, y));
        if let Some(px) = image.pixel_mut(x as usize, y as usize) {
            blend_pixel(px, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_keeps_base_visible() {
        let mut px = [0u8, 0, 255, 255];
        blend_pixel(&mut px, GRID_COLOR);
        assert!(px[0] > 0 && px[0] < 255);
        assert!(px[2] > 200);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_blend_onto_transparent() {
        let mut px = [0u8, 0, 0, 0];
        blend_pixel(&mut px, [255, 255, 255, 77]);
        assert_eq!(px, [255, 255, 255, 77]);
    }

    #[test]
    fn test_blend_zero_alpha_is_noop() {
        let mut px = [10u8, 20, 30, 40];
        blend_pixel(&mut px, [255, 255, 255, 0]);
        assert_eq!(px, [10, 20, 30, 40]);
    }
}
