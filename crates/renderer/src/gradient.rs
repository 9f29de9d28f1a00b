//! Base raster: resample a field onto the canvas, normalize, colorize.

use rayon::prelude::*;
use viz_common::{Colormap, Field, ValueRange};

use crate::colormap;

/// How field samples are picked for each canvas pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    Nearest,
    Bilinear,
}

impl Resampling {
    pub fn from_smoothing(smoothing: bool) -> Self {
        if smoothing {
            Resampling::Bilinear
        } else {
            Resampling::Nearest
        }
    }
}

/// Ratio between source grid spacing and destination pixel spacing.
///
/// Endpoints map to endpoints: pixel 0 samples grid point 0 and the last
/// pixel samples the last grid point. A single-pixel axis samples point 0.
#[inline]
fn axis_ratio(src: usize, dst: usize) -> f32 {
    if dst <= 1 || src <= 1 {
        0.0
    } else {
        (src - 1) as f32 / (dst - 1) as f32
    }
}

/// Resample a field to `dst_width × dst_height`, row-major.
pub fn resample_field(
    field: &Field,
    dst_width: usize,
    dst_height: usize,
    mode: Resampling,
) -> Vec<f32> {
    let mut output = vec![0.0f32; dst_width * dst_height];
    if output.is_empty() {
        return output;
    }

    let x_ratio = axis_ratio(field.nx(), dst_width);
    let y_ratio = axis_ratio(field.ny(), dst_height);

    output
        .par_chunks_mut(dst_width)
        .enumerate()
        .for_each(|(y, row)| {
            let src_y = y as f32 * y_ratio;
            for (x, out) in row.iter_mut().enumerate() {
                let src_x = x as f32 * x_ratio;
                *out = match mode {
                    Resampling::Nearest => field.sample_nearest(src_x, src_y),
                    Resampling::Bilinear => field.sample_bilinear(src_x, src_y),
                };
            }
        });

    output
}

/// Normalize canvas samples into [0, 1]. Missing (NaN) samples stay NaN.
pub fn normalize_samples(samples: &mut [f32], range: &ValueRange) {
    samples.par_iter_mut().for_each(|v| {
        if !v.is_nan() {
            *v = range.normalize(*v);
        }
    });
}

/// Colorize normalized samples into RGBA pixels.
///
/// Missing samples become fully transparent pixels.
pub fn colorize(norm: &[f32], width: usize, colormap: Colormap, alpha: u8) -> Vec<u8> {
    let mut pixels = vec![0u8; norm.len() * 4];
    if width == 0 {
        return pixels;
    }

    pixels
        .par_chunks_mut(width * 4)
        .zip(norm.par_chunks(width))
        .for_each(|(row_pixels, row_norm)| {
            for (px, &value) in row_pixels.chunks_exact_mut(4).zip(row_norm) {
                if value.is_nan() {
                    continue;
                }
                px.copy_from_slice(&colormap::map(value, colormap).with_alpha(alpha));
            }
        });

    pixels
}
