//! Field generators with predictable, verifiable patterns.
//!
//! Every generator is deterministic so rendered output can be compared
//! byte-for-byte across runs.

use viz_common::Field;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read correctly
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[0], 0.0);
/// assert_eq!(grid[1], 1000.0);
/// assert_eq!(grid[10], 1.0);
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a test grid with temperature-like values in Kelvin.
///
/// Values run from 250K at the poles to 305K at the equator, with a small
/// east-west wave so rows are not constant.
pub fn create_temperature_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let lat_frac = if height > 1 {
            row as f32 / (height - 1) as f32
        } else {
            0.5
        };
        let equator = 1.0 - (lat_frac * 2.0 - 1.0).abs();
        for col in 0..width {
            let lon_frac = if width > 1 {
                col as f32 / (width - 1) as f32
            } else {
                0.0
            };
            let wave = (lon_frac * std::f32::consts::TAU * 2.0).sin() * 2.0;
            data.push(250.0 + 55.0 * equator + wave);
        }
    }
    data
}

/// A field rising linearly from `min` at the west edge to `max` at the east edge.
pub fn linear_gradient_field(nx: usize, ny: usize, min: f32, max: f32) -> Field {
    let denom = nx.saturating_sub(1).max(1) as f32;
    Field::from_fn(nx, ny, |i, _| min + (max - min) * i as f32 / denom)
        .expect("gradient field dimensions must be non-zero")
}

/// A field peaking at `max` in the centre and falling to `min` at the corners.
pub fn radial_field(nx: usize, ny: usize, min: f32, max: f32) -> Field {
    let cx = (nx as f32 - 1.0) / 2.0;
    let cy = (ny as f32 - 1.0) / 2.0;
    let radius = (cx * cx + cy * cy).sqrt().max(1.0);
    Field::from_fn(nx, ny, |i, j| {
        let dx = i as f32 - cx;
        let dy = j as f32 - cy;
        let r = (dx * dx + dy * dy).sqrt() / radius;
        max - (max - min) * r.min(1.0)
    })
    .expect("radial field dimensions must be non-zero")
}

/// Wraps [`create_temperature_grid`] in a [`Field`].
pub fn temperature_field(nx: usize, ny: usize) -> Field {
    Field::new(nx, ny, create_temperature_grid(nx, ny))
        .expect("temperature field dimensions must be non-zero")
}
