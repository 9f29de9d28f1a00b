//! Two-dimensional scalar fields.

use crate::error::{VizError, VizResult};

/// One variable's values over the grid at a fixed timestep and level.
///
/// Values are stored row-major with row 0 at the northern edge and column 0
/// at the western edge. NaN marks missing samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    nx: usize,
    ny: usize,
    values: Vec<f32>,
}

impl Field {
    pub fn new(nx: usize, ny: usize, values: Vec<f32>) -> VizResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(VizError::InvalidDataset(format!(
                "field dimensions must be at least 1x1, got {}x{}",
                nx, ny
            )));
        }
        if values.len() != nx * ny {
            return Err(VizError::InvalidDataset(format!(
                "field has {} values, expected {}x{}={}",
                values.len(),
                nx,
                ny,
                nx * ny
            )));
        }
        Ok(Self { nx, ny, values })
    }

    /// Build a field by evaluating `f(i, j)` at every grid point.
    pub fn from_fn(nx: usize, ny: usize, mut f: impl FnMut(usize, usize) -> f32) -> VizResult<Self> {
        let mut values = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                values.push(f(i, j));
            }
        }
        Self::new(nx, ny, values)
    }

    pub fn filled(nx: usize, ny: usize, value: f32) -> VizResult<Self> {
        Self::new(nx, ny, vec![value; nx * ny])
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Value at column `i`, row `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.nx || j >= self.ny {
            return None;
        }
        Some(self.values[j * self.nx + i])
    }

    /// Nearest-neighbour sample at fractional grid coordinates.
    pub fn sample_nearest(&self, gx: f32, gy: f32) -> f32 {
        let i = (gx.round().max(0.0) as usize).min(self.nx - 1);
        let j = (gy.round().max(0.0) as usize).min(self.ny - 1);
        self.values[j * self.nx + i]
    }

    /// Bilinear sample at fractional grid coordinates.
    pub fn sample_bilinear(&self, gx: f32, gy: f32) -> f32 {
        let gx = gx.clamp(0.0, (self.nx - 1) as f32);
        let gy = gy.clamp(0.0, (self.ny - 1) as f32);

        let x1 = gx.floor() as usize;
        let y1 = gy.floor() as usize;
        let x2 = (x1 + 1).min(self.nx - 1);
        let y2 = (y1 + 1).min(self.ny - 1);

        let dx = gx - x1 as f32;
        let dy = gy - y1 as f32;

        let v11 = self.values[y1 * self.nx + x1];
        let v21 = self.values[y1 * self.nx + x2];
        let v12 = self.values[y2 * self.nx + x1];
        let v22 = self.values[y2 * self.nx + x2];

        let v1 = v11 * (1.0 - dx) + v21 * dx;
        let v2 = v12 * (1.0 - dx) + v22 * dx;
        v1 * (1.0 - dy) + v2 * dy
    }

    /// Minimum and maximum of the non-missing values.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
