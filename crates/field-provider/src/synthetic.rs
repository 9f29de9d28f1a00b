//! Deterministic synthetic fields for demos and tests.
//!
//! Patterns are chosen per variable kind and drift with the timestep so
//! playback shows visible motion. Every value lies inside the variable's
//! declared range.

use std::sync::Arc;

use tracing::trace;
use viz_common::{Dataset, Field, Variable, VizError, VizResult};

use crate::FieldProvider;

/// Reference canvas width the wave patterns are tuned for.
const PATTERN_WIDTH: f32 = 800.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    /// Smooth checkerboard of warm and cold cells
    Temperature,
    /// Speckled noise whose intensity pulses over time
    Precipitation,
    /// Zonal wave travelling eastward
    Wind,
}

impl Pattern {
    fn for_variable(variable: &Variable) -> Self {
        match variable.name.as_str() {
            "2t" | "t" | "sst" | "skt" => Pattern::Temperature,
            "tp" | "cp" | "lsp" => Pattern::Precipitation,
            _ if variable.units == "K" => Pattern::Temperature,
            _ => Pattern::Wind,
        }
    }
}

/// Generates fields from closed-form patterns over the dataset's grid.
#[derive(Debug, Clone)]
pub struct SyntheticFieldProvider {
    dataset: Arc<Dataset>,
}

impl SyntheticFieldProvider {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    fn generate(&self, variable: &Variable, time_step: usize) -> VizResult<Field> {
        let grid = self.dataset.grid();
        let (nx, ny) = (grid.nx, grid.ny);
        let pattern = Pattern::for_variable(variable);
        let range = variable.value_range;
        let step = time_step as f32;

        // Pixel-like coordinates so the pattern scale does not depend on resolution
        let scale = PATTERN_WIDTH / nx.max(1) as f32;

        Field::from_fn(nx, ny, |i, j| {
            let x = i as f32 * scale;
            let y = j as f32 * scale;
            let frac = match pattern {
                Pattern::Temperature => {
                    let drift = step * 0.05;
                    0.5 + 0.5 * (x * 0.01 + drift).sin() * (y * 0.01).cos()
                }
                Pattern::Precipitation => {
                    let noise = hash_unit(i, j, time_step);
                    (noise * 0.67 + (step * 0.5).sin() * 0.33).clamp(0.0, 1.0)
                }
                Pattern::Wind => 0.5 + 0.5 * ((x + step * 10.0) * 0.02).sin(),
            };
            range.denormalize(frac.clamp(0.0, 1.0)) as f32
        })
    }
}

impl FieldProvider for SyntheticFieldProvider {
    fn get_field(&self, variable: &str, time_step: usize, level: f64) -> VizResult<Arc<Field>> {
        let var = self
            .dataset
            .variable(variable)
            .ok_or_else(|| VizError::field_not_found(variable, time_step, level))?;

        if time_step >= var.time_step_count || !var.has_level(level) {
            return Err(VizError::field_not_found(variable, time_step, level));
        }

        trace!(variable, time_step, level, "Generating synthetic field");
        self.generate(var, time_step).map(Arc::new)
    }
}

/// Stateless hash of a cell and timestep to [0, 1).
fn hash_unit(i: usize, j: usize, step: usize) -> f32 {
    let mut h = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (j as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (step as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 33;
    (h >> 40) as f32 / (1u64 << 24) as f32
}
