//! Dataset model: variables, grid geometry and time axis.
//!
//! A [`Dataset`] is validated once at construction and is read-only
//! afterwards. Every dataset carries a [`DatasetId`] so that caches keyed by a
//! dataset can tell a reloaded dataset apart from the one it replaced.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{VizError, VizResult};
use crate::grid::{GridExtent, GridGeometry};
use crate::time::{parse_step_duration, parse_timestamp, TimeAxis};

/// Identity of a loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(Uuid);

impl DatasetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Documented value range of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Create a range, rejecting `min > max` and non-finite bounds.
    pub fn new(min: f64, max: f64) -> VizResult<Self> {
        let range = Self { min, max };
        range.validate("unnamed")?;
        Ok(range)
    }

    fn validate(&self, variable: &str) -> VizResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(VizError::InvalidRange {
                variable: variable.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Rescale a sample into [0, 1].
    ///
    /// A degenerate range (`min == max`) and NaN samples both map to 0.
    pub fn normalize(&self, sample: f32) -> f32 {
        let span = self.span();
        if span <= 0.0 || sample.is_nan() {
            return 0.0;
        }
        ((sample as f64 - self.min) / span).clamp(0.0, 1.0) as f32
    }

    /// Inverse of [`normalize`](Self::normalize) for values in [0, 1].
    pub fn denormalize(&self, norm: f32) -> f64 {
        self.min + self.span() * norm.clamp(0.0, 1.0) as f64
    }
}

/// One variable of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub units: String,
    pub levels: Vec<f64>,
    pub time_step_count: usize,
    pub value_range: ValueRange,
}

impl Variable {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        units: impl Into<String>,
        levels: Vec<f64>,
        time_step_count: usize,
        value_range: ValueRange,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            units: units.into(),
            levels,
            time_step_count,
            value_range,
        }
    }

    pub fn validate(&self) -> VizResult<()> {
        if self.name.is_empty() {
            return Err(VizError::InvalidDataset(
                "variable name must not be empty".to_string(),
            ));
        }
        if self.levels.is_empty() {
            return Err(VizError::InvalidDataset(format!(
                "variable '{}' has no levels",
                self.name
            )));
        }
        if self.time_step_count == 0 {
            return Err(VizError::InvalidDataset(format!(
                "variable '{}' has no time steps",
                self.name
            )));
        }
        self.value_range.validate(&self.name)
    }

    /// Whether `level` is one of this variable's levels.
    pub fn has_level(&self, level: f64) -> bool {
        self.levels.iter().any(|l| (l - level).abs() < 1e-6)
    }

    /// The available level closest to `target`.
    pub fn nearest_level(&self, target: f64) -> f64 {
        self.levels
            .iter()
            .copied()
            .min_by(|a, b| (a - target).abs().total_cmp(&(b - target).abs()))
            .unwrap_or(target)
    }

    /// Default level: the first one listed.
    pub fn default_level(&self) -> f64 {
        self.levels.first().copied().unwrap_or(0.0)
    }
}

/// Immutable dataset metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    id: DatasetId,
    name: String,
    file_size_bytes: Option<u64>,
    variables: Vec<Variable>,
    grid: GridGeometry,
    time_axis: TimeAxis,
}

impl Dataset {
    /// Build and validate a dataset.
    pub fn new(
        name: impl Into<String>,
        variables: Vec<Variable>,
        grid: GridGeometry,
        time_axis: TimeAxis,
    ) -> VizResult<Self> {
        grid.validate()?;
        time_axis.validate()?;

        if variables.is_empty() {
            return Err(VizError::InvalidDataset(
                "dataset has no variables".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for var in &variables {
            var.validate()?;
            if !seen.insert(var.name.as_str()) {
                return Err(VizError::InvalidDataset(format!(
                    "duplicate variable name '{}'",
                    var.name
                )));
            }
            if var.time_step_count != time_axis.step_count {
                return Err(VizError::InvalidDataset(format!(
                    "variable '{}' has {} time steps but the time axis has {}",
                    var.name, var.time_step_count, time_axis.step_count
                )));
            }
        }

        Ok(Self {
            id: DatasetId::new(),
            name: name.into(),
            file_size_bytes: None,
            variables,
            grid,
            time_axis,
        })
    }

    pub fn with_file_size(mut self, bytes: u64) -> Self {
        self.file_size_bytes = Some(bytes);
        self
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_size_bytes(&self) -> Option<u64> {
        self.file_size_bytes
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Look up a variable, failing with `UnknownVariable`.
    pub fn require_variable(&self, name: &str) -> VizResult<&Variable> {
        self.variable(name)
            .ok_or_else(|| VizError::UnknownVariable(name.to_string()))
    }

    pub fn grid(&self) -> &GridGeometry {
        &self.grid
    }

    pub fn time_axis(&self) -> &TimeAxis {
        &self.time_axis
    }

    pub fn step_count(&self) -> usize {
        self.time_axis.step_count
    }

    /// Load a dataset from a JSON descriptor file.
    pub fn from_descriptor_file(path: impl AsRef<Path>) -> VizResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_descriptor_json(&content)
    }

    pub fn from_descriptor_json(json: &str) -> VizResult<Self> {
        let descriptor: DatasetDescriptor = serde_json::from_str(json)?;
        descriptor.into_dataset()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            name: self.name.clone(),
            file_size: self.file_size_bytes.map(format_file_size),
            grid: self.grid.describe(),
            projection: self.grid.projection.clone(),
            extent: self.grid.extent,
            start_time: self.time_axis.label(0),
            end_time: self.time_axis.label(self.time_axis.step_count - 1),
            time_step: self.time_axis.describe_step(),
            total_steps: self.time_axis.step_count,
            variables: self
                .variables
                .iter()
                .map(|v| VariableSummary {
                    name: v.name.clone(),
                    description: v.description.clone(),
                    units: v.units.clone(),
                    levels: v.levels.clone(),
                    min: v.value_range.min,
                    max: v.value_range.max,
                })
                .collect(),
        }
    }
}

/// Format a byte count the way upload dialogs show it, e.g. "245.7 MB".
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Serializable overview of a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub name: String,
    pub file_size: Option<String>,
    pub grid: String,
    pub projection: String,
    pub extent: GridExtent,
    pub start_time: String,
    pub end_time: String,
    pub time_step: String,
    pub total_steps: usize,
    pub variables: Vec<VariableSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableSummary {
    pub name: String,
    pub description: String,
    pub units: String,
    pub levels: Vec<f64>,
    pub min: f64,
    pub max: f64,
}

// ============================================================================
// JSON descriptor
// ============================================================================

/// Metadata document produced by the decoder for a dataset file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetDescriptor {
    filename: String,
    #[serde(default)]
    file_size_bytes: Option<u64>,
    variables: Vec<VariableDescriptor>,
    grid_info: GridDescriptor,
    time_info: TimeDescriptor,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariableDescriptor {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    units: String,
    levels: Vec<f64>,
    time_steps: usize,
    data_range: ValueRange,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridDescriptor {
    #[serde(default)]
    resolution: Option<String>,
    #[serde(default)]
    projection: Option<String>,
    extent: GridExtent,
    dimensions: Dimensions,
}

#[derive(Debug, Clone, Deserialize)]
struct Dimensions {
    nx: usize,
    ny: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeDescriptor {
    start_time: String,
    time_step: String,
    total_steps: usize,
}

impl DatasetDescriptor {
    fn into_dataset(self) -> VizResult<Dataset> {
        let mut grid = GridGeometry {
            nx: self.grid_info.dimensions.nx,
            ny: self.grid_info.dimensions.ny,
            extent: self.grid_info.extent,
            resolution: self.grid_info.resolution,
            projection: "Regular latitude-longitude".to_string(),
        };
        if let Some(projection) = self.grid_info.projection {
            grid.projection = projection;
        }

        let start = parse_timestamp(&self.time_info.start_time)?;
        let step = parse_step_duration(&self.time_info.time_step)?;
        let time_axis = TimeAxis::new(start, step, self.time_info.total_steps)?;

        let variables = self
            .variables
            .into_iter()
            .map(|v| Variable {
                name: v.name,
                description: v.description,
                units: v.units,
                levels: v.levels,
                time_step_count: v.time_steps,
                value_range: v.data_range,
            })
            .collect();

        let dataset = Dataset::new(self.filename, variables, grid, time_axis)?;
        Ok(match self.file_size_bytes {
            Some(bytes) => dataset.with_file_size(bytes),
            None => dataset,
        })
    }
}
