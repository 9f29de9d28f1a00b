//! Dataset fixtures.
//!
//! [`sample_dataset`] mirrors the hourly reanalysis sample used during
//! development: four surface variables on a 0.25° global grid, 24 hourly
//! steps starting 2024-01-01 00:00 UTC.

use chrono::{TimeZone, Utc};
use viz_common::{Dataset, GridExtent, GridGeometry, TimeAxis, ValueRange, Variable};

/// Name of the sample dataset file.
pub const SAMPLE_FILENAME: &str = "era5_sample_2024010100.grib";

/// Descriptor document for the sample dataset, as written by the decoder.
pub const SAMPLE_DESCRIPTOR_JSON: &str = r#"{
  "filename": "era5_sample_2024010100.grib",
  "fileSizeBytes": 257635123,
  "variables": [
    {
      "name": "2t",
      "description": "2 metre temperature",
      "units": "K",
      "levels": [1000],
      "timeSteps": 24,
      "dataRange": { "min": 248.15, "max": 308.45 }
    },
    {
      "name": "tp",
      "description": "Total precipitation",
      "units": "m",
      "levels": [1000],
      "timeSteps": 24,
      "dataRange": { "min": 0.0, "max": 0.025 }
    },
    {
      "name": "10u",
      "description": "10 metre U wind component",
      "units": "m/s",
      "levels": [1000],
      "timeSteps": 24,
      "dataRange": { "min": -15.2, "max": 18.7 }
    },
    {
      "name": "10v",
      "description": "10 metre V wind component",
      "units": "m/s",
      "levels": [1000],
      "timeSteps": 24,
      "dataRange": { "min": -12.8, "max": 16.3 }
    }
  ],
  "gridInfo": {
    "resolution": "0.25° × 0.25°",
    "projection": "Regular latitude-longitude",
    "extent": { "north": 90.0, "south": -90.0, "east": 180.0, "west": -180.0 },
    "dimensions": { "nx": 1440, "ny": 721 }
  },
  "timeInfo": {
    "startTime": "2024-01-01T00:00:00Z",
    "timeStep": "1 hour",
    "totalSteps": 24
  }
}"#;

fn variable(name: &str, description: &str, units: &str, min: f64, max: f64, steps: usize) -> Variable {
    Variable::new(
        name,
        description,
        units,
        vec![1000.0],
        steps,
        ValueRange::new(min, max).expect("fixture range must be valid"),
    )
}

fn sample_variables(steps: usize) -> Vec<Variable> {
    vec![
        variable("2t", "2 metre temperature", "K", 248.15, 308.45, steps),
        variable("tp", "Total precipitation", "m", 0.0, 0.025, steps),
        variable("10u", "10 metre U wind component", "m/s", -15.2, 18.7, steps),
        variable("10v", "10 metre V wind component", "m/s", -12.8, 16.3, steps),
    ]
}

fn start_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("fixture start time must be valid")
}

/// The full-size sample dataset: 1440 × 721 global grid, 24 hourly steps.
pub fn sample_dataset() -> Dataset {
    let grid = GridGeometry::new(1440, 721, GridExtent::global())
        .expect("fixture grid must be valid")
        .with_resolution("0.25° × 0.25°");
    let axis = TimeAxis::hourly(start_time(), 24).expect("fixture time axis must be valid");
    Dataset::new(SAMPLE_FILENAME, sample_variables(24), grid, axis)
        .expect("fixture dataset must be valid")
        .with_file_size(257_635_123)
}

/// A coarse global dataset with the sample's variables and `steps` hourly steps.
///
/// The 72 × 37 grid keeps synthetic field generation cheap in tests.
pub fn small_dataset(steps: usize) -> Dataset {
    let grid = GridGeometry::new(72, 37, GridExtent::global())
        .expect("fixture grid must be valid")
        .with_resolution("5° × 5°");
    let axis = TimeAxis::hourly(start_time(), steps).expect("fixture time axis must be valid");
    Dataset::new("small_sample.grib", sample_variables(steps), grid, axis)
        .expect("fixture dataset must be valid")
}
