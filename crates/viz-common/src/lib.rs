//! Common types shared by the gridded-field visualization crates.

pub mod dataset;
pub mod error;
pub mod field;
pub mod grid;
pub mod settings;
pub mod time;

pub use dataset::{Dataset, DatasetId, DatasetSummary, ValueRange, Variable};
pub use error::{VizError, VizResult};
pub use field::Field;
pub use grid::{GridExtent, GridGeometry};
pub use settings::{Colormap, PlaybackSpeed, VisualizationSettings};
pub use time::TimeAxis;
