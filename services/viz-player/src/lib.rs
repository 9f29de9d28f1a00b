//! Playback sessions for time-varying gridded fields.
//!
//! A [`Session`] ties a dataset, a field provider, a playback controller and
//! a raster renderer together, and is the control surface a UI drives.

pub mod cache;
pub mod config;
pub mod export;
pub mod session;

pub use cache::{FrameCache, FrameCacheStats, FrameKey};
pub use config::{CanvasConfig, PlayerConfig};
pub use export::{default_file_name, steps_to_export, FrameExporter, PngFileExporter};
pub use session::{Frame, FrameStatus, Session};

/// Descriptor of the bundled sample dataset.
pub const SAMPLE_DESCRIPTOR: &str = include_str!("../data/sample_descriptor.json");
