//! A playback session over one dataset.
//!
//! The session owns everything mutable: playback state (through its
//! controller), visualization settings, the variable/level selection and
//! the frame cache. The dataset itself is shared and read-only; loading a
//! new one swaps it atomically, resets playback and drops cached frames.

use std::path::PathBuf;
use std::sync::Arc;

use field_provider::FieldProvider;
use metrics::counter;
use playback::{PlaybackController, PlaybackState};
use renderer::{RasterImage, RasterRenderer};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use viz_common::{Colormap, Dataset, VisualizationSettings, VizError, VizResult};

use crate::cache::{FrameCache, FrameKey};
use crate::config::PlayerConfig;
use crate::export::{default_file_name, FrameExporter};

/// How a frame was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FrameStatus {
    Rendered,
    Cached,
    /// The field was unavailable; the image is a transparent placeholder
    Placeholder { reason: String },
}

impl FrameStatus {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, FrameStatus::Placeholder { .. })
    }
}

/// One rendered frame and what it shows.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: Arc<RasterImage>,
    pub variable: String,
    pub level: f64,
    pub time_step: usize,
    /// Valid time of the step, e.g. `2024-01-01 05:00 UTC`
    pub valid_time: String,
    pub status: FrameStatus,
}

pub struct Session {
    dataset: Arc<Dataset>,
    provider: Arc<dyn FieldProvider>,
    controller: PlaybackController,
    settings: VisualizationSettings,
    variable: String,
    level: f64,
    renderer: RasterRenderer,
    frames: FrameCache,
}

impl Session {
    /// Open a session on `dataset`, selecting its first variable at its
    /// default level. Must be called within a tokio runtime.
    pub fn new(
        dataset: Arc<Dataset>,
        provider: Arc<dyn FieldProvider>,
        config: &PlayerConfig,
    ) -> VizResult<Self> {
        config.validate()?;

        let first = dataset
            .variables()
            .first()
            .ok_or_else(|| VizError::InvalidDataset("dataset has no variables".to_string()))?;
        let variable = first.name.clone();
        let level = first.default_level();

        let controller = PlaybackController::new(dataset.step_count())?.with_speed(config.speed);
        let renderer = RasterRenderer::new(config.canvas_size(), dataset.grid().extent);

        info!(
            dataset = %dataset.name(),
            variables = dataset.variables().len(),
            steps = dataset.step_count(),
            "Session opened"
        );

        Ok(Self {
            dataset,
            provider,
            controller,
            settings: config.visualization.clone(),
            variable,
            level,
            renderer,
            frames: FrameCache::new(config.frame_cache_capacity),
        })
    }

    /// Replace the dataset and its provider.
    ///
    /// Playback is reset to a stopped state at step 0 and the old timer is
    /// cancelled before this returns. The speed and visualization settings
    /// carry over; the variable selection carries over when the new dataset
    /// has a variable of the same name.
    #[instrument(skip_all, fields(dataset = %dataset.name()))]
    pub fn load_dataset(&mut self, dataset: Arc<Dataset>, provider: Arc<dyn FieldProvider>) -> VizResult<()> {
        let speed = self.controller.snapshot().speed();
        let controller = PlaybackController::new(dataset.step_count())?.with_speed(speed);

        let (variable, level) = match dataset.variable(&self.variable) {
            Some(var) => (var.name.clone(), var.nearest_level(self.level)),
            None => {
                let first = dataset.variables().first().ok_or_else(|| {
                    VizError::InvalidDataset("dataset has no variables".to_string())
                })?;
                (first.name.clone(), first.default_level())
            }
        };

        // Dropping the old controller cancels its timer
        self.controller = controller;
        self.renderer = RasterRenderer::new(self.renderer.canvas(), dataset.grid().extent);
        self.frames.clear();
        self.dataset = dataset;
        self.provider = provider;
        self.variable = variable;
        self.level = level;

        info!(variable = %self.variable, level = self.level, "Dataset loaded");
        Ok(())
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.controller.snapshot()
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn settings(&self) -> &VisualizationSettings {
        &self.settings
    }

    /// Select a variable. The current level snaps to the nearest one the
    /// variable offers.
    pub fn select_variable(&mut self, name: &str) -> VizResult<()> {
        let var = self.dataset.require_variable(name)?;
        self.level = var.nearest_level(self.level);
        self.variable = var.name.clone();
        debug!(variable = %self.variable, level = self.level, "Variable selected");
        Ok(())
    }

    /// Select the level closest to `level`. Returns the level actually used.
    pub fn select_level(&mut self, level: f64) -> VizResult<f64> {
        let var = self.dataset.require_variable(&self.variable)?;
        self.level = var.nearest_level(level);
        Ok(self.level)
    }

    pub fn set_settings(&mut self, settings: VisualizationSettings) -> VizResult<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Pick a colormap by name. Unknown names fall back to grayscale.
    pub fn set_colormap(&mut self, name: &str) -> Colormap {
        self.settings.colormap = Colormap::lookup(name);
        self.settings.colormap
    }

    /// Render the frame for the current playback step.
    pub fn render_current(&mut self) -> VizResult<Frame> {
        let step = self.controller.snapshot().current_step();
        self.render_step(step)
    }

    /// Render the frame for `time_step` with the current selection and settings.
    ///
    /// A field that is missing or still decoding yields a placeholder frame
    /// instead of an error.
    pub fn render_step(&mut self, time_step: usize) -> VizResult<Frame> {
        let var = self.dataset.require_variable(&self.variable)?;
        let range = var.value_range;
        let time_step = time_step.min(self.dataset.step_count().saturating_sub(1));
        let valid_time = self.dataset.time_axis().label(time_step);

        let key = FrameKey::new(
            self.dataset.id(),
            self.variable.clone(),
            time_step,
            self.level,
            self.settings.clone(),
        );

        let frame = |image, status| Frame {
            image,
            variable: key.variable.clone(),
            level: key.level(),
            time_step,
            valid_time: valid_time.clone(),
            status,
        };

        if let Some(image) = self.frames.get(&key) {
            return Ok(frame(image, FrameStatus::Cached));
        }

        match self.provider.get_field(&self.variable, time_step, self.level) {
            Ok(field) => {
                let image = Arc::new(self.renderer.render(&field, &range, &self.settings, time_step));
                self.frames.insert(key.clone(), image.clone());
                counter!("frames_rendered_total").increment(1);
                Ok(frame(image, FrameStatus::Rendered))
            }
            Err(err) if err.is_frame_recoverable() => {
                counter!("frames_placeholder_total").increment(1);
                warn!(error = %err, time_step, "Field unavailable, showing placeholder");
                Ok(frame(
                    Arc::new(self.renderer.placeholder()),
                    FrameStatus::Placeholder {
                        reason: err.to_string(),
                    },
                ))
            }
            Err(err) => Err(err),
        }
    }

    /// Render the current frame and hand it to `exporter` under the
    /// default `<variable>_<timestep>.png` name.
    #[instrument(skip_all, fields(variable = %self.variable))]
    pub fn export_current(&mut self, exporter: &dyn FrameExporter) -> VizResult<PathBuf> {
        let frame = self.render_current()?;
        exporter.export(&frame.image, &default_file_name(&frame.variable, frame.time_step))
    }

    pub fn cached_frames(&self) -> usize {
        self.frames.len()
    }
}
