//! Player configuration loaded from YAML.

use std::path::Path;

use renderer::CanvasSize;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use viz_common::{PlaybackSpeed, VisualizationSettings, VizError, VizResult};

/// Root configuration for a playback session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub visualization: VisualizationSettings,
    #[serde(default)]
    pub speed: PlaybackSpeed,
    /// Rendered frames kept in memory
    #[serde(default = "default_frame_cache_capacity")]
    pub frame_cache_capacity: usize,
    /// Decoded fields kept in memory by the decode queue
    #[serde(default = "default_field_cache_capacity")]
    pub field_cache_capacity: usize,
    #[serde(default = "default_decode_queue_depth")]
    pub decode_queue_depth: usize,
    /// Timesteps decoded ahead of the playhead
    #[serde(default = "default_prefetch_steps")]
    pub prefetch_steps: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        let size = CanvasSize::default();
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

fn default_frame_cache_capacity() -> usize {
    64
}

fn default_field_cache_capacity() -> usize {
    48
}

fn default_decode_queue_depth() -> usize {
    16
}

fn default_prefetch_steps() -> usize {
    2
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            visualization: VisualizationSettings::default(),
            speed: PlaybackSpeed::default(),
            frame_cache_capacity: default_frame_cache_capacity(),
            field_cache_capacity: default_field_cache_capacity(),
            decode_queue_depth: default_decode_queue_depth(),
            prefetch_steps: default_prefetch_steps(),
        }
    }
}

impl PlayerConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> VizResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VizError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&content)?;
        info!(path = %path.display(), "Loaded player config");
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> VizResult<Self> {
        let config: PlayerConfig = serde_yaml::from_str(yaml)
            .map_err(|e| VizError::ConfigError(format!("invalid player config: {}", e)))?;
        config.validate()?;
        debug!(?config, "Parsed player config");
        Ok(config)
    }

    pub fn validate(&self) -> VizResult<()> {
        self.visualization.validate()?;
        if self.frame_cache_capacity == 0 {
            return Err(VizError::ConfigError(
                "frame_cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.decode_queue_depth == 0 {
            return Err(VizError::ConfigError(
                "decode_queue_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize::new(self.canvas.width, self.canvas.height)
    }
}
