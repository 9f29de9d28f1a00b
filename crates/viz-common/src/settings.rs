//! Visualization settings and playback speed.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{VizError, VizResult};

/// Recommended bounds for the number of contour levels.
pub const RECOMMENDED_CONTOUR_LEVELS: (u32, u32) = (5, 20);

/// Hard upper bound on contour levels.
pub const MAX_CONTOUR_LEVELS: u32 = 64;

/// Named colormaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    Viridis,
    Plasma,
    Coolwarm,
    Rainbow,
    Temperature,
    Precipitation,
    Grayscale,
}

impl Colormap {
    /// Colormaps offered in a picker, in display order.
    pub fn all() -> &'static [Colormap] {
        &[
            Colormap::Viridis,
            Colormap::Plasma,
            Colormap::Coolwarm,
            Colormap::Rainbow,
            Colormap::Temperature,
            Colormap::Precipitation,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Viridis => "viridis",
            Colormap::Plasma => "plasma",
            Colormap::Coolwarm => "coolwarm",
            Colormap::Rainbow => "rainbow",
            Colormap::Temperature => "temperature",
            Colormap::Precipitation => "precipitation",
            Colormap::Grayscale => "grayscale",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Colormap::Viridis => "Viridis",
            Colormap::Plasma => "Plasma",
            Colormap::Coolwarm => "Cool Warm",
            Colormap::Rainbow => "Rainbow",
            Colormap::Temperature => "Temperature",
            Colormap::Precipitation => "Precipitation",
            Colormap::Grayscale => "Grayscale",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Colormap::Viridis => "Purple to yellow",
            Colormap::Plasma => "Purple to pink to yellow",
            Colormap::Coolwarm => "Blue to white to red",
            Colormap::Rainbow => "Full spectrum",
            Colormap::Temperature => "Blue to red",
            Colormap::Precipitation => "White to blue",
            Colormap::Grayscale => "Black to white",
        }
    }

    /// Resolve a colormap name, falling back to grayscale for unknown names.
    pub fn lookup(name: &str) -> Colormap {
        match name.parse() {
            Ok(cmap) => cmap,
            Err(_) => {
                warn!(colormap = %name, "Unknown colormap, falling back to grayscale");
                Colormap::Grayscale
            }
        }
    }
}

impl FromStr for Colormap {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viridis" => Ok(Colormap::Viridis),
            "plasma" => Ok(Colormap::Plasma),
            "coolwarm" | "cool warm" => Ok(Colormap::Coolwarm),
            "rainbow" => Ok(Colormap::Rainbow),
            "temperature" => Ok(Colormap::Temperature),
            "precipitation" => Ok(Colormap::Precipitation),
            "grayscale" | "greyscale" | "gray" => Ok(Colormap::Grayscale),
            _ => Err(VizError::UnknownColormap(s.to_string())),
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rendering settings read by the raster renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualizationSettings {
    #[serde(default = "default_colormap")]
    pub colormap: Colormap,
    #[serde(default = "default_contour_levels")]
    pub contour_levels: u32,
    /// Transparency percentage, 0 (opaque) to 100 (invisible)
    #[serde(default)]
    pub transparency: u8,
    #[serde(default)]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub show_contours: bool,
    /// Bilinear resampling when true, nearest-neighbour otherwise
    #[serde(default = "default_true")]
    pub smoothing: bool,
}

fn default_colormap() -> Colormap {
    Colormap::Viridis
}

fn default_contour_levels() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for VisualizationSettings {
    fn default() -> Self {
        Self {
            colormap: default_colormap(),
            contour_levels: default_contour_levels(),
            transparency: 0,
            show_grid: false,
            show_contours: true,
            smoothing: true,
        }
    }
}

impl VisualizationSettings {
    pub fn validate(&self) -> VizResult<()> {
        if self.transparency > 100 {
            return Err(VizError::InvalidSetting {
                setting: "transparency".to_string(),
                message: format!("{} is outside 0..=100", self.transparency),
            });
        }
        if self.contour_levels > MAX_CONTOUR_LEVELS {
            return Err(VizError::InvalidSetting {
                setting: "contour_levels".to_string(),
                message: format!(
                    "{} exceeds the maximum of {}",
                    self.contour_levels, MAX_CONTOUR_LEVELS
                ),
            });
        }
        Ok(())
    }

    pub fn set_transparency(&mut self, percent: u8) -> VizResult<()> {
        if percent > 100 {
            return Err(VizError::InvalidSetting {
                setting: "transparency".to_string(),
                message: format!("{} is outside 0..=100", percent),
            });
        }
        self.transparency = percent;
        Ok(())
    }

    pub fn set_contour_levels(&mut self, levels: u32) -> VizResult<()> {
        if levels > MAX_CONTOUR_LEVELS {
            return Err(VizError::InvalidSetting {
                setting: "contour_levels".to_string(),
                message: format!("{} exceeds the maximum of {}", levels, MAX_CONTOUR_LEVELS),
            });
        }
        let (lo, hi) = RECOMMENDED_CONTOUR_LEVELS;
        if levels < lo || levels > hi {
            warn!(levels, lo, hi, "Contour level count outside recommended range");
        }
        self.contour_levels = levels;
        Ok(())
    }

    /// Pixel alpha for the configured transparency.
    pub fn alpha(&self) -> u8 {
        let t = self.transparency.min(100) as f32 / 100.0;
        (255.0 * (1.0 - t)).round() as u8
    }
}

/// Playback speed multiplier. Always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PlaybackSpeed(f64);

impl PlaybackSpeed {
    /// Base interval between ticks at 1×.
    pub const BASE_TICK: Duration = Duration::from_millis(1000);

    pub const HALF: PlaybackSpeed = PlaybackSpeed(0.5);
    pub const NORMAL: PlaybackSpeed = PlaybackSpeed(1.0);
    pub const DOUBLE: PlaybackSpeed = PlaybackSpeed(2.0);
    pub const QUADRUPLE: PlaybackSpeed = PlaybackSpeed(4.0);

    pub fn new(multiplier: f64) -> VizResult<Self> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(VizError::InvalidSetting {
                setting: "speed".to_string(),
                message: format!("speed multiplier must be positive, got {}", multiplier),
            });
        }
        Ok(Self(multiplier))
    }

    /// The discrete speeds offered by the playback control.
    pub fn presets() -> [PlaybackSpeed; 4] {
        [Self::HALF, Self::NORMAL, Self::DOUBLE, Self::QUADRUPLE]
    }

    pub fn multiplier(&self) -> f64 {
        self.0
    }

    /// Interval between ticks: `1000ms / multiplier`.
    pub fn tick_period(&self) -> Duration {
        Self::BASE_TICK.div_f64(self.0)
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for PlaybackSpeed {
    type Error = VizError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlaybackSpeed> for f64 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.0
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}
