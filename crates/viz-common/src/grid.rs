//! Grid geometry for regular latitude/longitude fields.

use serde::{Deserialize, Serialize};

use crate::error::{VizError, VizResult};

/// Longitudes may be written in either -180..180 or 0..360 convention.
const MAX_ABS_LONGITUDE: f64 = 360.0;

/// Upper bound on graticule lines per axis.
const MAX_GRATICULE_LINES: usize = 1024;

/// Geographic extent of a grid, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridExtent {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GridExtent {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Whole globe, -180..180 by -90..90.
    pub fn global() -> Self {
        Self::new(90.0, -90.0, 180.0, -180.0)
    }

    /// Latitude span in degrees.
    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude span in degrees, measured eastward from `west`.
    ///
    /// An extent with `east <= west` crosses the antimeridian, so 360° is
    /// added. `west == east` is read as a full circle.
    pub fn lon_span(&self) -> f64 {
        let span = self.east - self.west;
        if span <= 0.0 {
            span + 360.0
        } else {
            span
        }
    }

    /// Fraction of the way from the top (north) edge to the bottom edge.
    pub fn lat_fraction(&self, lat: f64) -> f64 {
        let span = self.lat_span();
        if span <= 0.0 {
            return 0.0;
        }
        (self.north - lat) / span
    }

    /// Fraction of the way from the west edge to the east edge.
    pub fn lon_fraction(&self, lon: f64) -> f64 {
        (lon - self.west).rem_euclid(360.0) / self.lon_span()
    }

    /// Whether every bound is finite and inside the geographic range.
    pub fn is_valid(&self) -> bool {
        let lat_ok = |v: f64| v.is_finite() && (-90.0..=90.0).contains(&v);
        let lon_ok = |v: f64| v.is_finite() && v.abs() <= MAX_ABS_LONGITUDE;
        lat_ok(self.north)
            && lat_ok(self.south)
            && lon_ok(self.east)
            && lon_ok(self.west)
            && self.north >= self.south
    }

    /// Latitudes that are multiples of `step` and lie inside the extent,
    /// north to south. At most `MAX_GRATICULE_LINES` are returned.
    pub fn graticule_latitudes(&self, step: f64) -> Vec<f64> {
        if step.is_nan() || step <= 0.0 || !self.north.is_finite() || !self.south.is_finite() {
            return vec![];
        }
        let mut lats = Vec::new();
        let mut lat = (self.north / step).floor() * step;
        while lat >= self.south - 1e-9 && lats.len() < MAX_GRATICULE_LINES {
            lats.push(lat);
            lat -= step;
        }
        lats
    }

    /// Longitudes that are multiples of `step` and lie inside the extent,
    /// west to east. Values past the antimeridian keep counting upward
    /// (e.g. 180, 210) so that they stay monotonic.
    pub fn graticule_longitudes(&self, step: f64) -> Vec<f64> {
        if step.is_nan() || step <= 0.0 || !self.west.is_finite() || !self.east.is_finite() {
            return vec![];
        }
        let end = self.west + self.lon_span();
        let mut lons = Vec::new();
        let mut lon = (self.west / step).ceil() * step;
        while lon <= end + 1e-9 && lons.len() < MAX_GRATICULE_LINES {
            lons.push(lon);
            lon += step;
        }
        lons
    }
}

/// Dimensions and extent of a dataset grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Number of points in X (longitude) direction
    pub nx: usize,
    /// Number of points in Y (latitude) direction
    pub ny: usize,
    pub extent: GridExtent,
    /// Human readable resolution, e.g. "0.25° × 0.25°"
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default = "default_projection")]
    pub projection: String,
}

fn default_projection() -> String {
    "Regular latitude-longitude".to_string()
}

impl GridGeometry {
    /// Create a grid geometry, checking dimensions and extent.
    pub fn new(nx: usize, ny: usize, extent: GridExtent) -> VizResult<Self> {
        let grid = Self {
            nx,
            ny,
            extent,
            resolution: None,
            projection: default_projection(),
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn validate(&self) -> VizResult<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(VizError::InvalidDataset(format!(
                "grid dimensions must be at least 1x1, got {}x{}",
                self.nx, self.ny
            )));
        }
        let GridExtent {
            north,
            south,
            east,
            west,
        } = self.extent;
        if !self.extent.is_valid() {
            return Err(VizError::InvalidDataset(format!(
                "grid extent N {} S {} E {} W {} is outside lat [-90, 90], lon [-360, 360] or has north below south",
                north, south, east, west
            )));
        }
        Ok(())
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.nx == 0 || self.ny == 0
    }

    /// Short description, e.g. "1440 × 721 (0.25° × 0.25°)".
    pub fn describe(&self) -> String {
        match &self.resolution {
            Some(res) => format!("{} × {} ({})", self.nx, self.ny, res),
            None => format!("{} × {}", self.nx, self.ny),
        }
    }
}
