//! Raster rendering for gridded fields.
//!
//! - Colormaps (normalized value to RGB)
//! - Base raster: resampling, normalization, colorizing
//! - Contour bands (marching squares)
//! - Graticule and contour overlays
//! - PNG encoding

pub mod colormap;
pub mod contour;
pub mod gradient;
pub mod overlay;
pub mod png;
pub mod raster;

pub use colormap::{map, map_named, Rgb};
pub use raster::{CanvasSize, RasterImage, RasterRenderer};
