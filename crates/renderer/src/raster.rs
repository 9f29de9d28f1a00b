//! Raster renderer: field + settings to an RGBA pixel buffer.

use tracing::{debug, instrument};
use viz_common::{Field, GridExtent, ValueRange, VisualizationSettings};

use crate::contour;
use crate::gradient::{self, Resampling};
use crate::overlay;

/// Output canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasSize {
    pub width: usize,
    pub height: usize,
}

impl CanvasSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(800, 400)
    }
}

/// An RGBA image, 4 bytes per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// A fully transparent image.
    pub fn transparent(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width * height * 4],
        }
    }

    pub fn empty() -> Self {
        Self::transparent(0, 0)
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width * height * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some(&mut self.pixels[idx..idx + 4])
    }
}

/// Renders fields of one dataset grid onto a fixed-size canvas.
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    canvas: CanvasSize,
    extent: GridExtent,
}

impl RasterRenderer {
    pub fn new(canvas: CanvasSize, extent: GridExtent) -> Self {
        Self { canvas, extent }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn extent(&self) -> &GridExtent {
        &self.extent
    }

    /// Render one frame.
    ///
    /// The output depends only on the arguments, so identical inputs give
    /// byte-identical buffers. A zero-sized canvas yields an empty image.
    #[instrument(level = "debug", skip(self, field, settings), fields(nx = field.nx(), ny = field.ny()))]
    pub fn render(
        &self,
        field: &Field,
        range: &ValueRange,
        settings: &VisualizationSettings,
        time_step: usize,
    ) -> RasterImage {
        let CanvasSize { width, height } = self.canvas;
        if self.canvas.is_empty() {
            return RasterImage::empty();
        }

        let mut norm = gradient::resample_field(
            field,
            width,
            height,
            Resampling::from_smoothing(settings.smoothing),
        );
        gradient::normalize_samples(&mut norm, range);

        let pixels = gradient::colorize(&norm, width, settings.colormap, settings.alpha());
        let mut image = RasterImage {
            width,
            height,
            pixels,
        };

        if settings.show_grid {
            let lines = overlay::draw_graticule(
                &mut image,
                &self.extent,
                overlay::GRATICULE_STEP_DEG,
                overlay::GRID_COLOR,
            );
            debug!(lines, "Drew graticule");
        }

        if settings.show_contours && settings.contour_levels > 0 {
            let levels = contour::contour_levels(settings.contour_levels);
            let bands = contour::trace_bands(&norm, width, height, &levels);
            overlay::draw_contour_bands(&mut image, &bands, overlay::CONTOUR_COLOR);
            debug!(
                bands = bands.len(),
                segments = bands.iter().map(|b| b.segments.len()).sum::<usize>(),
                "Drew contour bands"
            );
        }

        image
    }

    /// Placeholder frame shown when a field cannot be supplied.
    pub fn placeholder(&self) -> RasterImage {
        RasterImage::transparent(self.canvas.width, self.canvas.height)
    }
}
