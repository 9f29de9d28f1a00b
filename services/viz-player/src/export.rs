//! Frame export.

use std::ops::Range;
use std::path::{Path, PathBuf};

use renderer::png::encode_frame;
use renderer::RasterImage;
use tracing::{info, instrument};
use viz_common::{VizError, VizResult};

/// Sink for rendered frames.
pub trait FrameExporter {
    /// Write `image`, using `name_hint` to pick the output name.
    /// Returns where the frame was written.
    fn export(&self, image: &RasterImage, name_hint: &str) -> VizResult<PathBuf>;
}

/// Default export name for a frame: `<variable>_<timestep>.png`.
pub fn default_file_name(variable: &str, time_step: usize) -> String {
    format!("{}_{}.png", variable, time_step)
}

/// Steps still to export when playback has moved to `current`.
///
/// Watch-style subscribers only see the latest step, so a slow export can
/// miss ticks; every step passed since `last_exported` is returned in order.
/// Moving backwards (seek, wrap) restarts from `current` alone.
pub fn steps_to_export(last_exported: Option<usize>, current: usize) -> Range<usize> {
    match last_exported {
        Some(last) if current > last => last + 1..current + 1,
        Some(last) if current == last => current..current,
        _ => current..current + 1,
    }
}

/// Writes frames as PNG files into a directory.
#[derive(Debug, Clone)]
pub struct PngFileExporter {
    dir: PathBuf,
}

impl PngFileExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output path for a name hint. Only the final path component is kept
    /// and a `.png` extension is added if missing.
    pub fn path_for(&self, name_hint: &str) -> VizResult<PathBuf> {
        let name = Path::new(name_hint)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| VizError::ExportError(format!("invalid file name hint: {:?}", name_hint)))?;

        let mut path = self.dir.join(name);
        if path.extension().map_or(true, |ext| !ext.eq_ignore_ascii_case("png")) {
            path.set_file_name(format!("{}.png", name));
        }
        Ok(path)
    }
}

impl FrameExporter for PngFileExporter {
    #[instrument(skip(self, image), fields(dir = %self.dir.display()))]
    fn export(&self, image: &RasterImage, name_hint: &str) -> VizResult<PathBuf> {
        let path = self.path_for(name_hint)?;
        let png = encode_frame(image)?;

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            VizError::ExportError(format!("failed to create {}: {}", self.dir.display(), e))
        })?;
        std::fs::write(&path, &png).map_err(|e| {
            VizError::ExportError(format!("failed to write {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), bytes = png.len(), "Exported frame");
        Ok(path)
    }
}
