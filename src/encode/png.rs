use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LyricError, LyricResult};
use crate::render::FrameRgb;
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Writes every frame as `<dir>/<prefix><index:06>.png`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: u64,
}

impl PngSequenceSink {
    /// Write frames into `dir`, creating it on `begin`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "frame_".to_owned(),
            cfg: None,
            last_idx: None,
            written: 0,
        }
    }

    /// Replace the `frame` file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Path a given frame is written to.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}{:06}.png", self.prefix, idx.0))
    }

    /// Frames written since the last `begin`.
    pub fn frames_written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> LyricResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(LyricError::validation("png sink width/height must be non-zero"));
        }
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> LyricResult<()> {
        let Some(cfg) = self.cfg.as_ref() else {
            return Err(LyricError::validation("png sink push_frame called before begin"));
        };
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(LyricError::validation(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(LyricError::validation(format!(
                "frames must arrive in increasing order ({} after {})",
                idx.0, last.0
            )));
        }

        let path = self.frame_path(idx);
        write_png(&path, frame)?;
        self.last_idx = Some(idx);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> LyricResult<()> {
        tracing::info!(
            frames = self.written,
            dir = %self.dir.display(),
            "png sequence written"
        );
        Ok(())
    }
}

/// Save one RGB frame as a PNG file.
pub fn write_png(path: &Path, frame: &FrameRgb) -> LyricResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
