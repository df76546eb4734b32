use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
use crate::foundation::error::{LyricError, LyricResult};
use crate::layout::LayoutResult;
use crate::layout::engine::LayoutEngine;
use crate::layout::strategy::{LayoutStrategy, VerticalStackStrategy};
use crate::raster::glyph_cache::{GlyphCache, WrapPolicy};
use crate::raster::text::{BlockRasterizer, ParleyRasterizer, TextRasterizer};
use crate::render::background::{BackgroundTreatment, load_background};
use crate::render::frame::FrameRenderer;
use crate::scene::style::Style;
use crate::timeline::track::{DisplayMode, Track, TrackOpts};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// JSON shape of a lyric video project.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDef {
    /// Output size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Length of the video; also the render bound of every track.
    pub duration_secs: f64,
    /// Background image, relative to the project file.
    #[serde(default)]
    pub background: Option<PathBuf>,
    /// Dimming applied to the background image.
    #[serde(default)]
    pub background_treatment: BackgroundTreatment,
    /// Font file for text rendering, relative to the project file.
    #[serde(default)]
    pub font: Option<PathBuf>,
    /// Stacking of flexible tracks.
    #[serde(default)]
    pub layout: VerticalStackStrategy,
    /// Line wrapping for every track.
    #[serde(default)]
    pub wrap: WrapPolicy,
    /// Tracks in compositing order.
    pub tracks: Vec<TrackDef>,
}

/// One track entry of [`ProjectDef`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackDef {
    /// Unique track id, also its layout element id.
    pub id: String,
    /// Stacking order; lower is placed first.
    #[serde(default)]
    pub priority: i32,
    /// `false` keeps the track at its natural position.
    #[serde(default = "default_flexible")]
    pub flexible: bool,
    /// Text styling.
    #[serde(default)]
    pub style: Style,
    /// How entries are presented.
    #[serde(default)]
    pub mode: DisplayMode,
    /// `[seconds, "text"]` pairs; multi-line text is newline-joined.
    pub lyrics: Vec<(f64, String)>,
}

fn default_flexible() -> bool {
    true
}

/// Which rasterizer a built project uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBackend {
    /// Shape and rasterize with the project's font.
    #[default]
    Font,
    /// Font-free block glyphs, for quick previews.
    Draft,
}

/// A loaded project: the definition plus the directory its relative paths resolve against.
#[derive(Clone, Debug)]
pub struct Project {
    def: ProjectDef,
    base_dir: PathBuf,
}

/// Runtime objects built from a [`Project`].
#[derive(Debug)]
pub struct ProjectScene {
    /// Built tracks in compositing order.
    pub tracks: Vec<Arc<Track>>,
    /// Assigned track positions.
    pub layout: LayoutResult,
    /// Prewarmed glyph cache shared by every renderer.
    pub cache: Arc<GlyphCache>,
    /// Renderer bound to the tracks, layout and background.
    pub renderer: FrameRenderer,
}

impl Project {
    /// Parse a project from a JSON reader; relative paths resolve against `base_dir`.
    pub fn from_reader<R: std::io::Read>(r: R, base_dir: impl Into<PathBuf>) -> LyricResult<Self> {
        let def: ProjectDef = serde_json::from_reader(r)
            .map_err(|e| LyricError::validation(format!("parse project JSON: {e}")))?;
        Self::from_def(def, base_dir)
    }

    /// Parse a project from a JSON string; relative paths resolve against the working directory.
    pub fn from_json(s: &str) -> LyricResult<Self> {
        Self::from_reader(s.as_bytes(), ".")
    }

    /// Parse a project file; relative paths resolve against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> LyricResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LyricError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::from_reader(BufReader::new(f), base_dir)
    }

    /// Wrap an already parsed definition; relative paths resolve against `base_dir`.
    pub fn from_def(def: ProjectDef, base_dir: impl Into<PathBuf>) -> LyricResult<Self> {
        let project = Self {
            def,
            base_dir: base_dir.into(),
        };
        project.validate()?;
        Ok(project)
    }

    /// The parsed definition.
    pub fn def(&self) -> &ProjectDef {
        &self.def
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.def.canvas
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.def.fps
    }

    /// Number of frames covering `duration_secs`.
    pub fn duration_frames(&self) -> u64 {
        self.def.fps.secs_to_frames_ceil(self.def.duration_secs)
    }

    /// The whole video as a frame range.
    pub fn frame_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.duration_frames()),
        }
    }

    /// Resolve a project-relative path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn validate(&self) -> LyricResult<()> {
        let def = &self.def;
        Canvas::new(def.canvas.width, def.canvas.height)?;
        Fps::new(def.fps.num, def.fps.den)?;
        if !def.duration_secs.is_finite() || def.duration_secs <= 0.0 {
            return Err(LyricError::validation(format!(
                "project duration_secs must be finite and > 0, got {}",
                def.duration_secs
            )));
        }
        def.background_treatment.validate()?;
        if def.tracks.is_empty() {
            return Err(LyricError::validation("project must define at least one track"));
        }
        let mut seen = HashSet::new();
        for t in &def.tracks {
            if !seen.insert(t.id.as_str()) {
                return Err(LyricError::config(format!("duplicate track id \"{}\"", t.id)));
            }
            t.style.validate()?;
        }
        Ok(())
    }

    /// Build every track, bounded by the project duration, in definition order.
    pub fn build_tracks(&self) -> LyricResult<Vec<Arc<Track>>> {
        self.def
            .tracks
            .iter()
            .map(|t| {
                let opts = TrackOpts {
                    priority: t.priority,
                    is_flexible: t.flexible,
                    render_bound: Some(self.def.duration_secs),
                };
                Track::new(t.id.clone(), &t.lyrics, t.style, t.mode, opts).map(Arc::new)
            })
            .collect()
    }

    /// Register `tracks` with a layout engine using the project's layout settings.
    pub fn layout_engine(&self, tracks: &[Arc<Track>]) -> LyricResult<LayoutEngine> {
        let mut engine = LayoutEngine::new(LayoutStrategy::VerticalStack(self.def.layout));
        for t in tracks {
            engine.add_element(t.clone())?;
        }
        Ok(engine)
    }

    fn rasterizer(&self, backend: TextBackend) -> LyricResult<Arc<dyn TextRasterizer>> {
        match backend {
            TextBackend::Draft => Ok(Arc::new(BlockRasterizer)),
            TextBackend::Font => {
                let Some(font) = self.def.font.as_deref() else {
                    return Err(LyricError::config(
                        "project has no \"font\"; set one or use the draft text backend",
                    ));
                };
                let path = self.resolve(font);
                let bytes = std::fs::read(&path).map_err(|e| {
                    LyricError::config(format!("read font '{}': {e}", path.display()))
                })?;
                Ok(Arc::new(ParleyRasterizer::new(bytes)?))
            }
        }
    }

    /// Build tracks, lay them out, warm the glyph cache and assemble a renderer.
    #[tracing::instrument(skip(self))]
    pub fn build(&self, backend: TextBackend) -> LyricResult<ProjectScene> {
        let canvas = self.canvas();
        let tracks = self.build_tracks()?;
        let layout = self
            .layout_engine(&tracks)?
            .compute_layout(canvas.width, canvas.height)?;
        for note in &layout.conflict_notes {
            tracing::warn!(note = %note, "layout conflict");
        }

        let cache = Arc::new(GlyphCache::with_wrap(self.rasterizer(backend)?, self.def.wrap));
        for t in &tracks {
            cache.prewarm(t);
        }

        let background = match self.def.background.as_deref() {
            Some(p) => Some(Arc::new(load_background(
                &self.resolve(p),
                canvas,
                &self.def.background_treatment,
            )?)),
            None => None,
        };

        let renderer = FrameRenderer::new(
            canvas,
            self.fps(),
            tracks.clone(),
            &layout,
            cache.clone(),
            background,
        )?;
        tracing::info!(
            tracks = tracks.len(),
            conflicts = layout.has_conflicts,
            glyphs = cache.stats().entries,
            "project built"
        );

        Ok(ProjectScene {
            tracks,
            layout,
            cache,
            renderer,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/project.rs"]
mod tests;
