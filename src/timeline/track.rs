use crate::foundation::core::Rect;
use crate::foundation::error::{LyricError, LyricResult};
use crate::layout::LayoutElement;
use crate::scene::style::Style;
use crate::timeline::entry::{LyricEntry, build_entries};
use crate::timeline::progress::{Phase, progress_at};
use crate::timeline::{EPSILON, FADE_SECS, RISE_PX};
use smallvec::SmallVec;

/// Parameters of the single-line fade mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimpleFadeParams {
    /// Vertical center of the line; `None` centers on the canvas.
    pub y_position: Option<i32>,
    /// Draw with the highlight color (and glow, if enabled).
    pub highlighted: bool,
}

/// Parameters of the "current line + next line preview" mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnhancedPreviewParams {
    /// Offset of the current line's center from the canvas center.
    pub current_y_offset: i32,
    /// Offset of the preview line's center from the canvas center.
    pub preview_y_offset: i32,
}

impl Default for EnhancedPreviewParams {
    fn default() -> Self {
        Self {
            current_y_offset: -50,
            preview_y_offset: 80,
        }
    }
}

/// How a track places and draws its entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayMode {
    /// One line at a time, fading in and out in place.
    SimpleFade(SimpleFadeParams),
    /// Current line plus a smaller preview of the next one.
    EnhancedPreview(EnhancedPreviewParams),
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::SimpleFade(SimpleFadeParams::default())
    }
}

impl DisplayMode {
    /// Resolve a mode by name with default parameters.
    pub fn from_name(name: &str) -> LyricResult<Self> {
        match name.trim() {
            "simple_fade" => Ok(Self::SimpleFade(SimpleFadeParams::default())),
            "enhanced_preview" => Ok(Self::EnhancedPreview(EnhancedPreviewParams::default())),
            other => Err(LyricError::config(format!(
                "unsupported display mode \"{other}\" (supported: simple_fade, enhanced_preview)"
            ))),
        }
    }

    /// Serialized name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SimpleFade(_) => "simple_fade",
            Self::EnhancedPreview(_) => "enhanced_preview",
        }
    }
}

/// Construction options for [`Track`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackOpts {
    /// Layout priority; lower values are placed first.
    pub priority: i32,
    /// Whether the layout strategy may move this track.
    pub is_flexible: bool,
    /// End of the rendered timeline; entries never extend past it.
    pub render_bound: Option<f64>,
}

impl Default for TrackOpts {
    fn default() -> Self {
        Self {
            priority: 0,
            is_flexible: true,
            render_bound: None,
        }
    }
}

/// An entry visible at a query time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleEntry<'a> {
    /// Position within [`Track::entries`].
    pub index: usize,
    /// The visible entry.
    pub entry: &'a LyricEntry,
    /// Opacity in `[0, 1]`.
    pub progress: f64,
    /// Fade phase at the queried time.
    pub phase: Phase,
}

/// Vertical slot centers of a placed track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotAnchors {
    /// Horizontal center shared by all slots.
    pub center_x: i32,
    /// Vertical center of the main line block.
    pub current_y: i32,
    /// Vertical center of the preview block (`EnhancedPreview` only).
    pub preview_y: Option<i32>,
}

/// Summary of a track, for diagnostics and the CLI.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TrackInfo {
    /// Track id.
    pub element_id: String,
    /// Display mode name.
    pub mode: &'static str,
    /// Number of kept entries.
    pub entries: usize,
    /// Largest line count of any entry.
    pub max_lines: usize,
    /// Layout priority.
    pub priority: i32,
    /// Whether layout may move the track.
    pub is_flexible: bool,
    /// Start of the first entry, in seconds.
    pub first_start: Option<f64>,
    /// End of the last entry, in seconds.
    pub last_end: Option<f64>,
}

/// One independently timed and styled sequence of lyric lines.
#[derive(Clone, Debug)]
pub struct Track {
    element_id: String,
    entries: Vec<LyricEntry>,
    style: Style,
    mode: DisplayMode,
    priority: i32,
    is_flexible: bool,
    max_lines: usize,
}

impl Track {
    /// Build a track from `(seconds, text)` pairs.
    ///
    /// Multi-line texts are newline-joined. Blank texts, bad timestamps and entries shorter than
    /// [`MIN_DURATION_SECS`](crate::timeline::MIN_DURATION_SECS) are dropped.
    pub fn new(
        element_id: impl Into<String>,
        lyrics: &[(f64, String)],
        style: Style,
        mode: DisplayMode,
        opts: TrackOpts,
    ) -> LyricResult<Self> {
        let element_id = element_id.into();
        if element_id.trim().is_empty() {
            return Err(LyricError::config("track element_id must be non-empty"));
        }
        style.validate()?;
        if let Some(bound) = opts.render_bound
            && (!bound.is_finite() || bound <= 0.0)
        {
            return Err(LyricError::config("track render_bound must be finite and > 0"));
        }

        let entries = build_entries(lyrics, opts.render_bound);
        let max_lines = entries.iter().map(LyricEntry::line_count).max().unwrap_or(0);
        tracing::debug!(
            element_id = %element_id,
            raw = lyrics.len(),
            kept = entries.len(),
            max_lines,
            "track built"
        );

        Ok(Self {
            element_id,
            entries,
            style,
            mode,
            priority: opts.priority,
            is_flexible: opts.is_flexible,
            max_lines,
        })
    }

    /// Kept entries, sorted by start time.
    pub fn entries(&self) -> &[LyricEntry] {
        &self.entries
    }

    /// Text styling.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Current display mode.
    pub fn display_mode(&self) -> DisplayMode {
        self.mode
    }

    /// Switch display mode; affects subsequent layout and render calls.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    /// Switch display mode by name with default parameters.
    pub fn set_display_mode_by_name(&mut self, name: &str) -> LyricResult<()> {
        self.mode = DisplayMode::from_name(name)?;
        Ok(())
    }

    /// Largest line count over all kept entries (0 for an empty track).
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Entries visible at `t`, ordered by start time.
    ///
    /// Entry `i` is visible while `t ∈ [start − FADE_SECS, end)` and its progress is at least
    /// [`EPSILON`]. More than one entry is returned while a fade-in overlaps a fade-out.
    pub fn visible_at(&self, t: f64) -> SmallVec<[VisibleEntry<'_>; 2]> {
        let mut out = SmallVec::new();
        if !t.is_finite() {
            return out;
        }

        // First entry whose fade-in has not started yet.
        let hi = self.entries.partition_point(|e| e.start() - FADE_SECS <= t);
        for index in (0..hi).rev() {
            let entry = &self.entries[index];
            // Ends are sorted too, so nothing earlier can still be visible.
            if entry.end() <= t {
                break;
            }
            let (progress, phase) = progress_at(t - entry.start(), entry.duration());
            if progress >= EPSILON {
                out.push(VisibleEntry {
                    index,
                    entry,
                    progress,
                    phase,
                });
            }
        }
        out.reverse();
        out
    }

    /// Entry shown in the preview slot while entry `index` is current.
    pub fn preview_for(&self, index: usize) -> Option<&LyricEntry> {
        match self.mode {
            DisplayMode::EnhancedPreview(_) => self.entries.get(index + 1),
            DisplayMode::SimpleFade(_) => None,
        }
    }

    fn block_height(&self, style: &Style) -> i32 {
        (self.max_lines.max(1) as i32) * style.line_height() as i32
    }

    /// Top and bottom of the unpadded slot blocks, plus their centers, before layout.
    fn natural_slots(&self, video_height: u32) -> (i32, i32, i32, Option<i32>) {
        let mid = (video_height / 2) as i32;
        match self.mode {
            DisplayMode::SimpleFade(p) => {
                let center = p.y_position.unwrap_or(mid);
                let bh = self.block_height(&self.style);
                let top = center - bh / 2;
                (top, top + bh, center, None)
            }
            DisplayMode::EnhancedPreview(p) => {
                let cur_center = mid + p.current_y_offset;
                let prev_center = mid + p.preview_y_offset;
                let cur_h = self.block_height(&self.style);
                let prev_h = self.block_height(&self.style.preview());
                let cur_top = cur_center - cur_h / 2;
                let prev_top = prev_center - prev_h / 2;
                (
                    cur_top.min(prev_top),
                    (cur_top + cur_h).max(prev_top + prev_h),
                    cur_center,
                    Some(prev_center),
                )
            }
        }
    }

    /// Slot centers for a track placed at `assigned`.
    ///
    /// The slots move rigidly with the rect: their offsets from its top edge match the
    /// unplaced required rect.
    pub fn anchors(&self, assigned: &Rect, video_height: u32) -> SlotAnchors {
        let (top, _, current, preview) = self.natural_slots(video_height);
        let dy = assigned.y() - (top - RISE_PX);
        SlotAnchors {
            center_x: assigned.center().0,
            current_y: current + dy,
            preview_y: preview.map(|p| p + dy),
        }
    }

    /// Summary for diagnostics.
    pub fn info(&self) -> TrackInfo {
        TrackInfo {
            element_id: self.element_id.clone(),
            mode: self.mode.name(),
            entries: self.entries.len(),
            max_lines: self.max_lines,
            priority: self.priority,
            is_flexible: self.is_flexible,
            first_start: self.entries.first().map(LyricEntry::start),
            last_end: self.entries.last().map(LyricEntry::end),
        }
    }
}

impl LayoutElement for Track {
    fn element_id(&self) -> &str {
        &self.element_id
    }

    fn required_rect(&self, video_width: u32, video_height: u32) -> LyricResult<Rect> {
        if video_width == 0 || video_height == 0 {
            return Err(LyricError::config("video dimensions must be > 0"));
        }
        let (top, bottom, _, _) = self.natural_slots(video_height);
        Rect::new(
            0,
            top - RISE_PX,
            video_width as i32,
            (bottom - top) + 2 * RISE_PX,
        )
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_flexible(&self) -> bool {
        self.is_flexible
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/track.rs"]
mod tests;
