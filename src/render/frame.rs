use crate::foundation::core::{Canvas, FrameIndex, Fps, Rect};
use crate::foundation::error::{LyricError, LyricResult};
use crate::foundation::math::{StableHasher, unit_to_u8};
use crate::layout::{LayoutElement, LayoutResult};
use crate::raster::glyph_cache::{GlyphCache, GlyphStyle, track_highlighted};
use crate::render::FrameRgb;
use crate::render::composite::blend_onto_rgb_clipped;
use crate::timeline::progress::rise_offset;
use crate::timeline::track::{DisplayMode, SlotAnchors, Track};
use std::sync::Arc;

/// A track bound to its layout position, with glyph styles resolved once.
#[derive(Clone, Debug)]
struct PlacedTrack {
    track: Arc<Track>,
    /// Assigned layout rect; nothing the track draws lands outside it.
    rect: Rect,
    anchors: SlotAnchors,
    main: GlyphStyle,
    preview: Option<GlyphStyle>,
}

/// One text block to composite.
#[derive(Clone, Copy, Debug)]
struct Draw<'a> {
    text: &'a str,
    style: &'a GlyphStyle,
    center_x: i32,
    center_y: i32,
    progress: f64,
}

/// Composites visible lyric entries onto a reusable RGB frame buffer.
///
/// Frames are a pure function of `t`: any time can be rendered in any order. One renderer owns
/// one buffer; run several renderers (sharing the glyph cache) to render in parallel.
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    canvas: Canvas,
    fps: Fps,
    tracks: Vec<PlacedTrack>,
    cache: Arc<GlyphCache>,
    background: Option<Arc<FrameRgb>>,
    frame: FrameRgb,
}

impl FrameRenderer {
    /// Bind `tracks` (in compositing order) to their positions in `layout`.
    pub fn new(
        canvas: Canvas,
        fps: Fps,
        tracks: Vec<Arc<Track>>,
        layout: &LayoutResult,
        cache: Arc<GlyphCache>,
        background: Option<Arc<FrameRgb>>,
    ) -> LyricResult<Self> {
        canvas.validate()?;
        if let Some(bg) = &background
            && (bg.width != canvas.width
                || bg.height != canvas.height
                || bg.data.len() != canvas.rgb_len())
        {
            return Err(LyricError::validation(format!(
                "background is {}x{}, canvas is {}x{}",
                bg.width, bg.height, canvas.width, canvas.height
            )));
        }

        let mut placed = Vec::with_capacity(tracks.len());
        for track in tracks {
            let rect = layout.position(track.element_id()).ok_or_else(|| {
                LyricError::config(format!(
                    "track \"{}\" has no position in the layout",
                    track.element_id()
                ))
            })?;
            let anchors = track.anchors(rect, canvas.height);
            let main = cache.glyph_style(track.style(), track_highlighted(&track));
            let preview = match track.display_mode() {
                DisplayMode::EnhancedPreview(_) => {
                    Some(cache.glyph_style(&track.style().preview(), false))
                }
                DisplayMode::SimpleFade(_) => None,
            };
            placed.push(PlacedTrack {
                track,
                rect: *rect,
                anchors,
                main,
                preview,
            });
        }

        Ok(Self {
            canvas,
            fps,
            tracks: placed,
            cache,
            background,
            frame: FrameRgb::new(canvas.width, canvas.height),
        })
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Frame rate used by `render_frame_index`.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Render the frame at `t` seconds into the renderer's buffer and borrow it.
    pub fn render_frame(&mut self, t: f64) -> LyricResult<&FrameRgb> {
        if !t.is_finite() {
            return Err(LyricError::validation(format!(
                "frame time must be finite, got {t}"
            )));
        }

        let Self {
            tracks,
            cache,
            background,
            frame,
            ..
        } = self;

        match background {
            Some(bg) => frame.data.copy_from_slice(&bg.data),
            None => frame.data.fill(0),
        }

        for placed in tracks.iter() {
            for_each_draw(placed, t, |d| {
                let Some(bitmap) = cache.get(d.text, d.style) else {
                    return;
                };
                let x = d.center_x - (bitmap.width / 2) as i32;
                let y = d.center_y - (bitmap.height / 2) as i32;
                blend_onto_rgb_clipped(frame, &bitmap, x, y, d.progress, Some(&placed.rect));
            });
        }

        Ok(&self.frame)
    }

    /// Render the frame at `t` into a fresh buffer the caller owns.
    pub fn render_frame_owned(&mut self, t: f64) -> LyricResult<FrameRgb> {
        self.render_frame(t).cloned()
    }

    /// Render frame `idx` at the renderer's frame rate.
    pub fn render_frame_index(&mut self, idx: FrameIndex) -> LyricResult<&FrameRgb> {
        let t = self.fps.frame_to_secs(idx);
        self.render_frame(t)
    }

    /// Fingerprint of everything that determines the pixels at `t`.
    ///
    /// Two times with the same fingerprint render identical frames.
    pub fn frame_fingerprint(&self, t: f64) -> u64 {
        let mut h = StableHasher::new();
        for (ti, placed) in self.tracks.iter().enumerate() {
            for_each_draw(placed, t, |d| {
                h.write_u64(ti as u64);
                h.write_str(d.text);
                h.write_u64(d.style.fingerprint());
                h.write_u32(d.center_x as u32);
                h.write_u32(d.center_y as u32);
                h.write_u32(u32::from(unit_to_u8(d.progress as f32)));
            });
        }
        h.finish()
    }
}

/// Visit the text blocks of one track at `t`, start-ascending, preview after its main line.
fn for_each_draw<'a>(placed: &'a PlacedTrack, t: f64, mut f: impl FnMut(Draw<'a>)) {
    let track = placed.track.as_ref();
    let animation = track.style().animation;
    for v in track.visible_at(t) {
        let offset = rise_offset(v.progress, v.phase, animation);
        f(Draw {
            text: v.entry.text(),
            style: &placed.main,
            center_x: placed.anchors.center_x,
            center_y: placed.anchors.current_y + offset,
            progress: v.progress,
        });
        if let (Some(style), Some(preview_y), Some(next)) = (
            placed.preview.as_ref(),
            placed.anchors.preview_y,
            track.preview_for(v.index),
        ) {
            f(Draw {
                text: next.text(),
                style,
                center_x: placed.anchors.center_x,
                center_y: preview_y + offset,
                progress: v.progress,
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
