use crate::foundation::error::{LyricError, LyricResult};
use crate::foundation::math::StableHasher;
use crate::layout::LayoutElement;
use crate::raster::blur::blur_mask;
use crate::raster::text::{AlphaMask, PlannedLine, TextPlan, TextRasterizer};
use crate::render::composite::{PremulRgba8, over, tint};
use crate::scene::style::{Rgba8, Style};
use crate::timeline::track::{DisplayMode, Track};
use parking_lot::RwLock;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicU64, Ordering};

/// Drop shadow offset in pixels, right and down.
pub const SHADOW_OFFSET_PX: i32 = 3;
/// Blur radius of the highlight glow.
pub const GLOW_RADIUS_PX: u32 = 8;
/// Transparent margin around the text block holding the shadow and glow.
pub const BLEED_PX: u32 = GLOW_RADIUS_PX + 4;

/// How lines wider than the available width are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WrapPolicy {
    /// Lines are rendered as given; the renderer clips anything off-canvas.
    #[default]
    None,
    /// Break lines between characters so no line exceeds `max_width` pixels.
    Chars {
        /// Maximum line width in pixels.
        max_width: u32,
    },
}

/// Everything that affects the pixels of a rasterized text block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphStyle {
    /// Font size in pixels.
    pub font_size: u32,
    /// Line box height in pixels.
    pub line_height: u32,
    /// Text fill color.
    pub main: Rgba8,
    /// Drop shadow color.
    pub shadow: Rgba8,
    /// Glow color, when the glow layer is drawn.
    pub glow: Option<Rgba8>,
    /// Wrapping applied before layout.
    pub wrap: WrapPolicy,
}

impl GlyphStyle {
    /// Resolve the colors a track style uses for normal or highlighted lines.
    pub fn from_style(style: &Style, highlighted: bool, wrap: WrapPolicy) -> Self {
        Self {
            font_size: style.font_size,
            line_height: style.line_height(),
            main: if highlighted {
                style.highlight_color
            } else {
                style.font_color
            },
            shadow: style.shadow_color,
            glow: (highlighted && style.glow_enabled).then_some(style.highlight_color),
            wrap,
        }
    }

    /// Stable 64-bit fingerprint, used in frame fingerprints and diagnostics.
    pub fn fingerprint(&self) -> u64 {
        let mut h = StableHasher::new();
        h.write_u32(self.font_size);
        h.write_u32(self.line_height);
        write_color(&mut h, self.main);
        write_color(&mut h, self.shadow);
        match self.glow {
            Some(c) => {
                h.write_u8(1);
                write_color(&mut h, c);
            }
            None => h.write_u8(0),
        }
        match self.wrap {
            WrapPolicy::None => h.write_u8(0),
            WrapPolicy::Chars { max_width } => {
                h.write_u8(1);
                h.write_u32(max_width);
            }
        }
        h.finish()
    }
}

fn write_color(h: &mut StableHasher, c: Rgba8) {
    h.write_bytes(&[c.r, c.g, c.b, c.a]);
}

/// A rasterized text block: premultiplied RGBA8, row-major, no padding between rows.
///
/// The text is centered in the bitmap with a symmetric [`BLEED_PX`] margin, so the bitmap
/// center is the text block center.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Width in pixels, bleed included.
    pub width: u32,
    /// Height in pixels, bleed included.
    pub height: u32,
    /// `width × height × 4` bytes.
    pub data: Vec<u8>,
}

/// Cache counters, monotonically increasing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct GlyphCacheStats {
    /// Lookups answered from an existing entry.
    pub hits: u64,
    /// Lookups that had to create or wait for an entry.
    pub misses: u64,
    /// Rasterizer invocations.
    pub rasterizations: u64,
    /// Entries holding a finished result.
    pub entries: u64,
}

type Slot = Option<Arc<GlyphBitmap>>;
type Cell = Arc<OnceLock<Slot>>;

/// Shared cache of rasterized text blocks keyed by `(style, text)`.
///
/// Readers take a shared lock. Each key owns a once-cell: concurrent misses on the same key
/// wait for a single rasterization, while different keys rasterize in parallel.
pub struct GlyphCache {
    rasterizer: Arc<dyn TextRasterizer>,
    wrap: WrapPolicy,
    map: RwLock<HashMap<GlyphStyle, HashMap<String, Cell>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    rasterizations: AtomicU64,
}

impl std::fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCache")
            .field("wrap", &self.wrap)
            .field("stats", &self.stats())
            .finish()
    }
}

impl GlyphCache {
    /// Cache without wrapping.
    pub fn new(rasterizer: Arc<dyn TextRasterizer>) -> Self {
        Self::with_wrap(rasterizer, WrapPolicy::None)
    }

    /// Cache applying `wrap` to every text block.
    pub fn with_wrap(rasterizer: Arc<dyn TextRasterizer>, wrap: WrapPolicy) -> Self {
        Self {
            rasterizer,
            wrap,
            map: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            rasterizations: AtomicU64::new(0),
        }
    }

    /// Wrap policy baked into this cache's glyph styles.
    pub fn wrap_policy(&self) -> WrapPolicy {
        self.wrap
    }

    /// Glyph style for a track style under this cache's wrap policy.
    pub fn glyph_style(&self, style: &Style, highlighted: bool) -> GlyphStyle {
        GlyphStyle::from_style(style, highlighted, self.wrap)
    }

    /// Bitmap for `text`, rasterizing on first use.
    ///
    /// Returns `None` for text with nothing to draw, or when rasterization failed (logged once).
    pub fn get(&self, text: &str, style: &GlyphStyle) -> Option<Arc<GlyphBitmap>> {
        let cell = self.map.read().get(style).and_then(|m| m.get(text)).cloned();
        if let Some(slot) = cell.as_ref().and_then(|c| c.get()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return slot.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let cell = match cell {
            Some(cell) => cell,
            None => self
                .map
                .write()
                .entry(*style)
                .or_default()
                .entry(text.to_owned())
                .or_default()
                .clone(),
        };
        cell.get_or_init(|| {
            self.rasterizations.fetch_add(1, Ordering::Relaxed);
            match rasterize(self.rasterizer.as_ref(), text, style) {
                Ok(bitmap) => bitmap.map(Arc::new),
                Err(err) => {
                    tracing::warn!(
                        text,
                        style = style.fingerprint(),
                        error = %err,
                        "rasterization failed, drawing nothing"
                    );
                    None
                }
            }
        })
        .clone()
    }

    /// Rasterize every text block `track` can show.
    #[tracing::instrument(skip(self, track), fields(track = track.element_id()))]
    pub fn prewarm(&self, track: &Track) {
        let main = self.glyph_style(track.style(), track_highlighted(track));
        let preview = self.glyph_style(&track.style().preview(), false);
        let has_preview = matches!(track.display_mode(), DisplayMode::EnhancedPreview(_));

        track.entries().par_iter().for_each(|entry| {
            let _ = self.get(entry.text(), &main);
            if has_preview {
                let _ = self.get(entry.text(), &preview);
            }
        });
        tracing::debug!(entries = track.entries().len(), "glyph cache prewarmed");
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> GlyphCacheStats {
        let entries = self
            .map
            .read()
            .values()
            .flat_map(|m| m.values())
            .filter(|cell| cell.get().is_some())
            .count() as u64;
        GlyphCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            rasterizations: self.rasterizations.load(Ordering::Relaxed),
            entries,
        }
    }
}

/// Whether a track's main slot draws in the highlight style.
pub(crate) fn track_highlighted(track: &Track) -> bool {
    match track.display_mode() {
        DisplayMode::SimpleFade(p) => p.highlighted,
        DisplayMode::EnhancedPreview(_) => true,
    }
}

/// Break `line` into pieces no wider than `max_width`, keeping at least one char per piece.
///
/// Each piece is the longest fitting prefix, found by bisecting over char boundaries.
fn wrap_chars(
    rasterizer: &dyn TextRasterizer,
    line: &str,
    font_size: u32,
    max_width: u32,
) -> LyricResult<Vec<String>> {
    let fits = |s: &str| -> LyricResult<bool> {
        Ok(rasterizer.measure_line(s.trim_end(), font_size)? <= max_width)
    };
    if fits(line)? {
        return Ok(vec![line.to_owned()]);
    }

    let mut out = Vec::new();
    let mut rest = line;
    while !rest.trim().is_empty() {
        if fits(rest)? {
            out.push(rest.trim_end().to_owned());
            break;
        }
        let ends: Vec<usize> = rest.char_indices().map(|(i, c)| i + c.len_utf8()).collect();
        // `ends[hi]` never fits; `ends[lo]` fits or is the one-char minimum.
        let (mut lo, mut hi) = (0, ends.len() - 1);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if fits(&rest[..ends[mid]])? {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let (piece, tail) = rest.split_at(ends[lo]);
        if !piece.trim().is_empty() {
            out.push(piece.trim_end().to_owned());
        }
        rest = tail.trim_start();
    }
    Ok(out)
}

fn rasterize(
    rasterizer: &dyn TextRasterizer,
    text: &str,
    style: &GlyphStyle,
) -> LyricResult<Option<GlyphBitmap>> {
    let mut lines = Vec::new();
    for line in text.split('\n') {
        match style.wrap {
            WrapPolicy::None => lines.push(line.to_owned()),
            WrapPolicy::Chars { max_width } => {
                lines.extend(wrap_chars(rasterizer, line, style.font_size, max_width)?)
            }
        }
    }

    let widths = lines
        .iter()
        .map(|l| rasterizer.measure_line(l, style.font_size))
        .collect::<LyricResult<Vec<u32>>>()?;
    let block_w = widths.iter().copied().max().unwrap_or(0);
    let block_h = (lines.len() as u32).saturating_mul(style.line_height);
    if block_w == 0 || block_h == 0 {
        return Ok(None);
    }

    let width = block_w
        .checked_add(2 * BLEED_PX)
        .ok_or_else(|| LyricError::render("text block width overflow"))?;
    let height = block_h
        .checked_add(2 * BLEED_PX)
        .ok_or_else(|| LyricError::render("text block height overflow"))?;

    let plan = TextPlan {
        font_size: style.font_size,
        line_height: style.line_height,
        width,
        height,
        lines: lines
            .into_iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (text, w))| PlannedLine {
                text,
                x: BLEED_PX + (block_w - w) / 2,
                top: BLEED_PX + (i as u32) * style.line_height,
                width: w,
            })
            .collect(),
    };
    let mask = rasterizer.paint(&plan)?;
    if mask.width != width || mask.height != height {
        return Err(LyricError::render(format!(
            "rasterizer returned {}x{} mask for {}x{} plan",
            mask.width, mask.height, width, height
        )));
    }
    if mask.data.iter().all(|&v| v == 0) {
        return Ok(None);
    }

    Ok(Some(compose_layers(&mask, style)?))
}

/// Stack glow, shadow and main text into one premultiplied bitmap.
fn compose_layers(mask: &AlphaMask, style: &GlyphStyle) -> LyricResult<GlyphBitmap> {
    let glow = match style.glow {
        Some(color) => Some((blur_mask(mask, GLOW_RADIUS_PX, GLOW_RADIUS_PX as f32 / 2.0)?, color)),
        None => None,
    };

    let mut data = Vec::with_capacity((mask.width as usize) * (mask.height as usize) * 4);
    let off = i64::from(SHADOW_OFFSET_PX);
    for y in 0..i64::from(mask.height) {
        for x in 0..i64::from(mask.width) {
            let mut px: PremulRgba8 = [0; 4];
            if let Some((glow_mask, color)) = &glow {
                px = over(px, tint(*color, glow_mask.get(x, y)), 0.5);
            }
            px = over(px, tint(style.shadow, mask.get(x - off, y - off)), 1.0);
            px = over(px, tint(style.main, mask.get(x, y)), 1.0);
            data.extend_from_slice(&px);
        }
    }

    Ok(GlyphBitmap {
        width: mask.width,
        height: mask.height,
        data,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/raster/glyph_cache.rs"]
mod tests;
