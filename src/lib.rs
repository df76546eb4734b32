//! lyricmv lays out and composites time-synchronized lyric tracks into video frames.
//!
//! Frames are random-access: any time can be rendered in any order. The public API is built
//! around a few pieces:
//!
//! - Build [`Track`]s from `(seconds, text)` lyrics, a [`Style`] and a [`DisplayMode`]
//! - Place them with a [`LayoutEngine`]
//! - Render single frames with a [`FrameRenderer`], or stream ranges through a
//!   [`RenderSession`] into a [`FrameSink`]
//!
//! A [`Project`] loads all of the above from a JSON file.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Frame sinks.
pub mod encode;
pub(crate) mod layout;
pub(crate) mod raster;
/// CPU frame compositing.
pub mod render;
/// Project definition and track styling.
pub mod scene;
/// Range rendering.
pub mod session;
pub(crate) mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rect};
pub use crate::foundation::error::{LyricError, LyricResult};

pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::layout::engine::LayoutEngine;
pub use crate::layout::strategy::{DEFAULT_STACK_SPACING, LayoutStrategy, VerticalStackStrategy};
pub use crate::layout::{LayoutElement, LayoutResult};
pub use crate::raster::glyph_cache::{
    BLEED_PX, GLOW_RADIUS_PX, GlyphBitmap, GlyphCache, GlyphCacheStats, GlyphStyle,
    SHADOW_OFFSET_PX, WrapPolicy,
};
pub use crate::raster::text::{
    AlphaMask, BlockRasterizer, ParleyRasterizer, PlannedLine, TextPlan, TextRasterizer,
};
pub use crate::render::FrameRgb;
pub use crate::render::background::{BackgroundTreatment, load_background, prepare_background};
pub use crate::render::frame::FrameRenderer;
pub use crate::scene::project::{Project, ProjectDef, ProjectScene, TextBackend, TrackDef};
pub use crate::scene::style::{AnimationKind, Rgba8, Style};
pub use crate::session::render_session::{RenderSession, RenderSessionOpts, RenderStats};
pub use crate::timeline::entry::LyricEntry;
pub use crate::timeline::progress::{Phase, progress_at, rise_offset};
pub use crate::timeline::track::{
    DisplayMode, EnhancedPreviewParams, SimpleFadeParams, SlotAnchors, Track, TrackInfo, TrackOpts,
    VisibleEntry,
};
pub use crate::timeline::{
    DEFAULT_LAST_DURATION_SECS, EPSILON, FADE_SECS, MIN_DURATION_SECS, RISE_PX,
};
