pub(crate) mod entry;
pub(crate) mod progress;
pub(crate) mod track;

/// Fade-in / fade-out duration in seconds.
pub const FADE_SECS: f64 = 0.3;
/// Vertical travel of the rise animation in pixels.
pub const RISE_PX: i32 = 40;
/// Entries below this progress are not drawn.
pub const EPSILON: f64 = 0.001;
/// Entries shorter than this are dropped during preprocessing.
pub const MIN_DURATION_SECS: f64 = 0.01;
/// Duration of the last entry when the track has no render bound.
pub const DEFAULT_LAST_DURATION_SECS: f64 = 3.0;
