use crate::scene::style::AnimationKind;
use crate::timeline::{FADE_SECS, RISE_PX};

/// Where an entry is within its visibility window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Opacity rising from zero.
    FadeIn,
    /// Fully visible.
    Hold,
    /// Opacity falling to zero.
    FadeOut,
}

/// Animation progress in `[0, 1]` for an entry of duration `duration`, queried `rel` seconds
/// after its start.
pub fn progress_at(rel: f64, duration: f64) -> (f64, Phase) {
    let a = FADE_SECS;
    if rel < 0.0 {
        return (((rel + a) / a).clamp(0.0, 1.0), Phase::FadeIn);
    }
    let fade_out_start = duration - a;
    if rel <= fade_out_start {
        (1.0, Phase::Hold)
    } else {
        (
            (1.0 - (rel - fade_out_start) / a).clamp(0.0, 1.0),
            Phase::FadeOut,
        )
    }
}

/// Vertical draw offset in pixels (positive is down).
///
/// Lines rise into place from below while fading in and keep rising while fading out.
pub fn rise_offset(progress: f64, phase: Phase, animation: AnimationKind) -> i32 {
    if animation == AnimationKind::Static {
        return 0;
    }
    let magnitude = (f64::from(RISE_PX) * (1.0 - progress.clamp(0.0, 1.0))).round() as i32;
    match phase {
        Phase::FadeIn => magnitude,
        Phase::Hold => 0,
        Phase::FadeOut => -magnitude,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/progress.rs"]
mod tests;
