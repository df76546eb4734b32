pub(crate) mod engine;
pub(crate) mod strategy;

use crate::foundation::core::Rect;
use crate::foundation::error::LyricResult;
use std::collections::BTreeMap;

/// Anything the layout engine can place on screen.
pub trait LayoutElement: Send + Sync {
    /// Stable identifier, unique within one engine.
    fn element_id(&self) -> &str;

    /// Area the element needs on a `video_width × video_height` canvas before layout.
    fn required_rect(&self, video_width: u32, video_height: u32) -> LyricResult<Rect>;

    /// Lower values are placed first.
    fn priority(&self) -> i32;

    /// `false` pins the element to its required rect.
    fn is_flexible(&self) -> bool;
}

/// Positions assigned by one layout pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct LayoutResult {
    /// Assigned rect per element id.
    pub positions: BTreeMap<String, Rect>,
    /// Whether any placed rects overlap or leave the canvas.
    pub has_conflicts: bool,
    /// Human-readable description of each conflict.
    pub conflict_notes: Vec<String>,
}

impl LayoutResult {
    /// Assigned rect of `element_id`.
    pub fn position(&self, element_id: &str) -> Option<&Rect> {
        self.positions.get(element_id)
    }
}
