use crate::foundation::core::Rect;
use crate::foundation::error::LyricResult;
use crate::layout::{LayoutElement, LayoutResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default vertical gap between stacked elements.
pub const DEFAULT_STACK_SPACING: i32 = 20;

/// Stack flexible elements top-to-bottom in priority order, centered as a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerticalStackStrategy {
    /// Vertical gap between stacked elements.
    pub spacing: i32,
    /// Top of the stack; `None` centers the stack vertically.
    pub start_y: Option<i32>,
}

impl Default for VerticalStackStrategy {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_STACK_SPACING,
            start_y: None,
        }
    }
}

impl VerticalStackStrategy {
    /// Place `elements` on a `video_width × video_height` canvas.
    pub fn compute(
        &self,
        elements: &[Arc<dyn LayoutElement>],
        video_width: u32,
        video_height: u32,
    ) -> LyricResult<LayoutResult> {
        let mut placed: Vec<(&str, Rect, bool)> = Vec::with_capacity(elements.len());
        for el in elements {
            let rect = el.required_rect(video_width, video_height)?;
            placed.push((el.element_id(), rect, el.is_flexible()));
        }

        // Stable sort keeps registration order among equal priorities.
        let mut order: Vec<usize> = (0..elements.len()).collect();
        order.sort_by_key(|&i| elements[i].priority());

        let stacked: Vec<usize> = order.into_iter().filter(|&i| placed[i].2).collect();
        let total: i64 = stacked
            .iter()
            .map(|&i| i64::from(placed[i].1.height()))
            .sum::<i64>()
            + i64::from(self.spacing) * (stacked.len().saturating_sub(1) as i64);

        let start = match self.start_y {
            Some(y) => i64::from(y),
            None => (i64::from(video_height) - total).div_euclid(2),
        };

        let mut cursor = start;
        for &i in &stacked {
            let rect = placed[i].1;
            placed[i].1 = rect.with_y(clamp_i32(cursor));
            cursor += i64::from(rect.height()) + i64::from(self.spacing);
        }

        let mut notes = Vec::new();
        for (i, (id_a, a, _)) in placed.iter().enumerate() {
            for (id_b, b, _) in &placed[i + 1..] {
                if a.overlaps(b) {
                    notes.push(format!("{id_a} overlaps {id_b}: {a} vs {b}"));
                }
            }
        }
        for (id, r, _) in &placed {
            if !r.fits_within(video_width, video_height) {
                notes.push(format!(
                    "{id} exceeds {video_width}x{video_height} canvas: {r}"
                ));
            }
        }
        if !notes.is_empty() {
            tracing::warn!(count = notes.len(), "layout has unresolved conflicts");
        }

        let positions: BTreeMap<String, Rect> = placed
            .into_iter()
            .map(|(id, r, _)| (id.to_owned(), r))
            .collect();
        Ok(LayoutResult {
            positions,
            has_conflicts: !notes.is_empty(),
            conflict_notes: notes,
        })
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Placement policy used by [`LayoutEngine`](crate::layout::engine::LayoutEngine).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutStrategy {
    /// Stack elements top-to-bottom.
    VerticalStack(VerticalStackStrategy),
}

impl Default for LayoutStrategy {
    fn default() -> Self {
        Self::VerticalStack(VerticalStackStrategy::default())
    }
}

impl LayoutStrategy {
    /// Place `elements` with the selected strategy.
    pub fn compute(
        &self,
        elements: &[Arc<dyn LayoutElement>],
        video_width: u32,
        video_height: u32,
    ) -> LyricResult<LayoutResult> {
        match self {
            Self::VerticalStack(s) => s.compute(elements, video_width, video_height),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/strategy.rs"]
mod tests;
