use crate::foundation::error::{LyricError, LyricResult};
use crate::layout::strategy::LayoutStrategy;
use crate::layout::{LayoutElement, LayoutResult};
use std::sync::Arc;

/// Registry of layout elements plus the strategy that places them.
pub struct LayoutEngine {
    strategy: LayoutStrategy,
    elements: Vec<Arc<dyn LayoutElement>>,
}

impl LayoutEngine {
    /// Engine with no elements, placing with `strategy`.
    pub fn new(strategy: LayoutStrategy) -> Self {
        Self {
            strategy,
            elements: Vec::new(),
        }
    }

    /// Placement policy.
    pub fn strategy(&self) -> &LayoutStrategy {
        &self.strategy
    }

    /// Register an element. Ids must be unique.
    pub fn add_element(&mut self, element: Arc<dyn LayoutElement>) -> LyricResult<()> {
        let id = element.element_id();
        if self.elements.iter().any(|e| e.element_id() == id) {
            return Err(LyricError::config(format!(
                "layout element \"{id}\" is already registered"
            )));
        }
        tracing::debug!(element_id = id, "layout element registered");
        self.elements.push(element);
        Ok(())
    }

    /// Remove every registered element.
    pub fn clear_elements(&mut self) {
        self.elements.clear();
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no element is registered.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in registration order.
    pub fn elements(&self) -> &[Arc<dyn LayoutElement>] {
        &self.elements
    }

    /// Describe every pair of elements whose required rects overlap before layout.
    pub fn detect_conflicts(&self, video_width: u32, video_height: u32) -> LyricResult<Vec<String>> {
        let rects = self
            .elements
            .iter()
            .map(|e| Ok((e.element_id(), e.required_rect(video_width, video_height)?)))
            .collect::<LyricResult<Vec<_>>>()?;

        let mut notes = Vec::new();
        for (i, (id_a, a)) in rects.iter().enumerate() {
            for (id_b, b) in &rects[i + 1..] {
                if a.overlaps(b) {
                    notes.push(format!("{id_a} overlaps {id_b}: {a} vs {b}"));
                }
            }
        }
        Ok(notes)
    }

    /// Assign positions to every registered element.
    #[tracing::instrument(skip(self), fields(elements = self.elements.len()))]
    pub fn compute_layout(&self, video_width: u32, video_height: u32) -> LyricResult<LayoutResult> {
        if video_width == 0 || video_height == 0 {
            return Err(LyricError::config("video dimensions must be > 0"));
        }
        let out = self
            .strategy
            .compute(&self.elements, video_width, video_height)?;
        tracing::debug!(has_conflicts = out.has_conflicts, "layout computed");
        Ok(out)
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutStrategy::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
