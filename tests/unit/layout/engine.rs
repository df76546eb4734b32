use super::*;
use crate::foundation::core::Rect;
use crate::layout::strategy::VerticalStackStrategy;
use crate::scene::style::Style;
use crate::timeline::track::{DisplayMode, Track, TrackOpts};

fn track(id: &str, priority: i32, font_size: u32) -> Arc<Track> {
    Arc::new(
        Track::new(
            id,
            &[(0.0, "line".to_owned())],
            Style {
                font_size,
                ..Style::default()
            },
            DisplayMode::default(),
            TrackOpts {
                priority,
                ..TrackOpts::default()
            },
        )
        .unwrap(),
    )
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut engine = LayoutEngine::default();
    engine.add_element(track("main", 0, 80)).unwrap();
    let err = engine.add_element(track("main", 1, 40)).unwrap_err();
    assert!(matches!(err, LyricError::Config(_)));
    assert_eq!(engine.len(), 1);

    engine.clear_elements();
    assert!(engine.is_empty());
    engine.add_element(track("main", 1, 40)).unwrap();
}

#[test]
fn detects_raw_overlaps_then_resolves_them() {
    let mut engine = LayoutEngine::new(LayoutStrategy::VerticalStack(VerticalStackStrategy {
        spacing: 20,
        start_y: None,
    }));
    engine.add_element(track("main", 1, 80)).unwrap();
    engine.add_element(track("aux", 2, 40)).unwrap();
    engine.add_element(track("third", 3, 30)).unwrap();

    // All three default to the canvas center.
    let conflicts = engine.detect_conflicts(1280, 720).unwrap();
    assert_eq!(conflicts.len(), 3);
    assert!(conflicts[0].starts_with("main overlaps aux"));

    let layout = engine.compute_layout(1280, 720).unwrap();
    assert!(!layout.has_conflicts, "{:?}", layout.conflict_notes);
    let main = layout.position("main").unwrap();
    let aux = layout.position("aux").unwrap();
    assert!(main.y() < aux.y());
    assert!(!main.overlaps(aux));
    assert_eq!(main.x(), 0);
    assert_eq!(main.width(), 1280);

    let again = engine.compute_layout(1280, 720).unwrap();
    assert_eq!(layout, again);
}

#[test]
fn empty_engine_lays_out_nothing() {
    let engine = LayoutEngine::default();
    let layout = engine.compute_layout(640, 480).unwrap();
    assert!(layout.positions.is_empty());
    assert!(engine.detect_conflicts(640, 480).unwrap().is_empty());
    assert!(engine.compute_layout(0, 480).is_err());
}

#[test]
fn required_rect_errors_propagate() {
    struct Broken;
    impl LayoutElement for Broken {
        fn element_id(&self) -> &str {
            "broken"
        }
        fn required_rect(&self, _: u32, _: u32) -> LyricResult<Rect> {
            Rect::new(0, 0, 0, 10)
        }
        fn priority(&self) -> i32 {
            0
        }
        fn is_flexible(&self) -> bool {
            true
        }
    }
    let mut engine = LayoutEngine::default();
    engine.add_element(Arc::new(Broken)).unwrap();
    assert!(engine.compute_layout(640, 480).is_err());
    assert!(engine.detect_conflicts(640, 480).is_err());
}
