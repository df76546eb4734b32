use super::*;

#[test]
fn rect_rejects_non_positive_dimensions() {
    assert!(Rect::new(0, 0, 0, 10).is_err());
    assert!(Rect::new(0, 0, 10, -1).is_err());
    let err = Rect::new(0, 0, -5, 5).unwrap_err();
    assert!(matches!(err, LyricError::Config(_)));
    assert!(Rect::new(-10, -10, 1, 1).is_ok());
}

#[test]
fn rect_overlap_is_half_open() {
    let a = Rect::new(0, 0, 100, 50).unwrap();
    let touching = Rect::new(0, 50, 100, 50).unwrap();
    let inside = Rect::new(10, 10, 5, 5).unwrap();
    let crossing = Rect::new(90, 40, 20, 20).unwrap();

    assert!(!a.overlaps(&touching));
    assert!(!touching.overlaps(&a));
    assert!(a.overlaps(&inside));
    assert!(inside.overlaps(&a));
    assert!(a.overlaps(&crossing));
}

#[test]
fn rect_contains_center_and_area() {
    let r = Rect::new(10, 20, 30, 40).unwrap();
    assert!(r.contains(10, 20));
    assert!(r.contains(39, 59));
    assert!(!r.contains(40, 20));
    assert!(!r.contains(10, 60));
    assert_eq!(r.center(), (25, 40));
    assert_eq!(r.area(), 1200);
    assert_eq!(r.right(), 40);
    assert_eq!(r.bottom(), 60);
}

#[test]
fn rect_with_y_replaces_position_only() {
    let r = Rect::new(5, 6, 7, 8).unwrap();
    let moved = r.with_y(100);
    assert_eq!(moved.x(), 5);
    assert_eq!(moved.y(), 100);
    assert_eq!(moved.width(), 7);
    assert_eq!(moved.height(), 8);
    assert_eq!(r.y(), 6);
}

#[test]
fn rect_fits_within_canvas() {
    assert!(Rect::new(0, 0, 10, 10).unwrap().fits_within(10, 10));
    assert!(!Rect::new(1, 0, 10, 10).unwrap().fits_within(10, 10));
    assert!(!Rect::new(0, -1, 10, 10).unwrap().fits_within(10, 10));
}

#[test]
fn canvas_and_fps_validation() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert_eq!(Canvas::new(4, 2).unwrap().rgb_len(), 24);

    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::new(30000, 1001).unwrap();
    assert!((fps.as_f64() - 29.97).abs() < 0.01);
}

#[test]
fn fps_frame_time_conversions() {
    let fps = Fps::new(24, 1).unwrap();
    assert_eq!(fps.frame_to_secs(FrameIndex(0)), 0.0);
    assert!((fps.frame_to_secs(FrameIndex(12)) - 0.5).abs() < 1e-12);
    assert_eq!(fps.secs_to_frames_ceil(1.0), 24);
    assert_eq!(fps.secs_to_frames_ceil(1.01), 25);
}

#[test]
fn frame_range_basics() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(4)).is_err());
    let r = FrameRange::new(FrameIndex(2), FrameIndex(6)).unwrap();
    assert_eq!(r.len_frames(), 4);
    assert!(!r.is_empty());
    assert!(r.contains(FrameIndex(2)));
    assert!(!r.contains(FrameIndex(6)));
}
