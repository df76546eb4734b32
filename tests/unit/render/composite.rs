use super::*;

fn bitmap(w: u32, h: u32, px: PremulRgba8) -> GlyphBitmap {
    GlyphBitmap {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
    }
}

#[test]
fn over_opaque_replaces_and_transparent_keeps() {
    let dst = [10, 20, 30, 255];
    assert_eq!(over(dst, [200, 100, 50, 255], 1.0), [200, 100, 50, 255]);
    assert_eq!(over(dst, [200, 100, 50, 0], 1.0), dst);
    assert_eq!(over(dst, [200, 100, 50, 255], 0.0), dst);
}

#[test]
fn over_half_alpha_mixes() {
    let out = over([0, 0, 0, 255], [128, 128, 128, 128], 1.0);
    assert_eq!(out, [128, 128, 128, 255]);
}

#[test]
fn tint_scales_premultiplied_color() {
    assert_eq!(tint(Rgba8::WHITE, 255), [255, 255, 255, 255]);
    assert_eq!(tint(Rgba8::WHITE, 0), [0, 0, 0, 0]);
    assert_eq!(tint(Rgba8::rgba(0, 0, 0, 200), 255), [0, 0, 0, 200]);
    assert_eq!(tint(Rgba8::rgba(255, 0, 0, 255), 128), [128, 0, 0, 128]);
}

#[test]
fn blend_uses_progress_as_opacity() {
    let mut frame = FrameRgb::new(2, 1);
    frame.data.fill(100);
    blend_onto_rgb(&mut frame, &bitmap(1, 1, [255, 255, 255, 255]), 0, 0, 0.5);
    // 255*0.5 + 100*(1-0.5) ~= 178
    assert_eq!(&frame.data[0..3], &[178, 178, 178]);
    assert_eq!(&frame.data[3..6], &[100, 100, 100]);
}

#[test]
fn blend_with_zero_progress_is_noop() {
    let mut frame = FrameRgb::new(2, 2);
    frame.data.fill(7);
    blend_onto_rgb(&mut frame, &bitmap(2, 2, [255, 0, 0, 255]), 0, 0, 0.0);
    assert!(frame.data.iter().all(|&v| v == 7));
}

#[test]
fn blend_clips_at_every_edge() {
    let bmp = bitmap(4, 4, [255, 255, 255, 255]);
    for (x, y) in [(-2, -2), (3, 3), (-10, 0), (0, -10), (100, 100), (i32::MIN, i32::MAX)] {
        let mut frame = FrameRgb::new(5, 5);
        blend_onto_rgb(&mut frame, &bmp, x, y, 1.0);
    }

    let mut frame = FrameRgb::new(5, 5);
    blend_onto_rgb(&mut frame, &bmp, -2, 3, 1.0);
    let lit: usize = frame.data.chunks_exact(3).filter(|p| p[0] == 255).count();
    assert_eq!(lit, 2 * 2);
    assert_eq!(frame.pixel(0, 3), [255, 255, 255]);
    assert_eq!(frame.pixel(2, 3), [0, 0, 0]);
}

#[test]
fn composite_order_matters_and_last_wins_for_opaque() {
    let red = bitmap(1, 1, [255, 0, 0, 255]);
    let half_blue = bitmap(1, 1, [0, 0, 128, 128]);

    let mut a = FrameRgb::new(1, 1);
    blend_onto_rgb(&mut a, &red, 0, 0, 1.0);
    blend_onto_rgb(&mut a, &half_blue, 0, 0, 1.0);

    let mut b = FrameRgb::new(1, 1);
    blend_onto_rgb(&mut b, &half_blue, 0, 0, 1.0);
    blend_onto_rgb(&mut b, &red, 0, 0, 1.0);

    assert_eq!(a.pixel(0, 0), [127, 0, 128]);
    assert_eq!(b.pixel(0, 0), [255, 0, 0]);
}

#[test]
fn clipped_blend_only_touches_the_clip_rect() {
    let mut frame = FrameRgb::new(6, 6);
    let clip = Rect::new(1, 2, 3, 2).unwrap();
    blend_onto_rgb_clipped(
        &mut frame,
        &bitmap(6, 6, [255, 255, 255, 255]),
        0,
        0,
        1.0,
        Some(&clip),
    );
    for y in 0..6 {
        for x in 0..6 {
            let expected = if clip.contains(x as i32, y as i32) {
                [255, 255, 255]
            } else {
                [0, 0, 0]
            };
            assert_eq!(frame.pixel(x, y), expected, "({x}, {y})");
        }
    }
}
