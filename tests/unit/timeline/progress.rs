use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn fade_in_hold_fade_out() {
    let (p, ph) = progress_at(-0.15, 2.5);
    assert!(approx(p, 0.5));
    assert_eq!(ph, Phase::FadeIn);

    assert_eq!(progress_at(0.0, 2.5), (1.0, Phase::Hold));
    assert_eq!(progress_at(2.2, 2.5), (1.0, Phase::Hold));

    let (p, ph) = progress_at(2.35, 2.5);
    assert!(approx(p, 0.5));
    assert_eq!(ph, Phase::FadeOut);

    let (p, _) = progress_at(2.5, 2.5);
    assert!(approx(p, 0.0));
}

#[test]
fn progress_is_clamped() {
    for i in -100..400 {
        let rel = f64::from(i) * 0.01;
        for d in [0.05, 0.3, 1.0, 2.5] {
            let (p, _) = progress_at(rel, d);
            assert!((0.0..=1.0).contains(&p), "rel={rel} d={d} p={p}");
        }
    }
}

#[test]
fn rise_offset_direction() {
    assert_eq!(rise_offset(0.5, Phase::FadeIn, AnimationKind::Fade), 20);
    assert_eq!(rise_offset(0.0, Phase::FadeIn, AnimationKind::Fade), 40);
    assert_eq!(rise_offset(1.0, Phase::Hold, AnimationKind::Fade), 0);
    assert_eq!(rise_offset(0.25, Phase::FadeOut, AnimationKind::Fade), -30);
    assert_eq!(rise_offset(0.25, Phase::FadeOut, AnimationKind::Static), 0);
}
