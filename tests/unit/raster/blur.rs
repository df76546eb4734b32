use super::*;

#[test]
fn radius_zero_is_identity() {
    let mut m = AlphaMask::new(3, 2);
    m.data = vec![1, 2, 3, 4, 5, 6];
    assert_eq!(blur_mask(&m, 0, 1.0).unwrap(), m);
}

#[test]
fn spreads_single_pixel_and_roughly_preserves_energy() {
    let mut m = AlphaMask::new(9, 9);
    m.data[4 * 9 + 4] = 255;
    let out = blur_mask(&m, 2, 1.2).unwrap();
    assert!(out.data.iter().filter(|&&v| v != 0).count() > 1);
    let sum: i32 = out.data.iter().map(|&v| i32::from(v)).sum();
    assert!((sum - 255).abs() <= 12, "sum={sum}");
    assert!(out.get(4, 4) < 255);
}

#[test]
fn edges_fade_toward_empty_outside() {
    let mut m = AlphaMask::new(4, 4);
    m.data.fill(200);
    let out = blur_mask(&m, 2, 1.0).unwrap();
    assert!(out.get(0, 0) < 200);
    assert!(out.get(0, 0) > 0);
}

#[test]
fn rejects_bad_inputs() {
    let mut m = AlphaMask::new(2, 2);
    assert!(blur_mask(&m, 2, 0.0).is_err());
    m.data.pop();
    assert!(blur_mask(&m, 2, 1.0).is_err());
}
