use crate::foundation::error::{LyricError, LyricResult};
use crate::raster::text::AlphaMask;

/// Separable gaussian blur of a coverage mask; pixels outside the mask count as empty.
pub fn blur_mask(src: &AlphaMask, radius: u32, sigma: f32) -> LyricResult<AlphaMask> {
    let expected = (src.width as usize)
        .checked_mul(src.height as usize)
        .ok_or_else(|| LyricError::render("blur buffer size overflow"))?;
    if src.data.len() != expected {
        return Err(LyricError::render("blur_mask expects data matching width*height"));
    }
    if radius == 0 || expected == 0 {
        return Ok(src.clone());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = AlphaMask::new(src.width, src.height);
    let mut out = AlphaMask::new(src.width, src.height);
    horizontal_pass(src, &mut tmp, &kernel);
    vertical_pass(&tmp, &mut out, &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> LyricResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(LyricError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(LyricError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Rounding drift goes to the center tap so the kernel sums to exactly 1.0.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &AlphaMask, dst: &mut AlphaMask, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    for y in 0..i64::from(src.height) {
        for x in 0..i64::from(src.width) {
            let acc: u64 = k
                .iter()
                .enumerate()
                .map(|(ki, &kw)| u64::from(kw) * u64::from(src.get(x + ki as i64 - radius, y)))
                .sum();
            dst.data[(y as usize) * (src.width as usize) + x as usize] = q16_to_u8(acc);
        }
    }
}

fn vertical_pass(src: &AlphaMask, dst: &mut AlphaMask, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    for y in 0..i64::from(src.height) {
        for x in 0..i64::from(src.width) {
            let acc: u64 = k
                .iter()
                .enumerate()
                .map(|(ki, &kw)| u64::from(kw) * u64::from(src.get(x, y + ki as i64 - radius)))
                .sum();
            dst.data[(y as usize) * (src.width as usize) + x as usize] = q16_to_u8(acc);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/raster/blur.rs"]
mod tests;
