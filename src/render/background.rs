use crate::foundation::core::Canvas;
use crate::foundation::error::{LyricError, LyricResult};
use crate::render::FrameRgb;
use anyhow::Context;
use std::path::Path;

/// Tone treatment applied to a background image so lyrics stay readable over it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundTreatment {
    /// Multiplier on every channel; `1.0` keeps the image as is.
    pub brightness: f32,
    /// Pull toward (`< 1.0`) or push away from the mean gray level.
    pub contrast: f32,
    /// Gaussian blur sigma in pixels; `0.0` disables the blur.
    pub blur_sigma: f32,
}

impl Default for BackgroundTreatment {
    /// Darken, flatten and slightly soften.
    fn default() -> Self {
        Self {
            brightness: 0.4,
            contrast: 0.6,
            blur_sigma: 1.0,
        }
    }
}

impl BackgroundTreatment {
    /// Leave the image untouched.
    pub const NONE: Self = Self {
        brightness: 1.0,
        contrast: 1.0,
        blur_sigma: 0.0,
    };

    /// Reject negative or non-finite parameters.
    pub fn validate(&self) -> LyricResult<()> {
        for (name, v) in [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("blur_sigma", self.blur_sigma),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(LyricError::validation(format!(
                    "background {name} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Apply brightness, then contrast around the mean luma, then blur.
    pub fn apply(&self, image: &mut image::RgbImage) {
        if self.brightness != 1.0 {
            for v in image.iter_mut() {
                *v = scale_channel(f32::from(*v) * self.brightness);
            }
        }
        if self.contrast != 1.0 {
            let mean = mean_luma(image);
            for v in image.iter_mut() {
                *v = scale_channel(mean + (f32::from(*v) - mean) * self.contrast);
            }
        }
        if self.blur_sigma.is_normal() && self.blur_sigma > 0.0 {
            *image = image::imageops::blur(image, self.blur_sigma);
        }
    }
}

fn scale_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Mean Rec. 601 luma, rounded to a whole gray level.
fn mean_luma(image: &image::RgbImage) -> f32 {
    let n = u64::from(image.width()) * u64::from(image.height());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = image
        .pixels()
        .map(|p| 0.299 * f64::from(p[0]) + 0.587 * f64::from(p[1]) + 0.114 * f64::from(p[2]))
        .sum();
    (sum / n as f64).round() as f32
}

/// Letterbox `image` into `canvas` and apply `treatment` to the picture area.
///
/// The image is scaled to fit and centered; the bars around it stay black.
pub fn prepare_background(
    image: &image::RgbImage,
    canvas: Canvas,
    treatment: &BackgroundTreatment,
) -> LyricResult<FrameRgb> {
    canvas.validate()?;
    treatment.validate()?;
    let (iw, ih) = image.dimensions();
    if iw == 0 || ih == 0 {
        return Err(LyricError::validation("background image is empty"));
    }

    let scale = f64::min(
        f64::from(canvas.width) / f64::from(iw),
        f64::from(canvas.height) / f64::from(ih),
    );
    let sw = ((f64::from(iw) * scale).round() as u32).clamp(1, canvas.width);
    let sh = ((f64::from(ih) * scale).round() as u32).clamp(1, canvas.height);

    let mut scaled = if (sw, sh) == (iw, ih) {
        image.clone()
    } else {
        image::imageops::resize(image, sw, sh, image::imageops::FilterType::Triangle)
    };
    treatment.apply(&mut scaled);

    let mut frame = FrameRgb::new(canvas.width, canvas.height);
    let x0 = ((canvas.width - sw) / 2) as usize;
    let y0 = ((canvas.height - sh) / 2) as usize;
    let row_bytes = (sw as usize) * 3;
    let src = scaled.as_raw();
    for y in 0..sh as usize {
        let dst = ((y0 + y) * canvas.width as usize + x0) * 3;
        frame.data[dst..dst + row_bytes].copy_from_slice(&src[y * row_bytes..(y + 1) * row_bytes]);
    }

    tracing::debug!(
        src_w = iw,
        src_h = ih,
        fit_w = sw,
        fit_h = sh,
        brightness = treatment.brightness,
        contrast = treatment.contrast,
        "background prepared"
    );
    Ok(frame)
}

/// Decode an image file and prepare it with [`prepare_background`].
pub fn load_background(
    path: &Path,
    canvas: Canvas,
    treatment: &BackgroundTreatment,
) -> LyricResult<FrameRgb> {
    let img = image::open(path)
        .with_context(|| format!("decode background image {}", path.display()))?
        .to_rgb8();
    prepare_background(&img, canvas, treatment)
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
