use crate::foundation::core::Rect;
use crate::foundation::math::{mul_div255_u8, mul_div255_u16, unit_to_u8};
use crate::raster::glyph_cache::GlyphBitmap;
use crate::render::FrameRgb;
use crate::scene::style::Rgba8;

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels, with an extra opacity on `src`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }
    let op = unit_to_u8(opacity);
    let sa = mul_div255_u16(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255_u16(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u16(u16::from(src[i]), op);
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Premultiplied color of a pixel covered `coverage/255` by `color`.
pub fn tint(color: Rgba8, coverage: u8) -> PremulRgba8 {
    let [r, g, b, a] = color.to_premul();
    let c = u16::from(coverage);
    [
        mul_div255_u8(u16::from(r), c),
        mul_div255_u8(u16::from(g), c),
        mul_div255_u8(u16::from(b), c),
        mul_div255_u8(u16::from(a), c),
    ]
}

/// Blend a premultiplied bitmap onto an RGB frame with its top-left at `(x, y)`.
///
/// Each channel becomes `src·p + dst·(1 − a·p)`. Parts outside the frame are skipped.
pub fn blend_onto_rgb(frame: &mut FrameRgb, bitmap: &GlyphBitmap, x: i32, y: i32, progress: f64) {
    blend_onto_rgb_clipped(frame, bitmap, x, y, progress, None);
}

/// [`blend_onto_rgb`], additionally skipping every pixel outside `clip`.
pub fn blend_onto_rgb_clipped(
    frame: &mut FrameRgb,
    bitmap: &GlyphBitmap,
    x: i32,
    y: i32,
    progress: f64,
    clip: Option<&Rect>,
) {
    let op = unit_to_u8(progress as f32);
    if op == 0 {
        return;
    }

    let fw = i64::from(frame.width);
    let fh = i64::from(frame.height);
    let (cx0, cy0, cx1, cy1) = match clip {
        Some(r) => (
            i64::from(r.x()).max(0),
            i64::from(r.y()).max(0),
            r.right().min(fw),
            r.bottom().min(fh),
        ),
        None => (0, 0, fw, fh),
    };
    let (x, y) = (i64::from(x), i64::from(y));
    let x0 = x.max(cx0);
    let y0 = y.max(cy0);
    let x1 = (x + i64::from(bitmap.width)).min(cx1);
    let y1 = (y + i64::from(bitmap.height)).min(cy1);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let bw = bitmap.width as usize;
    for fy in y0..y1 {
        let by = (fy - y) as usize;
        let src_row = &bitmap.data[by * bw * 4..(by + 1) * bw * 4];
        let dst_row = &mut frame.data[(fy as usize) * (fw as usize) * 3..];
        for fx in x0..x1 {
            let bx = (fx - x) as usize;
            let s = &src_row[bx * 4..bx * 4 + 4];
            if s[3] == 0 {
                continue;
            }
            let sa = mul_div255_u16(u16::from(s[3]), op);
            let inv = 255 - sa;
            let d = &mut dst_row[(fx as usize) * 3..(fx as usize) * 3 + 3];
            for c in 0..3 {
                let sc = mul_div255_u16(u16::from(s[c]), op);
                let dc = mul_div255_u16(u16::from(d[c]), inv);
                d[c] = add_sat_u8(sc, dc);
            }
        }
    }
}

fn add_sat_u8(a: u16, b: u16) -> u8 {
    (a + b).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
