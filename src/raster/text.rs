use crate::foundation::error::{LyricError, LyricResult};
use parking_lot::Mutex;

/// One positioned line of a [`TextPlan`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedLine {
    /// Line contents, without the newline.
    pub text: String,
    /// Left edge of the line inside the mask.
    pub x: u32,
    /// Top of the line box inside the mask.
    pub top: u32,
    /// Measured advance width.
    pub width: u32,
}

/// Fully measured text block, ready to rasterize into a coverage mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextPlan {
    /// Font size in pixels.
    pub font_size: u32,
    /// Line box height in pixels.
    pub line_height: u32,
    /// Mask width in pixels, including any bleed margin.
    pub width: u32,
    /// Mask height in pixels, including any bleed margin.
    pub height: u32,
    /// Lines top to bottom.
    pub lines: Vec<PlannedLine>,
}

/// 8-bit coverage mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width × height` coverage values, row-major.
    pub data: Vec<u8>,
}

impl AlphaMask {
    /// Fully transparent mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize)],
        }
    }

    /// Coverage at `(x, y)`; zero outside the mask.
    pub fn get(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return 0;
        }
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32) {
        let (x1, y1) = (x1.min(self.width), y1.min(self.height));
        for y in y0..y1 {
            let row = (y as usize) * (self.width as usize);
            for x in x0..x1 {
                self.data[row + x as usize] = 255;
            }
        }
    }
}

/// Shapes and rasterizes lines of text into coverage masks.
pub trait TextRasterizer: Send + Sync {
    /// Advance width of a single line in pixels.
    fn measure_line(&self, line: &str, font_size: u32) -> LyricResult<u32>;

    /// Draw every planned line into a `plan.width × plan.height` mask.
    fn paint(&self, plan: &TextPlan) -> LyricResult<AlphaMask>;
}

/// Font-free rasterizer that draws one solid box per visible character.
///
/// Output depends only on character counts and sizes, which makes it suitable for draft
/// previews and reproducible tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockRasterizer;

impl BlockRasterizer {
    fn advance(font_size: u32) -> u32 {
        ((font_size * 3) / 5).max(1)
    }
}

impl TextRasterizer for BlockRasterizer {
    fn measure_line(&self, line: &str, font_size: u32) -> LyricResult<u32> {
        let n = line.chars().count() as u32;
        Ok(n.saturating_mul(Self::advance(font_size)))
    }

    fn paint(&self, plan: &TextPlan) -> LyricResult<AlphaMask> {
        let mut mask = AlphaMask::new(plan.width, plan.height);
        let adv = Self::advance(plan.font_size);
        let pad = adv / 6;
        let glyph_top = plan.line_height / 5;
        let glyph_bottom = plan.line_height - plan.line_height / 5;
        for line in &plan.lines {
            for (i, ch) in line.text.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let x0 = line.x + (i as u32) * adv + pad;
                let x1 = line.x + (i as u32 + 1) * adv - pad;
                mask.fill_rect(x0, line.top + glyph_top, x1, line.top + glyph_bottom);
            }
        }
        Ok(mask)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct MaskBrush;

/// Parley contexts reused across every layout of one rasterizer.
struct LayoutContexts {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<MaskBrush>,
}

/// Rasterizer shaping with parley and drawing with vello_cpu from caller-supplied font bytes.
///
/// The font is registered once; shaping reuses one set of parley contexts behind a mutex.
pub struct ParleyRasterizer {
    contexts: Mutex<LayoutContexts>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    font_len: usize,
}

impl std::fmt::Debug for ParleyRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParleyRasterizer")
            .field("family", &self.family_name)
            .field("font_bytes", &self.font_len)
            .finish()
    }
}

impl ParleyRasterizer {
    /// Build from TTF/OTF bytes. Fails when the bytes do not contain a usable font family.
    pub fn new(font_bytes: Vec<u8>) -> LyricResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| LyricError::config("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| LyricError::config("registered font family has no name"))?
            .to_string();

        Ok(Self {
            contexts: Mutex::new(LayoutContexts {
                font_ctx,
                layout_ctx: parley::LayoutContext::new(),
            }),
            family_name,
            font_len: font_bytes.len(),
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
        })
    }

    /// Family name the font bytes registered under.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    fn layout_line(&self, text: &str, font_size: u32) -> parley::Layout<MaskBrush> {
        let mut guard = self.contexts.lock();
        let LayoutContexts {
            font_ctx,
            layout_ctx,
        } = &mut *guard;

        let mut builder = layout_ctx.ranged_builder(font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Borrowed(self.family_name.as_str())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font_size as f32));

        let mut layout: parley::Layout<MaskBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl TextRasterizer for ParleyRasterizer {
    fn measure_line(&self, line: &str, font_size: u32) -> LyricResult<u32> {
        if line.is_empty() {
            return Ok(0);
        }
        let layout = self.layout_line(line, font_size);
        Ok(layout.width().ceil().max(0.0) as u32)
    }

    fn paint(&self, plan: &TextPlan) -> LyricResult<AlphaMask> {
        let (Ok(w), Ok(h)) = (u16::try_from(plan.width), u16::try_from(plan.height)) else {
            return Err(LyricError::render(format!(
                "text block {}x{} exceeds rasterizer limits",
                plan.width, plan.height
            )));
        };

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        for line in &plan.lines {
            if line.text.is_empty() {
                continue;
            }
            let layout = self.layout_line(&line.text, plan.font_size);
            let slack = f64::from(plan.line_height) - f64::from(layout.height());
            let dy = f64::from(line.top) + slack / 2.0;
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((f64::from(line.x), dy)));
            for layout_line in layout.lines() {
                for item in layout_line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&self.font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        let mut mask = AlphaMask::new(plan.width, plan.height);
        for (dst, px) in mask
            .data
            .iter_mut()
            .zip(pixmap.data_as_u8_slice().chunks_exact(4))
        {
            *dst = px[3];
        }
        Ok(mask)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/text.rs"]
mod tests;
