use crate::foundation::error::{LyricError, LyricResult};
use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA8 color.
///
/// Deserializes from `"#RRGGBB"`, `"#RRGGBBAA"`, `[r, g, b]` or `[r, g, b, a]` (0–255 channels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    /// The gold used for highlighted lyrics.
    pub const GOLD: Self = Self::rgba(255, 215, 0, 255);

    /// Build a color from its channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` / `#RRGGBBAA` (the `#` is optional, case-insensitive).
    pub fn from_hex(s: &str) -> LyricResult<Self> {
        parse_hex(s).map_err(LyricError::config)
    }

    /// Premultiplied channels, rounding to nearest.
    pub fn to_premul(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgba(*r, *g, *b, 255)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    match s.len() {
        6 => Ok(Rgba8::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        )),
        8 => Ok(Rgba8::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned()),
    }
}

/// Per-line animation applied while an entry fades in and out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    /// Opacity follows progress and the line rises into place, then keeps rising out.
    #[default]
    Fade,
    /// Opacity follows progress; no vertical motion.
    Static,
}

/// Visual style shared by every entry of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    /// Font size in pixels, must be > 0.
    pub font_size: u32,
    /// Main text color for non-highlighted lines.
    pub font_color: Rgba8,
    /// Main text color for highlighted lines, also used for the glow.
    pub highlight_color: Rgba8,
    /// Drop shadow color.
    pub shadow_color: Rgba8,
    /// Draw a soft glow beneath highlighted lines.
    pub glow_enabled: bool,
    /// Fade/rise behavior.
    pub animation: AnimationKind,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_size: 80,
            font_color: Rgba8::WHITE,
            highlight_color: Rgba8::GOLD,
            shadow_color: Rgba8::rgba(0, 0, 0, 200),
            glow_enabled: false,
            animation: AnimationKind::Fade,
        }
    }
}

impl Style {
    /// Reject styles that cannot be laid out.
    pub fn validate(&self) -> LyricResult<()> {
        if self.font_size == 0 {
            return Err(LyricError::config("style font_size must be > 0"));
        }
        if self.font_size > 4096 {
            return Err(LyricError::config("style font_size must be <= 4096"));
        }
        Ok(())
    }

    /// Line advance in pixels: `round(font_size * 1.2)`.
    pub fn line_height(&self) -> u32 {
        (f64::from(self.font_size) * 1.2).round() as u32
    }

    /// Style of the "next line" preview block: smaller, plain color, no glow.
    pub fn preview(&self) -> Self {
        Self {
            font_size: ((self.font_size * 3) / 4).max(1),
            glow_enabled: false,
            animation: AnimationKind::Fade,
            ..*self
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/style.rs"]
mod tests;
