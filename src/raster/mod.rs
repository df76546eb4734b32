pub(crate) mod blur;
pub(crate) mod glyph_cache;
pub(crate) mod text;
