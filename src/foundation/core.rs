use crate::foundation::error::{LyricError, LyricResult};

/// Axis-aligned pixel rectangle.
///
/// Edges are half-open: the rectangle covers `[x, x + width) × [y, y + height)`, so two
/// rectangles that only share an edge do not overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Rect {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl Rect {
    /// Create a rectangle. Fails unless `width > 0 && height > 0`.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> LyricResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(LyricError::config(format!(
                "rect width and height must be > 0 (got {width}x{height})"
            )));
        }
        Ok(Self {
            x,
            y,
            width: width as u32,
            height: height as u32,
        })
    }

    /// Left edge.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Top edge.
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Width in pixels (always > 0).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels (always > 0).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Same size, moved to a new top edge.
    pub fn with_y(self, y: i32) -> Self {
        Self { y, ..self }
    }

    /// Return `true` when the interiors of both rectangles intersect.
    pub fn overlaps(&self, other: &Rect) -> bool {
        i64::from(self.x) < other.right()
            && i64::from(other.x) < self.right()
            && i64::from(self.y) < other.bottom()
            && i64::from(other.y) < self.bottom()
    }

    /// Return `true` when the pixel `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        i64::from(self.x) <= x && x < self.right() && i64::from(self.y) <= y && y < self.bottom()
    }

    /// Integer center point, rounding toward the top-left.
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    /// Area in square pixels.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Return `true` when the rectangle lies fully inside a `width × height` canvas.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= i64::from(width)
            && self.bottom() <= i64::from(height)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rect(x={}, y={}, w={}, h={})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> LyricResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    /// Reject zero-sized or absurdly large canvases.
    pub fn validate(self) -> LyricResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LyricError::config("canvas width and height must be > 0"));
        }
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            return Err(LyricError::config("canvas dimensions exceed i32 range"));
        }
        Ok(())
    }

    /// Byte length of an RGB8 frame of this size.
    pub fn rgb_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 3
    }
}

/// Absolute 0-based frame index.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> LyricResult<Self> {
        if start.0 > end.0 {
            return Err(LyricError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> LyricResult<Self> {
        if den == 0 {
            return Err(LyricError::config("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(LyricError::config("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Presentation time of a frame in seconds.
    pub fn frame_to_secs(self, frame: FrameIndex) -> f64 {
        (frame.0 as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Number of whole frames needed to cover `secs` (ceil semantics).
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        (secs * self.as_f64()).ceil().max(0.0) as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
