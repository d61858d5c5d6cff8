use crate::foundation::error::{AnimyteError, AnimyteResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Shape, Vec2};

/// Inclusive frame span of a composition or nested precomp, in the document's
/// own (fractional) frame units. `start` is the first authored frame, `end`
/// the frame playback stops at; both may be non-integral.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// First authored frame (`ip` in the document).
    pub start: f32,
    /// Last authored frame (`op` in the document), exclusive for layer
    /// visibility, terminal for playback clamping.
    pub end: f32,
}

impl FrameRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: f32, end: f32) -> AnimyteResult<Self> {
        if !(start <= end) {
            return Err(AnimyteError::configuration(format!(
                "frame range start ({start}) must be <= end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of frames spanned.
    pub fn duration_frames(self) -> f32 {
        self.end - self.start
    }

    /// Frame for a normalized progress in `[0, 1]` (linear, unclamped).
    pub fn frame_for_progress(self, progress: f32) -> f32 {
        self.start + (self.end - self.start) * progress
    }

    /// Normalized progress for a frame (unclamped; callers clamp as needed).
    pub fn progress_for_frame(self, frame: f32) -> f32 {
        let span = self.end - self.start;
        if span == 0.0 {
            return 0.0;
        }
        (frame - self.start) / span
    }

    /// Whether `frame` lies in the half-open window `[start, end)`.
    pub fn contains(self, frame: f32) -> bool {
        self.start <= frame && frame < self.end
    }

    /// Clamp a frame into `[start, end]`.
    pub fn clamp(self, frame: f32) -> f32 {
        frame.clamp(self.start, self.end)
    }
}

/// Canvas size declared by a document, in document units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in document units.
    pub width: u32,
    /// Height in document units.
    pub height: u32,
}

impl Canvas {
    /// Construct from document dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The canvas as a kurbo rect anchored at the origin.
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Straight (non-premultiplied) RGBA color with `0..=1` channels.
///
/// Document colors arrive as float channels and are interpolated straight by
/// default; see [`crate::ColorMixing`] for the gamma-correct alternative.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    /// Red, `0..=1`.
    pub r: f32,
    /// Green, `0..=1`.
    pub g: f32,
    /// Blue, `0..=1`.
    pub b: f32,
    /// Alpha, `0..=1`, straight (not multiplied into the color channels).
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Opaque color from RGB channels.
    pub fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Construct from channel values.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a replaced alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Pack to 8-bit straight RGBA, rounding each channel.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn q(c: f32) -> u8 {
            (c.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
