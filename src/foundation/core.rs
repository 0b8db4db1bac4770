use crate::foundation::error::{VfxError, VfxResult};

/// Frame dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a size value.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Create a size, rejecting zero dimensions.
    pub fn non_empty(width: u32, height: u32) -> VfxResult<Self> {
        if width == 0 || height == 0 {
            return Err(VfxError::validation(format!(
                "size must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered by this size.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Packed 8-bit pixel layouts exchanged with the host pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    /// Packed RGB, 3 bytes per pixel.
    Rgb24,
    /// Packed RGBA (straight alpha), 4 bytes per pixel.
    Rgb24a,
}

impl PixelFormat {
    /// Pick the packed layout for an alpha flag.
    pub fn from_alpha(has_alpha: bool) -> Self {
        if has_alpha { Self::Rgb24a } else { Self::Rgb24 }
    }

    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb24 => 3,
            Self::Rgb24a => 4,
        }
    }

    /// Whether pixels carry an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::Rgb24a)
    }

    /// Tightly packed byte length of a buffer of `size` in this format.
    pub fn buffer_len(self, size: Size) -> usize {
        size.pixel_count().saturating_mul(self.bytes_per_pixel())
    }
}

/// Normalized render time for an effect: `position / length`.
///
/// Position is passed through as supplied by the pipeline; only a non-positive length is
/// guarded (reported as time `0.0`).
pub fn normalized_time(position: i64, length: i64) -> f64 {
    if length <= 0 {
        return 0.0;
    }
    position as f64 / length as f64
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
