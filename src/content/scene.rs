//! Scene documents for the built-in engine, and the CPU painter that renders them.

use crate::content::{
    DEFAULT_SOURCE_IMAGE_NAME, DEFAULT_TARGET_IMAGE_NAME, ImageType, ImageTypeMap,
};
use crate::foundation::core::{PixelFormat, Size};
use crate::foundation::error::{VfxError, VfxResult};

/// Direction a wipe travels in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WipeDir {
    /// Reveal from the left edge.
    #[default]
    #[serde(alias = "ltr")]
    LeftToRight,
    /// Reveal from the right edge.
    #[serde(alias = "rtl")]
    RightToLeft,
    /// Reveal from the top edge.
    #[serde(alias = "ttb")]
    TopToBottom,
    /// Reveal from the bottom edge.
    #[serde(alias = "btt")]
    BottomToTop,
}

/// What a scene paints.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneEffect {
    /// Solid colour (straight RGBA; alpha dropped for RGB targets).
    Fill {
        /// Fill colour.
        color: [u8; 4],
    },
    /// Copy of the source image.
    Source,
    /// Source fading into target over time.
    Crossfade,
    /// Target revealed over the source by a moving edge.
    Wipe {
        /// Travel direction.
        #[serde(default)]
        dir: WipeDir,
        /// Edge softness as a fraction of the travel axis, clamped to `[0, 1]`.
        #[serde(default)]
        soft_edge: f32,
    },
}

/// A scene document: the effect plus optional custom image slot names.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDocument {
    /// Effect to paint.
    pub effect: SceneEffect,
    /// Declared image slots. Empty means the effect's default slots.
    #[serde(default)]
    pub images: ImageTypeMap,
}

impl SceneDocument {
    /// Parse a JSON scene document.
    pub fn parse(text: &str) -> VfxResult<Self> {
        let mut doc: Self =
            serde_json::from_str(text).map_err(|e| VfxError::serde(e.to_string()))?;
        if let SceneEffect::Wipe { soft_edge, .. } = &mut doc.effect {
            if !soft_edge.is_finite() {
                return Err(VfxError::validation("wipe.soft_edge must be finite"));
            }
            *soft_edge = soft_edge.clamp(0.0, 1.0);
        }
        Ok(doc)
    }

    /// Image slots this scene samples.
    pub fn image_type_map(&self) -> ImageTypeMap {
        if !self.images.is_empty() {
            return self.images.clone();
        }
        let mut map = ImageTypeMap::new();
        match self.effect {
            SceneEffect::Fill { .. } => {}
            SceneEffect::Source => {
                map.insert(DEFAULT_SOURCE_IMAGE_NAME.to_string(), ImageType::Source);
            }
            SceneEffect::Crossfade | SceneEffect::Wipe { .. } => {
                map.insert(DEFAULT_SOURCE_IMAGE_NAME.to_string(), ImageType::Source);
                map.insert(DEFAULT_TARGET_IMAGE_NAME.to_string(), ImageType::Target);
            }
        }
        map
    }

    /// Name of the slot declared with `ty`, if any.
    pub fn slot_name(&self, ty: ImageType) -> Option<String> {
        self.image_type_map()
            .into_iter()
            .find(|(_, t)| *t == ty)
            .map(|(name, _)| name)
    }
}

/// Owned copy of an input image, taken before painting.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Pixel bytes.
    pub bytes: Vec<u8>,
    /// Dimensions.
    pub size: Size,
    /// Pixel layout.
    pub format: PixelFormat,
}

impl Snapshot {
    /// Nearest-neighbour sample at target coordinates, as straight RGBA.
    fn sample(&self, x: u32, y: u32, target: Size) -> [u8; 4] {
        if self.size.is_empty() || target.is_empty() {
            return [0, 0, 0, 0];
        }
        let sx = (u64::from(x) * u64::from(self.size.width) / u64::from(target.width)) as usize;
        let sy = (u64::from(y) * u64::from(self.size.height) / u64::from(target.height)) as usize;
        let bpp = self.format.bytes_per_pixel();
        let idx = (sy * self.size.width as usize + sx) * bpp;
        match self.bytes.get(idx..idx + bpp) {
            Some(px) if bpp == 4 => [px[0], px[1], px[2], px[3]],
            Some(px) => [px[0], px[1], px[2], 255],
            None => [0, 0, 0, 0],
        }
    }
}

/// Everything the painter needs for one frame.
#[derive(Clone, Debug)]
pub struct PaintInputs {
    /// Normalized time; clamped to `[0, 1]` when painting.
    pub time: f64,
    /// Source slot snapshot.
    pub source: Option<Snapshot>,
    /// Target slot snapshot.
    pub target: Option<Snapshot>,
}

/// Paint `effect` into `dst` (`size` pixels in `format`).
pub fn paint(
    effect: &SceneEffect,
    inputs: &PaintInputs,
    dst: &mut [u8],
    size: Size,
    format: PixelFormat,
) -> VfxResult<()> {
    let expected = format.buffer_len(size);
    if dst.len() < expected {
        return Err(VfxError::validation(format!(
            "paint target holds {} bytes, {size} {format:?} needs {expected}",
            dst.len()
        )));
    }
    let t = inputs.time.clamp(0.0, 1.0) as f32;
    let bpp = format.bytes_per_pixel();

    let need = |slot: &Option<Snapshot>, name: &str| {
        slot.clone()
            .ok_or_else(|| VfxError::validation(format!("scene needs the '{name}' image")))
    };

    match effect {
        SceneEffect::Fill { color } => {
            for px in dst[..expected].chunks_exact_mut(bpp) {
                px.copy_from_slice(&color[..bpp]);
            }
        }
        SceneEffect::Source => {
            let a = need(&inputs.source, "source")?;
            for_each_pixel(dst, size, bpp, |x, y| a.sample(x, y, size));
        }
        SceneEffect::Crossfade => {
            let a = need(&inputs.source, "source")?;
            let b = need(&inputs.target, "target")?;
            for_each_pixel(dst, size, bpp, |x, y| {
                crossfade(a.sample(x, y, size), b.sample(x, y, size), t)
            });
        }
        SceneEffect::Wipe { dir, soft_edge } => {
            let a = need(&inputs.source, "source")?;
            let b = need(&inputs.target, "target")?;
            let axis_len = match dir {
                WipeDir::LeftToRight | WipeDir::RightToLeft => size.width as f32,
                WipeDir::TopToBottom | WipeDir::BottomToTop => size.height as f32,
            };
            let soft_px = soft_edge.max(0.0) * axis_len;
            let edge = t * (axis_len + 2.0 * soft_px) - soft_px;

            for_each_pixel(dst, size, bpp, |x, y| {
                let pos = match dir {
                    WipeDir::LeftToRight => x as f32,
                    WipeDir::RightToLeft => (size.width - 1 - x) as f32,
                    WipeDir::TopToBottom => y as f32,
                    WipeDir::BottomToTop => (size.height - 1 - y) as f32,
                };
                let m = if soft_px <= 0.0 {
                    if pos < edge { 1.0 } else { 0.0 }
                } else {
                    1.0 - smoothstep(edge - soft_px, edge + soft_px, pos)
                };
                crossfade(a.sample(x, y, size), b.sample(x, y, size), m)
            });
        }
    }
    Ok(())
}

fn for_each_pixel(
    dst: &mut [u8],
    size: Size,
    bpp: usize,
    mut shade: impl FnMut(u32, u32) -> [u8; 4],
) {
    let width = size.width as usize;
    for (i, px) in dst
        .chunks_exact_mut(bpp)
        .take(size.pixel_count())
        .enumerate()
    {
        let x = (i % width) as u32;
        let y = (i / width) as u32;
        px.copy_from_slice(&shade(x, y)[..bpp]);
    }
}

fn crossfade(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = f32::from(a[i]);
        let bv = f32::from(b[i]);
        out[i] = (av + (bv - av) * t).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn smoothstep(a: f32, b: f32, x: f32) -> f32 {
    if x <= a {
        return 0.0;
    }
    if x >= b {
        return 1.0;
    }
    let t = (x - a) / (b - a);
    (t * t * (3.0 - 2.0 * t)).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/content/scene.rs"]
mod tests;
