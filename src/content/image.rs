use crate::foundation::core::{PixelFormat, Size};
use crate::foundation::error::{VfxError, VfxResult};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared handle to one frame's pixel memory.
///
/// Cloning the handle never copies pixels. The memory stays alive for as long as any holder
/// (pipeline, scratch pool, content engine) keeps a clone, so an engine that is still painting
/// after its render wait was abandoned always writes into valid memory.
#[derive(Clone, Debug, Default)]
pub struct PixelBuffer {
    bytes: Arc<RwLock<Vec<u8>>>,
}

impl PixelBuffer {
    /// Wrap owned bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(RwLock::new(bytes)),
        }
    }

    /// Allocate `len` zeroed bytes.
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0; len])
    }

    /// Byte length of the buffer.
    pub fn len(&self) -> usize {
        self.bytes.read().len()
    }

    /// Return `true` when the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        self.bytes.read()
    }

    /// Exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<u8>> {
        self.bytes.write()
    }

    /// Copy the current contents out.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.read().clone()
    }

    /// Return `true` when both handles refer to the same memory.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    /// Take the bytes back if this is the only handle left.
    pub fn try_into_inner(self) -> Result<Vec<u8>, Self> {
        match Arc::try_unwrap(self.bytes) {
            Ok(lock) => Ok(lock.into_inner()),
            Err(bytes) => Err(Self { bytes }),
        }
    }
}

/// A view over one pixel buffer: dimensions, byte size and alpha flag.
///
/// Built right before a render call and dropped right after it. The view shares the buffer
/// handle; it never copies pixel data.
#[derive(Clone, Debug)]
pub struct Image {
    buffer: PixelBuffer,
    width: u32,
    height: u32,
    size: usize,
    has_alpha: bool,
    writable: bool,
}

impl Image {
    /// Create a writable view. `size` must equal `width * height * (4 if alpha else 3)` and
    /// fit inside the buffer.
    pub fn new(
        buffer: PixelBuffer,
        width: u32,
        height: u32,
        size: usize,
        has_alpha: bool,
    ) -> VfxResult<Self> {
        let expected = PixelFormat::from_alpha(has_alpha).buffer_len(Size::new(width, height));
        if size != expected {
            return Err(VfxError::validation(format!(
                "image size {size} does not match {width}x{height} (alpha={has_alpha}), expected {expected}"
            )));
        }
        let available = buffer.len();
        if available < size {
            return Err(VfxError::validation(format!(
                "image size {size} exceeds buffer length {available}"
            )));
        }
        Ok(Self {
            buffer,
            width,
            height,
            size,
            has_alpha,
            writable: true,
        })
    }

    /// Create a view with the byte size derived from the dimensions.
    pub fn with_format(buffer: PixelBuffer, size: Size, format: PixelFormat) -> VfxResult<Self> {
        Self::new(
            buffer,
            size.width,
            size.height,
            format.buffer_len(size),
            format.has_alpha(),
        )
    }

    /// Same view, but refusing write access through [`Image::pixels_mut`], the only write path
    /// an [`Image`] exposes. Clones keep the restriction.
    pub fn into_read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a [`Size`].
    pub fn dimensions(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Byte size of the pixel data.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether pixels carry an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Packed layout of the pixels.
    pub fn format(&self) -> PixelFormat {
        PixelFormat::from_alpha(self.has_alpha)
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        (self.width as usize).saturating_mul(self.format().bytes_per_pixel())
    }

    /// Whether the view allows writing.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Copy the pixel bytes out (exactly [`Image::size`] bytes).
    pub fn snapshot(&self) -> Vec<u8> {
        let bytes = self.buffer.read();
        bytes[..self.size.min(bytes.len())].to_vec()
    }

    /// Exclusive access to the underlying bytes for painting.
    pub fn pixels_mut(&self) -> VfxResult<RwLockWriteGuard<'_, Vec<u8>>> {
        if !self.writable {
            return Err(VfxError::validation("image view is read-only"));
        }
        Ok(self.buffer.write())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/image.rs"]
mod tests;
