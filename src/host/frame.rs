use crate::content::image::{Image, PixelBuffer};
use crate::foundation::core::{PixelFormat, Size};
use crate::foundation::error::{VfxError, VfxResult};
use crate::host::consumer::Consumer;
use crate::host::properties::Properties;
use std::sync::Arc;

/// Frame property holding the consumer's preview scale.
pub const CONSUMER_SCALE_PROPERTY: &str = "consumer_scale";

/// Output profile of the host pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Profile {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl Profile {
    /// Profile dimensions as a [`Size`].
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Parameters of one image fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageRequest {
    /// Requested pixel layout.
    pub format: PixelFormat,
    /// Requested dimensions; producers may return their native size instead.
    pub size: Option<Size>,
    /// Whether the caller intends to write into the buffer.
    pub writable: bool,
}

impl ImageRequest {
    /// Request `format` at the producer's native size.
    pub fn new(format: PixelFormat) -> Self {
        Self {
            format,
            size: None,
            writable: false,
        }
    }

    /// Ask for specific dimensions.
    pub fn with_size(mut self, size: Option<Size>) -> Self {
        self.size = size;
        self
    }

    /// Set the writable hint.
    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }
}

/// A pixel buffer as handed out by the pipeline, with its layout.
#[derive(Clone, Debug)]
pub struct FrameImage {
    /// Shared pixel bytes.
    pub buffer: PixelBuffer,
    /// Pixel layout.
    pub format: PixelFormat,
    /// Dimensions.
    pub size: Size,
}

impl FrameImage {
    /// Wrap a buffer, checking that it is large enough for `size` in `format`.
    pub fn new(buffer: PixelBuffer, format: PixelFormat, size: Size) -> VfxResult<Self> {
        let need = format.buffer_len(size);
        if buffer.len() < need {
            return Err(VfxError::buffer(format!(
                "{size} {format:?} frame needs {need} bytes, buffer has {}",
                buffer.len()
            )));
        }
        Ok(Self {
            buffer,
            format,
            size,
        })
    }

    /// Wrap owned bytes.
    pub fn from_bytes(bytes: Vec<u8>, format: PixelFormat, size: Size) -> VfxResult<Self> {
        Self::new(PixelBuffer::new(bytes), format, size)
    }

    /// A frame filled with one colour; alpha is dropped for RGB.
    pub fn solid(size: Size, format: PixelFormat, rgba: [u8; 4]) -> Self {
        let bpp = format.bytes_per_pixel();
        let mut bytes = Vec::with_capacity(format.buffer_len(size));
        for _ in 0..size.pixel_count() {
            bytes.extend_from_slice(&rgba[..bpp]);
        }
        Self {
            buffer: PixelBuffer::new(bytes),
            format,
            size,
        }
    }

    /// Tightly packed byte length.
    pub fn byte_len(&self) -> usize {
        self.format.buffer_len(self.size)
    }

    /// Copy the pixel bytes out.
    pub fn to_vec(&self) -> Vec<u8> {
        let bytes = self.buffer.read();
        bytes[..self.byte_len().min(bytes.len())].to_vec()
    }

    /// An [`Image`] view over this frame's buffer.
    pub fn image(&self) -> VfxResult<Image> {
        Image::with_format(self.buffer.clone(), self.size, self.format)
    }

    /// Return this frame in `format`. Same format shares the buffer; otherwise the pixels are
    /// repacked into a new buffer (alpha added as opaque, or dropped).
    pub fn convert(&self, format: PixelFormat) -> FrameImage {
        if format == self.format {
            return self.clone();
        }
        let src = self.to_vec();
        let src_bpp = self.format.bytes_per_pixel();
        let mut out = Vec::with_capacity(format.buffer_len(self.size));
        for px in src.chunks_exact(src_bpp) {
            out.extend_from_slice(&px[..3]);
            if format.has_alpha() {
                out.push(255);
            }
        }
        FrameImage {
            buffer: PixelBuffer::new(out),
            format,
            size: self.size,
        }
    }
}

type GetImage = Box<dyn FnOnce(&mut Frame, ImageRequest) -> VfxResult<FrameImage> + Send>;

#[derive(Debug)]
enum BaseImage {
    Ready(FrameImage),
    Unavailable(String),
}

/// One frame travelling through the pipeline.
///
/// Effects attach themselves with [`Frame::push_get_image`]; [`Frame::get_image`] runs the most
/// recently pushed producer, which in turn fetches from the frame below it.
pub struct Frame {
    position: i64,
    properties: Properties,
    consumer: Option<Arc<Consumer>>,
    base: BaseImage,
    get_image_stack: Vec<GetImage>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("position", &self.position)
            .field("base", &self.base)
            .field("pending_producers", &self.get_image_stack.len())
            .finish()
    }
}

impl Frame {
    /// A frame at `position` whose producer yields `image`.
    pub fn new(position: i64, image: FrameImage) -> Self {
        Self::with_base(position, BaseImage::Ready(image))
    }

    /// A frame whose image fetch fails with `reason`.
    pub fn unavailable(position: i64, reason: impl Into<String>) -> Self {
        Self::with_base(position, BaseImage::Unavailable(reason.into()))
    }

    fn with_base(position: i64, base: BaseImage) -> Self {
        Self {
            position,
            properties: Properties::new(),
            consumer: None,
            base,
            get_image_stack: Vec::new(),
        }
    }

    /// Attach the consumer driving this frame.
    pub fn with_consumer(mut self, consumer: Arc<Consumer>) -> Self {
        self.consumer = Some(consumer);
        self
    }

    /// Replace the consumer driving this frame.
    pub fn set_consumer(&mut self, consumer: Option<Arc<Consumer>>) {
        self.consumer = consumer;
    }

    /// Absolute frame position.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Frame property bag.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Consumer driving this frame, if any.
    pub fn consumer(&self) -> Option<&Arc<Consumer>> {
        self.consumer.as_ref()
    }

    /// Whether this frame has a consumer that already began stopping.
    pub fn consumer_is_stopped(&self) -> bool {
        self.consumer.as_ref().is_some_and(|c| c.is_stopped())
    }

    /// Preview resolution scale: the positive `consumer_scale` property, else `1.0`.
    pub fn resolution_scale(&self) -> f64 {
        let scale = self.properties.get_double(CONSUMER_SCALE_PROPERTY);
        if scale > 0.0 { scale } else { 1.0 }
    }

    /// Push a deferred image producer.
    pub fn push_get_image(
        &mut self,
        get_image: impl FnOnce(&mut Frame, ImageRequest) -> VfxResult<FrameImage> + Send + 'static,
    ) {
        self.get_image_stack.push(Box::new(get_image));
    }

    /// Fetch this frame's image. The result becomes the frame's image for later fetches.
    pub fn get_image(&mut self, request: ImageRequest) -> VfxResult<FrameImage> {
        let image = match self.get_image_stack.pop() {
            Some(get_image) => get_image(self, request)?,
            None => match &self.base {
                BaseImage::Ready(image) => image.convert(request.format),
                BaseImage::Unavailable(reason) => return Err(VfxError::buffer(reason.clone())),
            },
        };
        self.base = BaseImage::Ready(image.clone());
        Ok(image)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/frame.rs"]
mod tests;
