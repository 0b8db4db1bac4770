use crate::content::image::Image;
use crate::foundation::core::PixelFormat;
use crate::foundation::error::VfxResult;
use crate::host::frame::{Frame, FrameImage, ImageRequest};
use crate::host::pool::{BufferPool, PooledBuffer};
use crate::service::effect::EffectService;
use crate::service::locker::ServiceLocker;
use std::sync::Arc;

/// Filter property: render over a transparent white canvas instead of over the frame.
pub const TRANSPARENT_PROPERTY: &str = "transparent";

/// Filter image-production entry point.
///
/// Fetches the frame as RGBA, lets the content paint into it under the service lock, and
/// returns it. A frame whose consumer already stopped passes through unchanged. In transparent
/// mode the original pixels are copied aside as the source image and the frame is cleared to
/// white with zero alpha right before the render.
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(service = service.id().0, frame = frame.position())
)]
pub fn filter_get_image(
    service: &EffectService,
    frame: &mut Frame,
    request: ImageRequest,
) -> VfxResult<FrameImage> {
    let position = service.position(frame);
    let length = service.length();

    let image = frame.get_image(
        ImageRequest::new(PixelFormat::Rgb24a)
            .with_size(request.size)
            .writable(true),
    )?;

    {
        let mut locker = ServiceLocker::new(service);
        locker.initialize(image.size.width, image.size.height)?;

        let rendered = image.image()?;
        let transparent = service.properties().get_int(TRANSPARENT_PROPERTY) != 0;
        let scratch = transparent.then(|| copy_aside(service.pool(), &image));
        let source = match &scratch {
            Some(scratch) => Image::with_format(scratch.buffer(), image.size, image.format)?,
            None => rendered.clone(),
        };

        let manager = locker.manager()?;
        let source_name = manager.source_image_name().to_string();
        manager.set_image_for_name(&source_name, source);
        manager.setup_consumer_listener(frame);

        // Rendering against a stopped consumer can deadlock against its stop sequence.
        if frame.consumer_is_stopped() {
            tracing::debug!("consumer stopped, passing frame through");
            manager.clear_images();
        } else {
            if transparent {
                clear_to_transparent_white(&rendered)?;
            }
            manager.render(&rendered, position, length, None);
        }
        drop(scratch);
    }

    Ok(image)
}

fn copy_aside(pool: &Arc<BufferPool>, image: &FrameImage) -> PooledBuffer {
    let scratch = pool.alloc(image.byte_len());
    {
        let src = image.buffer.read();
        let buffer = scratch.buffer();
        let mut dst = buffer.write();
        let len = dst.len().min(src.len());
        dst[..len].copy_from_slice(&src[..len]);
    }
    scratch
}

fn clear_to_transparent_white(image: &Image) -> VfxResult<()> {
    let size = image.size();
    let has_alpha = image.has_alpha();
    let mut pixels = image.pixels_mut()?;
    let bytes = &mut pixels[..size];
    bytes.fill(255);
    if has_alpha {
        for px in bytes.chunks_exact_mut(4) {
            px[3] = 0;
        }
    }
    Ok(())
}
