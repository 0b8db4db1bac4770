use crate::content::locator::ResourceLocator;
use crate::foundation::core::PixelFormat;
use crate::foundation::error::VfxResult;
use crate::host::frame::{CONSUMER_SCALE_PROPERTY, Frame, FrameImage, ImageRequest};
use crate::service::effect::{EffectService, RESOURCE_PROPERTY};
use crate::service::locker::ServiceLocker;

/// Transition property: keep preview scaling even for non-plain resources.
pub const RESOLUTION_SCALE_PROPERTY: &str = "mlt_resolution_scale";
/// Transition property written back with the A frame's resolution scale.
pub const FRAME_RESOLUTION_SCALE_PROPERTY: &str = "mlt_frame_resolution_scale";

/// Transition image-production entry point.
///
/// Frame A is fetched writable and is both the render target and the source slot; frame B is
/// fetched read-only and bound as the target slot, so it is never modified. Both are RGB.
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(service = service.id().0, frame = a_frame.position())
)]
pub fn transition_get_image(
    service: &EffectService,
    a_frame: &mut Frame,
    b_frame: &mut Frame,
    request: ImageRequest,
) -> VfxResult<FrameImage> {
    let position = service.position(a_frame);
    let length = service.length();
    let properties = service.properties();

    // Non-plain content is rendered at full profile size rather than preview size.
    let mut size = request.size;
    if properties.get_int(RESOLUTION_SCALE_PROPERTY) == 0
        && let Some(resource) = properties.get_string(RESOURCE_PROPERTY)
        && let Some(profile) = service.profile()
        && !ResourceLocator::parse(&resource).is_ok_and(|l| l.is_plain())
    {
        size = Some(profile.size());
        a_frame
            .properties()
            .set_double(CONSUMER_SCALE_PROPERTY, 1.0);
    }

    let scale = a_frame.resolution_scale();
    properties.set_double(FRAME_RESOLUTION_SCALE_PROPERTY, scale);

    let a_image = a_frame.get_image(
        ImageRequest::new(PixelFormat::Rgb24)
            .with_size(size)
            .writable(true),
    )?;
    let b_image = b_frame.get_image(ImageRequest::new(a_image.format).writable(false))?;

    {
        let mut locker = ServiceLocker::new(service);
        locker.initialize(a_image.size.width, a_image.size.height)?;

        let rendered = a_image.image()?;
        let target = b_image.image()?.into_read_only();

        let manager = locker.manager()?;
        let source_name = manager.source_image_name().to_string();
        let target_name = manager.target_image_name().to_string();
        manager.set_image_for_name(&source_name, rendered.clone());
        manager.set_image_for_name(&target_name, target);
        manager.setup_consumer_listener(a_frame);

        // Rendering against a stopped consumer can deadlock against its stop sequence.
        if a_frame.consumer_is_stopped() {
            tracing::debug!("consumer stopped, passing frame through");
            manager.clear_images();
        } else {
            manager.render(&rendered, position, length, Some(scale));
        }
    }

    Ok(a_image)
}
