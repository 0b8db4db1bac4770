use crate::content::image::Image;
use crate::content::locator::ResourceLocator;
use crate::content::parameters::{Parameters, PropertyParameters};
use crate::content::{
    Content, DEFAULT_SOURCE_IMAGE_NAME, DEFAULT_TARGET_IMAGE_NAME, ImageType, ImageTypeMap,
    RenderRequest,
};
use crate::foundation::core::{Size, normalized_time};
use crate::foundation::error::{VfxError, VfxResult};
use crate::host::consumer::{Consumer, StopListener};
use crate::host::frame::Frame;
use crate::service::effect::{EffectService, RESOURCE_PROPERTY, ServiceId};
use crate::service::handshake::{RenderOutcome, RenderSignal};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Per-service render state: the content engine, the image slots bound for the next render,
/// and the completion handshake.
///
/// Only reachable through a [`crate::ServiceLocker`], which serializes every caller, so at
/// most one render is in flight per manager.
pub struct ServiceManager {
    service: ServiceId,
    content: Box<dyn Content>,
    images: HashMap<String, Image>,
    source_image_name: String,
    target_image_name: String,
    signal: RenderSignal,
    consumer: Option<Weak<Consumer>>,
    stop_listener: Option<StopListener>,
    render_timeout: Option<Duration>,
}

impl std::fmt::Debug for ServiceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceManager")
            .field("service", &self.service)
            .field("size", &self.size())
            .field("source_image_name", &self.source_image_name)
            .field("target_image_name", &self.target_image_name)
            .field("render_timeout", &self.render_timeout)
            .finish_non_exhaustive()
    }
}

fn slot_name(types: &ImageTypeMap, ty: ImageType, default: &str) -> String {
    types
        .iter()
        .find(|(_, t)| **t == ty)
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| default.to_string())
}

impl ServiceManager {
    pub(crate) fn new(service: &EffectService, size: Size) -> VfxResult<Self> {
        let resource = service
            .properties()
            .get_string(RESOURCE_PROPERTY)
            .ok_or_else(|| VfxError::content("no resource set on the effect service"))?;
        let locator = ResourceLocator::parse(&resource)?;

        let parameters: Arc<dyn Parameters> =
            Arc::new(PropertyParameters::new(service.properties().clone()));
        let mut content = service.factory().create_content(size, parameters)?;
        content.load_content(&locator)?;

        let types = content.image_type_map();
        let source_image_name = slot_name(&types, ImageType::Source, DEFAULT_SOURCE_IMAGE_NAME);
        let target_image_name = slot_name(&types, ImageType::Target, DEFAULT_TARGET_IMAGE_NAME);

        tracing::debug!(
            service = service.id().0,
            %size,
            resource = %locator,
            source = %source_image_name,
            target = %target_image_name,
            "content created"
        );

        Ok(Self {
            service: service.id(),
            content,
            images: HashMap::new(),
            source_image_name,
            target_image_name,
            signal: RenderSignal::new(),
            consumer: None,
            stop_listener: None,
            render_timeout: service.render_timeout(),
        })
    }

    /// Current content size.
    pub fn size(&self) -> Size {
        self.content.content_size()
    }

    pub(crate) fn resize(&mut self, size: Size) -> VfxResult<()> {
        self.content.set_content_size(size)?;
        tracing::debug!(service = self.service.0, %size, "content resized");
        Ok(())
    }

    pub(crate) fn set_render_timeout(&mut self, timeout: Option<Duration>) {
        self.render_timeout = timeout;
    }

    /// Slot name the content reads the source frame from.
    pub fn source_image_name(&self) -> &str {
        &self.source_image_name
    }

    /// Slot name the content reads the transition target frame from.
    pub fn target_image_name(&self) -> &str {
        &self.target_image_name
    }

    /// Register `image` under `name` for the next render, replacing any earlier registration.
    pub fn set_image_for_name(&mut self, name: &str, image: Image) {
        self.images.insert(name.to_string(), image);
    }

    /// Forget registrations that were not rendered.
    pub fn clear_images(&mut self) {
        self.images.clear();
    }

    /// Follow the consumer of `frame`: when it begins stopping, any render wait is cancelled.
    ///
    /// Listening to the same consumer again is a no-op; a different consumer replaces the old
    /// registration. A frame without a consumer drops the previous registration, so a consumer
    /// from an earlier frame never gates this frame's render.
    pub fn setup_consumer_listener(&mut self, frame: &Frame) {
        let Some(consumer) = frame.consumer() else {
            self.stop_listener = None;
            self.consumer = None;
            return;
        };
        if self
            .stop_listener
            .as_ref()
            .is_some_and(|listener| listener.is_for(consumer))
        {
            return;
        }

        self.stop_listener = None;
        let canceller = self.signal.canceller();
        let service = self.service.0;
        self.stop_listener = Some(consumer.on_stopping(move || {
            if canceller.cancel() {
                tracing::debug!(service, "consumer stopping, render wait cancelled");
            }
        }));
        self.consumer = Some(Arc::downgrade(consumer));
    }

    fn consumer_is_stopped(&self) -> bool {
        self.consumer
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|c| c.is_stopped())
    }

    /// Render into `image` at `position / length` and block until the content completes, the
    /// consumer begins stopping, or the render timeout elapses.
    ///
    /// Anything but [`RenderOutcome::Completed`] means the render was abandoned: `image` may be
    /// partially painted, and the content may still be writing into it.
    pub fn render(
        &mut self,
        image: &Image,
        position: i64,
        length: i64,
        scale: Option<f64>,
    ) -> RenderOutcome {
        let service = self.service.0;
        let time = normalized_time(position, length);

        let bound: Vec<String> = self.images.keys().cloned().collect();
        for (name, slot) in self.images.drain() {
            self.content.set_image(&name, Some(slot));
        }

        let completion = self.signal.arm();
        // A stop that began after the caller's check but before arming is caught here; one
        // that begins later reaches the armed signal through the listener.
        let outcome = if self.consumer_is_stopped() {
            self.signal.cancel();
            drop(completion);
            tracing::debug!(service, "consumer stopped before render start, render skipped");
            self.signal.wait(None)
        } else {
            tracing::trace!(service, time, ?scale, "render issued");
            let request = RenderRequest {
                time,
                target: image.clone(),
                scale,
            };
            self.content.render_content(request, completion);
            self.signal.wait(self.render_timeout)
        };

        for name in &bound {
            self.content.set_image(name, None);
        }

        match &outcome {
            RenderOutcome::Completed => tracing::trace!(service, "render completed"),
            RenderOutcome::Cancelled => tracing::debug!(service, "render abandoned"),
            RenderOutcome::Failed(reason) => {
                tracing::warn!(service, %reason, "content render failed")
            }
            RenderOutcome::TimedOut => tracing::warn!(
                service,
                timeout = ?self.render_timeout,
                "render wait timed out, abandoning render"
            ),
        }
        outcome
    }
}
