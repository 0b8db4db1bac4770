//! webvfx renders web-authored content as video filters and transitions inside a
//! multithreaded frame pipeline.
//!
//! The pipeline may call one effect from many worker threads at once, while the content engine
//! behind it must be driven by one caller at a time and completes renders asynchronously. This
//! crate provides the layer in between:
//!
//! - [`ServiceLocker`]: scoped per-service lock that lazily creates and sizes the engine
//! - [`ServiceManager`]: engine, image slots, and the render-completion handshake
//! - consumer-stop cancellation, so a render never deadlocks against the pipeline stopping
//! - [`filter_get_image`] / [`transition_get_image`]: the two image-production entry points
#![forbid(unsafe_code)]

mod foundation;

/// Content capability and the built-in scene engine.
pub mod content;
/// Host pipeline collaborators.
pub mod host;
/// Effect services, locking, and the render handshake.
pub mod service;

pub use crate::foundation::core::{PixelFormat, Size, normalized_time};
pub use crate::foundation::error::{VfxError, VfxResult};

pub use crate::content::builtin::{SceneContent, SceneContentFactory};
pub use crate::content::image::{Image, PixelBuffer};
pub use crate::content::locator::ResourceLocator;
pub use crate::content::parameters::{Parameters, PropertyParameters, Rect};
pub use crate::content::{
    Content, ContentFactory, DEFAULT_SOURCE_IMAGE_NAME, DEFAULT_TARGET_IMAGE_NAME, ImageType,
    ImageTypeMap, RenderRequest,
};
pub use crate::host::consumer::{Consumer, StopListener};
pub use crate::host::frame::{CONSUMER_SCALE_PROPERTY, Frame, FrameImage, ImageRequest, Profile};
pub use crate::host::pool::{BufferPool, PoolOpts, PoolStats, PooledBuffer};
pub use crate::host::properties::{PropValue, Properties};
pub use crate::service::effect::{
    DEFAULT_RENDER_TIMEOUT, EffectKind, EffectService, RENDER_TIMEOUT_PROPERTY,
    RESOURCE_PROPERTY, ServiceId, ServiceOpts, create_filter, create_transition,
};
pub use crate::service::filter::{TRANSPARENT_PROPERTY, filter_get_image};
pub use crate::service::handshake::{RenderCanceller, RenderCompletion, RenderOutcome, RenderSignal};
pub use crate::service::locker::ServiceLocker;
pub use crate::service::manager::ServiceManager;
pub use crate::service::transition::{
    FRAME_RESOLUTION_SCALE_PROPERTY, RESOLUTION_SCALE_PROPERTY, transition_get_image,
};
