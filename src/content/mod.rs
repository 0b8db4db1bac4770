//! Content capability: the embedded engine that paints effect frames.
//!
//! The engine itself is external. This module fixes the contract the service layer drives,
//! plus a small CPU reference engine used by the command-line tool and tests.

/// Built-in CPU scene engine.
pub mod builtin;
/// Pixel buffer handles and image views.
pub mod image;
/// Resource locator parsing.
pub mod locator;
/// Named parameter lookups exposed to content.
pub mod parameters;
/// Scene documents understood by the built-in engine.
pub mod scene;

use crate::content::image::Image;
use crate::content::locator::ResourceLocator;
use crate::content::parameters::Parameters;
use crate::foundation::core::Size;
use crate::foundation::error::VfxResult;
use crate::service::handshake::RenderCompletion;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Slot name used for the source image when content declares none.
pub const DEFAULT_SOURCE_IMAGE_NAME: &str = "source";
/// Slot name used for the target image when content declares none.
pub const DEFAULT_TARGET_IMAGE_NAME: &str = "target";

/// Role of a named image slot declared by content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    /// The frame the effect is applied to (filter input, transition A frame).
    Source,
    /// The frame a transition moves towards (transition B frame).
    Target,
    /// Any other image the content samples.
    Extra,
}

/// Slot name to role, as declared by loaded content.
pub type ImageTypeMap = BTreeMap<String, ImageType>;

/// One render request handed to content.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// Normalized effect time, `position / length`.
    pub time: f64,
    /// Output image to paint into.
    pub target: Image,
    /// Optional resolution-scale hint, passed through unchanged.
    pub scale: Option<f64>,
}

/// A content engine instance bound to one effect service.
///
/// Instances are driven by one thread at a time (the service lock guarantees it) but may move
/// between worker threads, hence `Send`.
pub trait Content: Send {
    /// Load the content resource.
    fn load_content(&mut self, locator: &ResourceLocator) -> VfxResult<()>;

    /// Current render size.
    fn content_size(&self) -> Size;

    /// Change the render size.
    fn set_content_size(&mut self, size: Size) -> VfxResult<()>;

    /// Image slots the loaded content samples, with their roles.
    fn image_type_map(&self) -> ImageTypeMap;

    /// Bind (or clear) the image exposed under `name`.
    fn set_image(&mut self, name: &str, image: Option<Image>);

    /// Start painting `request.target` at `request.time`.
    ///
    /// Completion is asynchronous: the engine fires `completion` when the frame is done (or
    /// fails it, or drops it on error). The caller may stop waiting before that happens, in
    /// which case the engine may still be writing into `request.target`; the buffer handle it
    /// holds keeps that memory valid.
    fn render_content(&mut self, request: RenderRequest, completion: RenderCompletion);
}

/// Creates content engines for effect services.
pub trait ContentFactory: Send + Sync {
    /// Create an engine sized to `size`, with `parameters` for named value lookups.
    fn create_content(
        &self,
        size: Size,
        parameters: Arc<dyn Parameters>,
    ) -> VfxResult<Box<dyn Content>>;
}
