use crate::content::ContentFactory;
use crate::foundation::error::{VfxError, VfxResult};
use crate::host::frame::{Frame, Profile};
use crate::host::pool::BufferPool;
use crate::host::properties::Properties;
use crate::service::filter::filter_get_image;
use crate::service::manager::ServiceManager;
use crate::service::transition::transition_get_image;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Service property holding the content resource locator.
pub const RESOURCE_PROPERTY: &str = "resource";
/// Service property overriding the render wait timeout, in milliseconds (`0` = no timeout).
pub const RENDER_TIMEOUT_PROPERTY: &str = "render_timeout_ms";
/// Default bound on one render wait.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

static NEXT_SERVICE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an effect service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(pub u64);

/// Shape of an effect service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    /// One input frame, rendered in place.
    Filter,
    /// Two input frames: A rendered in place, B read-only.
    Transition,
}

/// Options for creating an effect service.
#[derive(Clone, Debug)]
pub struct ServiceOpts {
    /// Output profile, used by the transition preview-scale rule.
    pub profile: Option<Profile>,
    /// Initial `resource` property value.
    pub resource: Option<String>,
    /// Bound on one render wait; `None` waits until completion or cancellation.
    pub render_timeout: Option<Duration>,
    /// Scratch pool for transparent-mode copies.
    pub pool: Arc<BufferPool>,
}

impl Default for ServiceOpts {
    fn default() -> Self {
        Self {
            profile: None,
            resource: None,
            render_timeout: Some(DEFAULT_RENDER_TIMEOUT),
            pool: Arc::new(BufferPool::default()),
        }
    }
}

/// One configured filter or transition instance.
///
/// Owns the lazily created [`ServiceManager`] behind the per-service lock; see
/// [`crate::ServiceLocker`].
pub struct EffectService {
    id: ServiceId,
    kind: EffectKind,
    properties: Properties,
    profile: Option<Profile>,
    factory: Arc<dyn ContentFactory>,
    pool: Arc<BufferPool>,
    render_timeout: Option<Duration>,
    slot: Mutex<Option<ServiceManager>>,
}

impl std::fmt::Debug for EffectService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectService")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// Create a filter service whose content comes from `factory`.
pub fn create_filter(factory: Arc<dyn ContentFactory>, opts: ServiceOpts) -> Arc<EffectService> {
    Arc::new(EffectService::new(EffectKind::Filter, factory, opts))
}

/// Create a video-only transition service whose content comes from `factory`.
pub fn create_transition(
    factory: Arc<dyn ContentFactory>,
    opts: ServiceOpts,
) -> Arc<EffectService> {
    let service = EffectService::new(EffectKind::Transition, factory, opts);
    service.properties.set_int("_transition_type", 1);
    Arc::new(service)
}

impl EffectService {
    fn new(kind: EffectKind, factory: Arc<dyn ContentFactory>, opts: ServiceOpts) -> Self {
        let properties = Properties::new();
        if let Some(resource) = opts.resource {
            properties.set_string(RESOURCE_PROPERTY, resource);
        }
        let id = ServiceId(NEXT_SERVICE_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(service = id.0, ?kind, "effect service created");
        Self {
            id,
            kind,
            properties,
            profile: opts.profile,
            factory,
            pool: opts.pool,
            render_timeout: opts.render_timeout,
            slot: Mutex::new(None),
        }
    }

    /// Service identity.
    pub fn id(&self) -> ServiceId {
        self.id
    }

    /// Filter or transition.
    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Service property bag (mode flags, resource, scratch values).
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Output profile, if known.
    pub fn profile(&self) -> Option<Profile> {
        self.profile
    }

    /// Scratch buffer pool.
    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    pub(crate) fn factory(&self) -> &Arc<dyn ContentFactory> {
        &self.factory
    }

    pub(crate) fn lock_slot(&self) -> MutexGuard<'_, Option<ServiceManager>> {
        self.slot.lock()
    }

    /// Render wait bound: the `render_timeout_ms` property when set, else the service option.
    pub fn render_timeout(&self) -> Option<Duration> {
        if !self.properties.contains(RENDER_TIMEOUT_PROPERTY) {
            return self.render_timeout;
        }
        match self.properties.get_int(RENDER_TIMEOUT_PROPERTY) {
            ms if ms > 0 => Some(Duration::from_millis(ms as u64)),
            _ => None,
        }
    }

    /// Set the `in`/`out` points on the timeline.
    pub fn set_in_and_out(&self, in_point: i64, out_point: i64) {
        self.properties.set_int("in", in_point);
        self.properties.set_int("out", out_point);
    }

    /// Effect-relative position of `frame`.
    pub fn position(&self, frame: &Frame) -> i64 {
        frame.position() - self.properties.get_int("in")
    }

    /// Effect length in frames, at least 1.
    pub fn length(&self) -> i64 {
        let len = self.properties.get_int("out") - self.properties.get_int("in") + 1;
        len.max(1)
    }

    fn expect_kind(&self, kind: EffectKind) -> VfxResult<()> {
        if self.kind != kind {
            return Err(VfxError::validation(format!(
                "service {} is a {:?}, not a {kind:?}",
                self.id.0, self.kind
            )));
        }
        Ok(())
    }

    /// Attach this filter to `frame`; the effect runs when the frame's image is fetched.
    pub fn process_filter(self: &Arc<Self>, frame: &mut Frame) -> VfxResult<()> {
        self.expect_kind(EffectKind::Filter)?;
        let service = Arc::clone(self);
        frame.push_get_image(move |frame, request| filter_get_image(&service, frame, request));
        Ok(())
    }

    /// Attach this transition to `a_frame`, consuming `b_frame` as its second input.
    pub fn process_transition(
        self: &Arc<Self>,
        a_frame: &mut Frame,
        b_frame: Frame,
    ) -> VfxResult<()> {
        self.expect_kind(EffectKind::Transition)?;
        let service = Arc::clone(self);
        let mut b_frame = b_frame;
        a_frame.push_get_image(move |a_frame, request| {
            transition_get_image(&service, a_frame, &mut b_frame, request)
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/effect.rs"]
mod tests;
