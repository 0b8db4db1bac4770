use crate::foundation::core::Size;
use crate::foundation::error::{VfxError, VfxResult};
use crate::service::effect::EffectService;
use crate::service::manager::ServiceManager;
use parking_lot::MutexGuard;

/// Scoped, exclusive access to one service's [`ServiceManager`].
///
/// Construction takes the per-service lock; dropping the locker releases it, on every exit
/// path. The manager is only reachable through the locker, so it cannot be used after release.
pub struct ServiceLocker<'a> {
    service: &'a EffectService,
    guard: MutexGuard<'a, Option<ServiceManager>>,
}

impl<'a> ServiceLocker<'a> {
    /// Lock `service`, blocking until no other caller holds it.
    pub fn new(service: &'a EffectService) -> Self {
        let guard = service.lock_slot();
        tracing::trace!(service = service.id().0, "service locked");
        Self { service, guard }
    }

    /// Make sure the manager exists and its content is `width` x `height`.
    ///
    /// Must be the first call after locking. Creates the manager on first use and resizes the
    /// content when the size changed; the same size is a no-op. On failure the manager is
    /// discarded so the next call starts fresh.
    pub fn initialize(&mut self, width: u32, height: u32) -> VfxResult<()> {
        let size = Size::non_empty(width, height)?;
        let service = self.service.id().0;

        if let Some(manager) = self.guard.as_mut() {
            if manager.size() == size {
                return Ok(());
            }
            let resized = manager.resize(size);
            if let Err(err) = resized {
                tracing::error!(service, %size, error = %err, "content resize failed");
                *self.guard = None;
                return Err(err);
            }
            return Ok(());
        }

        match ServiceManager::new(self.service, size) {
            Ok(manager) => {
                *self.guard = Some(manager);
                Ok(())
            }
            Err(err) => {
                tracing::error!(service, %size, error = %err, "content creation failed");
                Err(err)
            }
        }
    }

    /// The locked manager. Fails if [`ServiceLocker::initialize`] has not succeeded.
    pub fn manager(&mut self) -> VfxResult<&mut ServiceManager> {
        let timeout = self.service.render_timeout();
        let manager = self
            .guard
            .as_mut()
            .ok_or_else(|| VfxError::validation("service manager used before initialize"))?;
        manager.set_render_timeout(timeout);
        Ok(manager)
    }
}

impl Drop for ServiceLocker<'_> {
    fn drop(&mut self) {
        tracing::trace!(service = self.service.id().0, "service unlocked");
    }
}
