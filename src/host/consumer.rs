use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type StoppingCallback = Box<dyn FnOnce() + Send>;

/// The pipeline's output-driving component, reduced to its stop transition.
///
/// `stop` marks the consumer stopped before it notifies listeners, so anything that checks
/// [`Consumer::is_stopped`] after a listener fired sees `true`.
#[derive(Default)]
pub struct Consumer {
    stopped: AtomicBool,
    next_listener: AtomicU64,
    listeners: Mutex<Vec<(u64, StoppingCallback)>>,
}

impl std::fmt::Debug for Consumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("stopped", &self.is_stopped())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

impl Consumer {
    /// Create a running consumer.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Whether stopping has begun.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Begin stopping: mark the consumer stopped, then fire every "stopping" listener once.
    ///
    /// Listeners run on the calling thread, outside the listener lock. Stopping twice is a
    /// no-op.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        let listeners = std::mem::take(&mut *self.listeners.lock());
        tracing::debug!(listeners = listeners.len(), "consumer stopping");
        for (_, callback) in listeners {
            callback();
        }
    }

    /// Register a one-shot "stopping" callback.
    ///
    /// If the consumer already stopped the callback runs immediately. Dropping the returned
    /// handle unregisters a callback that has not fired yet.
    pub fn on_stopping(self: &Arc<Self>, callback: impl FnOnce() + Send + 'static) -> StopListener {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        {
            let mut listeners = self.listeners.lock();
            if !self.is_stopped() {
                listeners.push((id, Box::new(callback)));
                return StopListener {
                    consumer: Arc::downgrade(self),
                    id,
                };
            }
        }
        callback();
        StopListener {
            consumer: Weak::new(),
            id,
        }
    }

    /// Number of callbacks still registered.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Registration handle for a "stopping" callback.
#[derive(Debug)]
pub struct StopListener {
    consumer: Weak<Consumer>,
    id: u64,
}

impl StopListener {
    /// Return `true` when this handle is registered with `consumer`.
    pub fn is_for(&self, consumer: &Arc<Consumer>) -> bool {
        self.consumer
            .upgrade()
            .is_some_and(|c| Arc::ptr_eq(&c, consumer))
    }
}

impl Drop for StopListener {
    fn drop(&mut self) {
        if let Some(consumer) = self.consumer.upgrade() {
            consumer.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/consumer.rs"]
mod tests;
