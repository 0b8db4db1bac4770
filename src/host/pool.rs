use crate::content::image::PixelBuffer;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Pool configuration for scratch pixel buffers.
#[derive(Debug, Clone, Copy)]
pub struct PoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained buffers per byte-length bucket.
    pub max_buffers_per_bucket: usize,
}

impl Default for PoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_buffers_per_bucket: 4,
        }
    }
}

/// Allocation counters, mostly for tests and diagnostics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers currently held for reuse.
    pub retained_buffers: usize,
    /// Bytes currently held for reuse.
    pub retained_bytes: usize,
    /// Fresh allocations made.
    pub alloc_buffers: u64,
    /// Allocations served from a bucket.
    pub reused_buffers: u64,
    /// Buffers discarded on release (caps reached, or still shared).
    pub dropped_on_release: u64,
}

#[derive(Debug, Default)]
struct PoolInner {
    // Keyed by byte length; scratch copies are requested per frame size.
    buckets: HashMap<usize, Vec<Vec<u8>>>,
    stats: PoolStats,
}

/// Bounded, size-bucketed allocator for temporary frame copies.
///
/// [`BufferPool::alloc`] hands out a [`PooledBuffer`] that goes back to the pool when dropped.
/// A buffer whose handle is still shared at that point (a content engine finishing a cancelled
/// render) is dropped instead of being reused.
#[derive(Debug)]
pub struct BufferPool {
    opts: PoolOpts,
    inner: Mutex<PoolInner>,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolOpts::default())
    }
}

impl BufferPool {
    /// Create a pool.
    pub fn new(opts: PoolOpts) -> Self {
        Self {
            opts,
            inner: Mutex::new(PoolInner::default()),
        }
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats.clone()
    }

    /// Borrow a buffer of exactly `len` bytes. Contents are unspecified.
    pub fn alloc(self: &Arc<Self>, len: usize) -> PooledBuffer {
        let reused = {
            let mut inner = self.inner.lock();
            let bytes = inner.buckets.get_mut(&len).and_then(Vec::pop);
            if bytes.is_some() {
                inner.stats.retained_buffers = inner.stats.retained_buffers.saturating_sub(1);
                inner.stats.retained_bytes = inner.stats.retained_bytes.saturating_sub(len);
                inner.stats.reused_buffers = inner.stats.reused_buffers.saturating_add(1);
            } else {
                inner.stats.alloc_buffers = inner.stats.alloc_buffers.saturating_add(1);
            }
            bytes
        };

        let bytes = reused.unwrap_or_else(|| vec![0; len]);
        PooledBuffer {
            pool: Arc::clone(self),
            buffer: Some(PixelBuffer::new(bytes)),
        }
    }

    fn release(&self, bytes: Vec<u8>) {
        let len = bytes.len();
        let mut inner = self.inner.lock();
        let over_bytes = inner.stats.retained_bytes.saturating_add(len) > self.opts.max_pool_bytes;
        let bucket_full = inner
            .buckets
            .get(&len)
            .is_some_and(|b| b.len() >= self.opts.max_buffers_per_bucket);
        if self.opts.max_buffers_per_bucket == 0 || over_bytes || bucket_full {
            inner.stats.dropped_on_release = inner.stats.dropped_on_release.saturating_add(1);
            return;
        }

        inner.buckets.entry(len).or_default().push(bytes);
        inner.stats.retained_buffers = inner.stats.retained_buffers.saturating_add(1);
        inner.stats.retained_bytes = inner.stats.retained_bytes.saturating_add(len);
    }

    fn discard(&self) {
        let mut inner = self.inner.lock();
        inner.stats.dropped_on_release = inner.stats.dropped_on_release.saturating_add(1);
    }
}

/// Scoped scratch buffer; returns to its pool on drop.
#[derive(Debug)]
pub struct PooledBuffer {
    pool: Arc<BufferPool>,
    buffer: Option<PixelBuffer>,
}

impl PooledBuffer {
    /// Shared handle to the scratch bytes.
    pub fn buffer(&self) -> PixelBuffer {
        self.buffer.clone().unwrap_or_default()
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let Some(buffer) = self.buffer.take() else {
            return;
        };
        match buffer.try_into_inner() {
            Ok(bytes) => self.pool.release(bytes),
            Err(_) => {
                tracing::trace!("scratch buffer still shared on release, not reusing it");
                self.pool.discard();
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/pool.rs"]
mod tests;
