use super::*;

fn pool(max_pool_bytes: usize, max_buffers_per_bucket: usize) -> Arc<BufferPool> {
    Arc::new(BufferPool::new(PoolOpts {
        max_pool_bytes,
        max_buffers_per_bucket,
    }))
}

#[test]
fn released_buffer_is_reused() {
    let p = pool(1 << 20, 4);
    drop(p.alloc(64));
    assert_eq!(p.stats().retained_buffers, 1);

    let b = p.alloc(64);
    assert_eq!(b.buffer().len(), 64);
    let st = p.stats();
    assert_eq!(st.alloc_buffers, 1);
    assert_eq!(st.reused_buffers, 1);
    assert_eq!(st.retained_buffers, 0);
}

#[test]
fn pool_honors_bucket_cap() {
    let p = pool(1 << 30, 1);
    let a = p.alloc(16);
    let b = p.alloc(16);
    drop(a);
    drop(b);

    let st = p.stats();
    assert_eq!(st.retained_buffers, 1);
    assert_eq!(st.dropped_on_release, 1);
}

#[test]
fn pool_honors_global_byte_cap() {
    let p = pool(16, 8);
    let a = p.alloc(16);
    let b = p.alloc(16);
    drop(a);
    drop(b);

    let st = p.stats();
    assert_eq!(st.retained_bytes, 16);
    assert_eq!(st.retained_buffers, 1);
    assert!(st.dropped_on_release >= 1);
}

#[test]
fn shared_buffer_is_not_reused() {
    let p = pool(1 << 20, 4);
    let scratch = p.alloc(8);
    let still_painting = scratch.buffer();
    drop(scratch);

    let st = p.stats();
    assert_eq!(st.retained_buffers, 0);
    assert_eq!(st.dropped_on_release, 1);
    assert_eq!(still_painting.len(), 8);
}
