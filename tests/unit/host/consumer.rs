use super::*;
use std::sync::atomic::AtomicUsize;

#[test]
fn stop_fires_listeners_once() {
    let consumer = Consumer::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let _listener = consumer.on_stopping(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });

    assert!(!consumer.is_stopped());
    consumer.stop();
    consumer.stop();
    assert!(consumer.is_stopped());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(consumer.listener_count(), 0);
}

#[test]
fn listener_sees_stopped_flag() {
    let consumer = Consumer::new();
    let seen = Arc::new(AtomicBool::new(false));
    let (c, s) = (Arc::clone(&consumer), Arc::clone(&seen));
    let _listener = consumer.on_stopping(move || s.store(c.is_stopped(), Ordering::SeqCst));
    consumer.stop();
    assert!(seen.load(Ordering::SeqCst));
}

#[test]
fn dropped_listener_is_unregistered() {
    let consumer = Consumer::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let listener = consumer.on_stopping(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });
    assert!(listener.is_for(&consumer));
    assert_eq!(consumer.listener_count(), 1);
    drop(listener);
    assert_eq!(consumer.listener_count(), 0);
    consumer.stop();
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn registering_on_stopped_consumer_fires_immediately() {
    let consumer = Consumer::new();
    consumer.stop();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&hits);
    let listener = consumer.on_stopping(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!listener.is_for(&consumer));
}
