//! Effect services and the per-service critical section around one frame's render.

/// Effect services and their factories.
pub mod effect;
/// Filter image-production entry point.
pub mod filter;
/// Render-completion handshake.
pub mod handshake;
/// Scoped per-service lock.
pub mod locker;
/// Per-service content and render state.
pub mod manager;
/// Transition image-production entry point.
pub mod transition;
