//! Host pipeline collaborators: frames, properties, consumers and the scratch buffer pool.
//!
//! These are the small pieces of the pipeline the effect layer touches, modelled at the
//! interface level.

/// Stop-aware output consumer.
pub mod consumer;
/// Frames and image fetches.
pub mod frame;
/// Scratch pixel-buffer pool.
pub mod pool;
/// Property bags.
pub mod properties;
