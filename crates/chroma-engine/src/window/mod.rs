//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the one window, and launches the scene on it.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
