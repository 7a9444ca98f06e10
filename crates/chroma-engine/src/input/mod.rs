//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! `platform::winit` translates window events into [`PointerEvent`]s, which
//! drive the inert [`RangeDrag`] tracker.

mod drag;
mod types;

pub mod platform;

pub use drag::RangeDrag;
pub use types::{MouseButton, PointerEvent};
