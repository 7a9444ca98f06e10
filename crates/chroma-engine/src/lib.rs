//! Chroma engine crate.
//!
//! Draws one vertex-colored quad through a GL-shaped backend seam. The wgpu
//! backend owns the window surface; tests drive the same seam with a recorder.

pub mod backend;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod scene;
pub mod shader;
pub mod window;
