//! Rendering context + display surface management.
//!
//! This module is responsible for:
//! - requesting the wgpu Instance/Adapter/Device/Queue for a window
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and providing encoders/views for rendering
//! - the backing-size helper for display surfaces

mod context;
mod display;
mod init;
mod surface;

pub use context::{Gpu, GpuFrame};
pub use display::{
    match_backing_size, resize_surface_to_display_size, resize_surface_to_display_size_default,
    DisplaySurface,
};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
