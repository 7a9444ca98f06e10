//! Rendering backend seam.
//!
//! `RenderBackend` is a small, GL-shaped command interface: stages and programs
//! are compiled/linked by handle, buffers are uploaded once, and attributes are
//! wired to buffers by location before a single `draw_arrays`.
//!
//! Handles are plain indices owned by the backend that issued them. Passing a
//! handle to a different backend is a logic error; backends log and ignore it.

pub mod wgpu;

mod slots;
mod types;

pub use types::{
    AttributeLayout, BufferHandle, BufferUsage, ClearColor, ComponentType, ProgramHandle,
    StageHandle, StageKind, Topology, UniformLocation, ViewportRect,
};

/// Command interface implemented by rendering backends.
///
/// Only stage compilation and program linking can fail; the error value is the
/// backend's diagnostic log. Every other call is infallible at this seam:
/// a backend that cannot honor a call (unknown handle, missing location) logs
/// it and carries on, which leaves the result absent from the frame.
pub trait RenderBackend {
    /// Compiles `source` as a stage of the given kind.
    fn compile_stage(&mut self, kind: StageKind, source: &str) -> Result<StageHandle, String>;

    /// Links a vertex stage and a fragment stage into an executable program.
    fn link_program(
        &mut self,
        vertex: StageHandle,
        fragment: StageHandle,
    ) -> Result<ProgramHandle, String>;

    /// Location of the named per-vertex input, or `None` if the program has no such input.
    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;

    /// Location of the named uniform, or `None` if the program has no such uniform.
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Allocates a vertex buffer and uploads `data` into it.
    fn create_buffer(&mut self, data: &[f32], usage: BufferUsage) -> BufferHandle;

    /// Current backing size of the drawing surface in physical pixels.
    fn backing_size(&self) -> (u32, u32);

    fn set_viewport(&mut self, viewport: ViewportRect);

    /// Clears the color buffer.
    fn clear(&mut self, color: ClearColor);

    fn use_program(&mut self, program: ProgramHandle);

    fn enable_attribute(&mut self, location: u32);

    /// Describes how the attribute at `location` reads its data out of `buffer`.
    fn attribute_pointer(&mut self, location: u32, buffer: BufferHandle, layout: AttributeLayout);

    fn set_uniform_vec2(&mut self, location: UniformLocation, value: [f32; 2]);

    /// Draws `count` vertices starting at `first` with the current program.
    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32);
}
