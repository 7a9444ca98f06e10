use crate::backend::{
    AttributeLayout, BufferHandle, BufferUsage, ClearColor, ProgramHandle, RenderBackend,
    Topology, UniformLocation, ViewportRect,
};
use crate::shader::source::{FRAGMENT_SHADER_2D, VERTEX_SHADER_2D};
use crate::shader::{build_program, ProgramError};

pub const POSITION_ATTRIBUTE: &str = "a_position";
pub const COLOR_ATTRIBUTE: &str = "a_color";
pub const RESOLUTION_UNIFORM: &str = "u_resolution";

/// Two triangles tiling the rectangle (10, 20)–(180, 300), in pixels.
#[rustfmt::skip]
pub const QUAD_POSITIONS: [f32; 12] = [
    10.0, 20.0,
    180.0, 20.0,
    10.0, 300.0,

    10.0, 300.0,
    180.0, 20.0,
    180.0, 300.0,
];

/// One RGBA color per vertex of [`QUAD_POSITIONS`].
#[rustfmt::skip]
pub const QUAD_COLORS: [f32; 24] = [
    0.0, 0.0, 0.0, 1.0,
    1.0, 1.0, 0.0, 1.0,
    1.0, 0.0, 0.0, 1.0,

    1.0, 0.0, 0.0, 1.0,
    1.0, 1.0, 0.0, 1.0,
    0.0, 0.0, 0.0, 1.0,
];

pub const QUAD_VERTEX_COUNT: u32 = (QUAD_POSITIONS.len() / 2) as u32;

/// Locations resolved from the linked program. `None` means the name is absent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QuadLocations {
    pub position: Option<u32>,
    pub color: Option<u32>,
    pub resolution: Option<UniformLocation>,
}

/// Resources created by [`QuadScene::setup`].
///
/// Setup is single-shot: running it again allocates a second program and
/// buffer pair without releasing the first.
#[derive(Debug, Clone)]
pub struct QuadScene {
    pub program: ProgramHandle,
    pub locations: QuadLocations,
    pub position_buffer: BufferHandle,
    pub color_buffer: BufferHandle,
    /// Resolution the frame was drawn with.
    pub resolution: (u32, u32),
}

impl QuadScene {
    /// Builds the program, uploads the quad and issues one draw.
    ///
    /// A compile or link failure returns before any buffer is created.
    pub fn setup<B: RenderBackend + ?Sized>(backend: &mut B) -> Result<Self, ProgramError> {
        let program = build_program(backend, VERTEX_SHADER_2D, FRAGMENT_SHADER_2D)?;

        let locations = QuadLocations {
            position: backend.attribute_location(program, POSITION_ATTRIBUTE),
            color: backend.attribute_location(program, COLOR_ATTRIBUTE),
            resolution: backend.uniform_location(program, RESOLUTION_UNIFORM),
        };
        warn_missing(&locations);

        let position_buffer = backend.create_buffer(&QUAD_POSITIONS, BufferUsage::StaticDraw);

        let (width, height) = backend.backing_size();
        backend.set_viewport(ViewportRect::from_size(width, height));
        backend.clear(ClearColor::transparent());

        backend.use_program(program);

        if let Some(loc) = locations.position {
            backend.enable_attribute(loc);
        }

        let color_buffer = upload_colors(backend);
        if let Some(loc) = locations.color {
            backend.enable_attribute(loc);
            backend.attribute_pointer(loc, color_buffer, AttributeLayout::packed_f32(4));
        }
        if let Some(loc) = locations.position {
            backend.attribute_pointer(loc, position_buffer, AttributeLayout::packed_f32(2));
        }

        let resolution = backend.backing_size();
        if let Some(loc) = locations.resolution {
            backend.set_uniform_vec2(loc, [resolution.0 as f32, resolution.1 as f32]);
        }

        backend.draw_arrays(Topology::TriangleList, 0, QUAD_VERTEX_COUNT);
        log::info!("quad drawn at {}x{}", resolution.0, resolution.1);

        Ok(Self {
            program,
            locations,
            position_buffer,
            color_buffer,
            resolution,
        })
    }
}

/// Uploads one color per vertex.
fn upload_colors<B: RenderBackend + ?Sized>(backend: &mut B) -> BufferHandle {
    backend.create_buffer(&QUAD_COLORS, BufferUsage::StaticDraw)
}

fn warn_missing(locations: &QuadLocations) {
    if locations.position.is_none() {
        log::warn!("program has no `{POSITION_ATTRIBUTE}` input");
    }
    if locations.color.is_none() {
        log::warn!("program has no `{COLOR_ATTRIBUTE}` input");
    }
    if locations.resolution.is_none() {
        log::warn!("program has no `{RESOLUTION_UNIFORM}` uniform");
    }
}
