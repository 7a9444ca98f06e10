//! wgpu implementation of [`RenderBackend`].
//!
//! GL-style immediate calls are recorded into draw state and replayed as one
//! render pass when `draw_arrays` runs:
//! - `clear` becomes the pass load op,
//! - each reflected vertex input gets its own tightly packed buffer slot,
//! - uniform blocks live in per-program uniform buffers written on `set_uniform_*`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::Result;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::shader::reflect::{self, ProgramInterface, StageReflection};

use super::slots::resolve_vertex_slots;
use super::{
    AttributeLayout, BufferHandle, BufferUsage, ClearColor, ProgramHandle, RenderBackend,
    StageHandle, StageKind, Topology, UniformLocation, ViewportRect,
};

struct StageEntry {
    module: wgpu::ShaderModule,
    reflection: StageReflection,
}

struct UniformSlot {
    group: u32,
    binding: u32,
    buffer: wgpu::Buffer,
}

struct ProgramEntry {
    vertex: usize,
    fragment: usize,
    interface: ProgramInterface,
    layout: wgpu::PipelineLayout,
    /// One bind group per group index used by the program.
    bind_groups: Vec<(u32, wgpu::BindGroup)>,
    uniforms: Vec<UniformSlot>,
    pipelines: HashMap<Topology, wgpu::RenderPipeline>,
}

/// Draw state accumulated between `draw_arrays` calls.
#[derive(Default)]
struct DrawState {
    program: Option<ProgramHandle>,
    viewport: Option<ViewportRect>,
    pending_clear: Option<ClearColor>,
    enabled: BTreeSet<u32>,
    pointers: BTreeMap<u32, (BufferHandle, AttributeLayout)>,
}

/// [`RenderBackend`] driving a window surface through wgpu.
pub struct WgpuBackend<'w> {
    gpu: Gpu<'w>,
    stages: Vec<StageEntry>,
    programs: Vec<ProgramEntry>,
    buffers: Vec<wgpu::Buffer>,
    state: DrawState,
}

impl<'w> WgpuBackend<'w> {
    /// Requests a rendering context for `window` and wraps it.
    pub fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let gpu = pollster::block_on(Gpu::new(window, init))?;
        Ok(Self::from_gpu(gpu))
    }

    pub fn from_gpu(gpu: Gpu<'w>) -> Self {
        Self {
            gpu,
            stages: Vec::new(),
            programs: Vec::new(),
            buffers: Vec::new(),
            state: DrawState::default(),
        }
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut Gpu<'w> {
        &mut self.gpu
    }

    fn build_pipeline(&self, program: &ProgramEntry, topology: Topology) -> wgpu::RenderPipeline {
        let vertex = &self.stages[program.vertex];
        let fragment = &self.stages[program.fragment];

        // Formats were checked at link time.
        let attributes: Vec<[wgpu::VertexAttribute; 1]> = program
            .interface
            .attributes
            .iter()
            .filter_map(|a| {
                Some([wgpu::VertexAttribute {
                    format: a.ty.vertex_format()?,
                    offset: 0,
                    shader_location: a.location,
                }])
            })
            .collect();

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = attributes
            .iter()
            .map(|attr| wgpu::VertexBufferLayout {
                array_stride: attr[0].format.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attr,
            })
            .collect();

        self.gpu
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("chroma program pipeline"),
                layout: Some(&program.layout),

                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some("main"),
                    compilation_options: Default::default(),
                    buffers: &buffers,
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some("main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.gpu.surface_format(),
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: topology.to_wgpu(),
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
    }
}

impl RenderBackend for WgpuBackend<'_> {
    fn compile_stage(&mut self, kind: StageKind, source: &str) -> Result<StageHandle, String> {
        let reflection = reflect::parse_stage(kind, source)?;

        let label = format!("chroma {kind} stage");
        let module = self
            .gpu
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Glsl {
                    shader: source.into(),
                    stage: kind.to_naga(),
                    defines: &[],
                },
            });

        let handle = StageHandle(self.stages.len() as u32);
        self.stages.push(StageEntry { module, reflection });
        Ok(handle)
    }

    fn link_program(
        &mut self,
        vertex: StageHandle,
        fragment: StageHandle,
    ) -> Result<ProgramHandle, String> {
        let (vi, fi) = (vertex.0 as usize, fragment.0 as usize);
        let (Some(vs), Some(fs)) = (self.stages.get(vi), self.stages.get(fi)) else {
            return Err(format!("unknown stage handle in {vertex:?} / {fragment:?}"));
        };

        let interface = ProgramInterface::link(&vs.reflection, &fs.reflection)?;

        if let Some(bad) = interface.attributes.iter().find(|a| a.ty.vertex_format().is_none()) {
            return Err(format!(
                "vertex input `{}` (location {}) has no vertex buffer format",
                bad.name.as_deref().unwrap_or("<unnamed>"),
                bad.location
            ));
        }

        let device = self.gpu.device();

        let mut entries_by_group: BTreeMap<u32, Vec<wgpu::BindGroupLayoutEntry>> = BTreeMap::new();
        for block in &interface.uniforms {
            entries_by_group
                .entry(block.group)
                .or_default()
                .push(wgpu::BindGroupLayoutEntry {
                    binding: block.binding,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                });
        }

        // Pipeline layouts are indexed by group; fill gaps with empty layouts.
        let group_count = entries_by_group.keys().next_back().map_or(0, |g| g + 1);
        let group_layouts: Vec<wgpu::BindGroupLayout> = (0..group_count)
            .map(|group| {
                let entries = entries_by_group.get(&group).map_or(&[][..], Vec::as_slice);
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("chroma uniform bgl"),
                    entries,
                })
            })
            .collect();

        let uniforms: Vec<UniformSlot> = interface
            .uniforms
            .iter()
            .map(|block| UniformSlot {
                group: block.group,
                binding: block.binding,
                buffer: device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("chroma uniform block"),
                    size: u64::from(block.size.max(16).next_multiple_of(16)),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }),
            })
            .collect();

        let bind_groups = entries_by_group
            .keys()
            .map(|&group| {
                let entries: Vec<wgpu::BindGroupEntry<'_>> = uniforms
                    .iter()
                    .filter(|u| u.group == group)
                    .map(|u| wgpu::BindGroupEntry {
                        binding: u.binding,
                        resource: u.buffer.as_entire_binding(),
                    })
                    .collect();
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("chroma uniform bind group"),
                    layout: &group_layouts[group as usize],
                    entries: &entries,
                });
                (group, bind_group)
            })
            .collect();

        let layout_refs: Vec<&wgpu::BindGroupLayout> = group_layouts.iter().collect();
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("chroma program layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        let mut entry = ProgramEntry {
            vertex: vi,
            fragment: fi,
            interface,
            layout,
            bind_groups,
            uniforms,
            pipelines: HashMap::new(),
        };

        // Triangle lists are the common case; building it now also surfaces
        // pipeline problems at link time.
        let pipeline = self.build_pipeline(&entry, Topology::TriangleList);
        entry.pipelines.insert(Topology::TriangleList, pipeline);

        let handle = ProgramHandle(self.programs.len() as u32);
        self.programs.push(entry);
        Ok(handle)
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.programs
            .get(program.0 as usize)?
            .interface
            .attribute_location(name)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.programs
            .get(program.0 as usize)?
            .interface
            .uniform_location(name)
    }

    fn create_buffer(&mut self, data: &[f32], usage: BufferUsage) -> BufferHandle {
        let usage = match usage {
            BufferUsage::StaticDraw => wgpu::BufferUsages::VERTEX,
            BufferUsage::DynamicDraw => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        };

        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("chroma vertex buffer"),
                contents: bytemuck::cast_slice(data),
                usage,
            });

        let handle = BufferHandle(self.buffers.len() as u32);
        self.buffers.push(buffer);
        handle
    }

    fn backing_size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }

    fn set_viewport(&mut self, viewport: ViewportRect) {
        self.state.viewport = Some(viewport);
    }

    fn clear(&mut self, color: ClearColor) {
        self.state.pending_clear = Some(color);
    }

    fn use_program(&mut self, program: ProgramHandle) {
        if (program.0 as usize) < self.programs.len() {
            self.state.program = Some(program);
        } else {
            log::warn!("use_program: unknown {program:?}");
        }
    }

    fn enable_attribute(&mut self, location: u32) {
        self.state.enabled.insert(location);
    }

    fn attribute_pointer(&mut self, location: u32, buffer: BufferHandle, layout: AttributeLayout) {
        self.state.pointers.insert(location, (buffer, layout));
    }

    fn set_uniform_vec2(&mut self, location: UniformLocation, value: [f32; 2]) {
        let Some(program) = self.state.program.and_then(|p| self.programs.get(p.0 as usize)) else {
            log::warn!("set_uniform_vec2: no program in use");
            return;
        };
        let Some(slot) = program
            .uniforms
            .iter()
            .find(|u| u.group == location.group && u.binding == location.binding)
        else {
            log::warn!("set_uniform_vec2: {location:?} is not a uniform of the current program");
            return;
        };

        self.gpu
            .queue()
            .write_buffer(&slot.buffer, u64::from(location.offset), bytemuck::cast_slice(&value));
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) {
        if count == 0 {
            return;
        }
        let Some(handle) = self.state.program else {
            log::warn!("draw_arrays: no program in use; nothing drawn");
            return;
        };
        let index = handle.0 as usize;

        if !self.programs[index].pipelines.contains_key(&topology) {
            let pipeline = self.build_pipeline(&self.programs[index], topology);
            self.programs[index].pipelines.insert(topology, pipeline);
        }

        let program = &self.programs[index];
        let buffer_sizes: Vec<u64> = self.buffers.iter().map(wgpu::Buffer::size).collect();
        let checked = resolve_vertex_slots(
            &program.interface.attributes,
            &self.state.enabled,
            &self.state.pointers,
            &buffer_sizes,
        )
        .and_then(|slots| Ok((slots.draw_range(first, count)?, slots.bound)));
        let (vertices, bound) = match checked {
            Ok(checked) => checked,
            Err(reason) => {
                log::warn!("draw_arrays skipped: {reason}");
                return;
            }
        };

        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("failed to acquire surface texture: {err}");
                match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => log::error!("surface is unusable; frame dropped"),
                    action => log::debug!("frame dropped ({action:?})"),
                }
                return;
            }
        };

        let load = match self.state.pending_clear.take() {
            Some(color) => wgpu::LoadOp::Clear(color.to_wgpu()),
            None => wgpu::LoadOp::Load,
        };

        let (target_w, target_h) = self.backing_size();

        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("chroma draw"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(vp) = self.state.viewport {
                // The render target bounds the viewport.
                let x = vp.x.min(target_w);
                let y = vp.y.min(target_h);
                let w = vp.width.min(target_w - x);
                let h = vp.height.min(target_h - y);
                if w > 0 && h > 0 {
                    rpass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
                }
            }

            if let Some(pipeline) = program.pipelines.get(&topology) {
                rpass.set_pipeline(pipeline);
            }
            for (group, bind_group) in &program.bind_groups {
                rpass.set_bind_group(*group, bind_group, &[]);
            }
            for (slot, (buffer, offset)) in bound.iter().enumerate() {
                rpass.set_vertex_buffer(slot as u32, self.buffers[*buffer].slice(*offset..));
            }

            rpass.draw(vertices, 0..1);
        }

        self.gpu.submit(frame);
        log::debug!("drew {count} vertices ({topology:?}) from {first}");
    }
}
