use std::cell::Cell;

use chroma_engine::backend::{
    AttributeLayout, BufferHandle, BufferUsage, ClearColor, ProgramHandle, RenderBackend,
    StageHandle, StageKind, Topology, UniformLocation, ViewportRect,
};
use chroma_engine::core::{launch, LaunchError, PendingLaunch};
use chroma_engine::scene::quad::{QUAD_COLORS, QUAD_POSITIONS};
use chroma_engine::scene::QuadScene;
use chroma_engine::shader::reflect::{parse_stage, ProgramInterface, StageReflection};
use chroma_engine::shader::{build_program, ProgramError};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Compile(StageKind),
    Link,
    CreateBuffer(Vec<f32>, BufferUsage),
    Viewport(ViewportRect),
    Clear(ClearColor),
    UseProgram(ProgramHandle),
    Enable(u32),
    Pointer(u32, BufferHandle, AttributeLayout),
    Uniform(UniformLocation, [f32; 2]),
    Draw(Topology, u32, u32),
}

/// Records every command; compiles and links through the naga front-end.
#[derive(Default)]
struct RecordingBackend {
    size: (u32, u32),
    fail_compile: Option<StageKind>,
    fail_link: bool,
    calls: Vec<Call>,
    stages: Vec<StageReflection>,
    programs: Vec<ProgramInterface>,
    buffers: u32,
}

impl RecordingBackend {
    fn with_size(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Self::default()
        }
    }

    fn draws(&self) -> Vec<&Call> {
        self.calls.iter().filter(|c| matches!(c, Call::Draw(..))).collect()
    }

    fn buffers_created(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::CreateBuffer(..)))
            .count()
    }

    fn position_of(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls
            .iter()
            .position(pred)
            .unwrap_or_else(|| panic!("call not recorded: {:?}", self.calls))
    }
}

impl RenderBackend for RecordingBackend {
    fn compile_stage(&mut self, kind: StageKind, source: &str) -> Result<StageHandle, String> {
        self.calls.push(Call::Compile(kind));
        if self.fail_compile == Some(kind) {
            return Err("0:1: injected failure".to_string());
        }
        let reflection = parse_stage(kind, source)?;
        self.stages.push(reflection);
        Ok(StageHandle(self.stages.len() as u32 - 1))
    }

    fn link_program(
        &mut self,
        vertex: StageHandle,
        fragment: StageHandle,
    ) -> Result<ProgramHandle, String> {
        self.calls.push(Call::Link);
        if self.fail_link {
            return Err("varying mismatch".to_string());
        }
        let vs = &self.stages[vertex.0 as usize];
        let fs = &self.stages[fragment.0 as usize];
        let interface = ProgramInterface::link(vs, fs)?;
        self.programs.push(interface);
        Ok(ProgramHandle(self.programs.len() as u32 - 1))
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.programs.get(program.0 as usize)?.attribute_location(name)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.programs.get(program.0 as usize)?.uniform_location(name)
    }

    fn create_buffer(&mut self, data: &[f32], usage: BufferUsage) -> BufferHandle {
        self.calls.push(Call::CreateBuffer(data.to_vec(), usage));
        self.buffers += 1;
        BufferHandle(self.buffers - 1)
    }

    fn backing_size(&self) -> (u32, u32) {
        self.size
    }

    fn set_viewport(&mut self, viewport: ViewportRect) {
        self.calls.push(Call::Viewport(viewport));
    }

    fn clear(&mut self, color: ClearColor) {
        self.calls.push(Call::Clear(color));
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::UseProgram(program));
    }

    fn enable_attribute(&mut self, location: u32) {
        self.calls.push(Call::Enable(location));
    }

    fn attribute_pointer(&mut self, location: u32, buffer: BufferHandle, layout: AttributeLayout) {
        self.calls.push(Call::Pointer(location, buffer, layout));
    }

    fn set_uniform_vec2(&mut self, location: UniformLocation, value: [f32; 2]) {
        self.calls.push(Call::Uniform(location, value));
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) {
        self.calls.push(Call::Draw(topology, first, count));
    }
}

#[test]
fn setup_draws_the_quad_once() {
    let mut backend = RecordingBackend::with_size(190, 320);
    let scene = QuadScene::setup(&mut backend).expect("setup");

    assert_eq!(scene.resolution, (190, 320));
    assert_eq!(backend.draws(), vec![&Call::Draw(Topology::TriangleList, 0, 6)]);

    let uniforms: Vec<_> = backend
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Uniform(_, v) => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(uniforms, vec![[190.0, 320.0]]);

    assert!(backend.calls.contains(&Call::Viewport(ViewportRect {
        x: 0,
        y: 0,
        width: 190,
        height: 320,
    })));
    assert!(backend.calls.contains(&Call::Clear(ClearColor::transparent())));
}

#[test]
fn setup_uploads_literal_buffers() {
    let mut backend = RecordingBackend::with_size(640, 480);
    let scene = QuadScene::setup(&mut backend).expect("setup");

    let uploads: Vec<_> = backend
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::CreateBuffer(data, usage) => Some((data.clone(), *usage)),
            _ => None,
        })
        .collect();
    assert_eq!(
        uploads,
        vec![
            (QUAD_POSITIONS.to_vec(), BufferUsage::StaticDraw),
            (QUAD_COLORS.to_vec(), BufferUsage::StaticDraw),
        ]
    );
    assert_ne!(scene.position_buffer, scene.color_buffer);
}

#[test]
fn attributes_are_wired_to_their_buffers() {
    let mut backend = RecordingBackend::with_size(640, 480);
    let scene = QuadScene::setup(&mut backend).expect("setup");

    let position = scene.locations.position.expect("a_position");
    let color = scene.locations.color.expect("a_color");
    assert_eq!((position, color), (0, 1));

    assert!(backend.calls.contains(&Call::Pointer(
        color,
        scene.color_buffer,
        AttributeLayout::packed_f32(4),
    )));
    assert!(backend.calls.contains(&Call::Pointer(
        position,
        scene.position_buffer,
        AttributeLayout::packed_f32(2),
    )));
}

#[test]
fn setup_follows_command_order() {
    let mut backend = RecordingBackend::with_size(300, 150);
    let scene = QuadScene::setup(&mut backend).expect("setup");

    let link = backend.position_of(|c| *c == Call::Link);
    let first_buffer = backend.position_of(|c| matches!(c, Call::CreateBuffer(..)));
    let viewport = backend.position_of(|c| matches!(c, Call::Viewport(_)));
    let clear = backend.position_of(|c| matches!(c, Call::Clear(_)));
    let use_program = backend.position_of(|c| *c == Call::UseProgram(scene.program));
    let color_pointer = backend.position_of(|c| {
        matches!(c, Call::Pointer(_, buf, _) if *buf == scene.color_buffer)
    });
    let position_pointer = backend.position_of(|c| {
        matches!(c, Call::Pointer(_, buf, _) if *buf == scene.position_buffer)
    });
    let uniform = backend.position_of(|c| matches!(c, Call::Uniform(..)));
    let draw = backend.position_of(|c| matches!(c, Call::Draw(..)));

    assert!(link < first_buffer);
    assert!(first_buffer < viewport);
    assert!(viewport < clear);
    assert!(clear < use_program);
    assert!(use_program < color_pointer);
    assert!(color_pointer < position_pointer);
    assert!(position_pointer < uniform);
    assert!(uniform < draw);
    assert_eq!(draw, backend.calls.len() - 1);
}

#[test]
fn compile_failure_stops_before_any_buffer() {
    let mut backend = RecordingBackend {
        fail_compile: Some(StageKind::Fragment),
        ..RecordingBackend::with_size(190, 320)
    };

    let err = QuadScene::setup(&mut backend).unwrap_err();
    match err {
        ProgramError::Compile(e) => {
            assert_eq!(e.stage, StageKind::Fragment);
            assert!(e.log.contains("injected"));
        }
        other => panic!("expected compile error, got {other:?}"),
    }

    assert_eq!(backend.buffers_created(), 0);
    assert!(backend.draws().is_empty());
    assert!(!backend.calls.contains(&Call::Link));
}

#[test]
fn link_failure_stops_before_any_buffer() {
    let mut backend = RecordingBackend {
        fail_link: true,
        ..RecordingBackend::with_size(190, 320)
    };

    let err = QuadScene::setup(&mut backend).unwrap_err();
    assert!(matches!(err, ProgramError::Link(_)));
    assert!(err.to_string().contains("varying mismatch"));
    assert_eq!(backend.buffers_created(), 0);
    assert!(backend.draws().is_empty());
}

#[test]
fn malformed_source_reports_the_front_end_log() {
    let mut backend = RecordingBackend::default();
    let err = build_program(
        &mut backend,
        "#version 450\nvoid main() { gl_Position = vec4(0.0) }\n",
        chroma_engine::shader::source::FRAGMENT_SHADER_2D,
    )
    .unwrap_err();

    match err {
        ProgramError::Compile(e) => {
            assert_eq!(e.stage, StageKind::Vertex);
            assert!(!e.log.is_empty());
        }
        other => panic!("expected compile error, got {other:?}"),
    }
}

#[test]
fn launch_without_context_touches_nothing() {
    let acquired = Cell::new(0);
    let result = launch::<RecordingBackend, _>(|| {
        acquired.set(acquired.get() + 1);
        Err(anyhow::anyhow!("no adapter"))
    });

    assert_eq!(acquired.get(), 1);
    match result {
        Err(LaunchError::ContextUnavailable(e)) => assert!(e.to_string().contains("no adapter")),
        Err(other) => panic!("expected missing context, got {other:?}"),
        Ok(_) => panic!("launch succeeded without a context"),
    }
}

#[test]
fn launch_runs_setup_on_the_acquired_backend() {
    let launched = launch(|| Ok(RecordingBackend::with_size(190, 320))).expect("launch");

    assert_eq!(launched.scene.resolution, (190, 320));
    assert_eq!(launched.backend.draws().len(), 1);
}

#[test]
fn launch_surfaces_program_errors() {
    let result = launch(|| {
        Ok(RecordingBackend {
            fail_link: true,
            ..RecordingBackend::default()
        })
    });

    assert!(matches!(result, Err(LaunchError::Program(ProgramError::Link(_)))));
}

#[test]
fn acquired_backend_stays_untouched_until_the_first_frame() {
    let pending = PendingLaunch::acquire(|| Ok(RecordingBackend::with_size(190, 320)))
        .expect("acquire");

    assert!(pending.backend().calls.is_empty());
    assert!(pending.scene().is_none());
}

#[test]
fn first_frame_draws_exactly_once() {
    let mut pending = PendingLaunch::acquire(|| Ok(RecordingBackend::with_size(190, 320)))
        .expect("acquire");

    assert!(pending.draw_first_frame().expect("first frame"));
    assert!(!pending.draw_first_frame().expect("second frame"));
    assert!(!pending.draw_first_frame().expect("third frame"));

    assert_eq!(pending.backend().draws().len(), 1);
    assert_eq!(pending.backend().buffers_created(), 2);
    assert_eq!(pending.scene().map(|s| s.resolution), Some((190, 320)));
}

#[test]
fn first_frame_reports_setup_failure() {
    let mut pending = PendingLaunch::acquire(|| {
        Ok(RecordingBackend {
            fail_compile: Some(StageKind::Vertex),
            ..RecordingBackend::default()
        })
    })
    .expect("acquire");

    let err = pending.draw_first_frame().unwrap_err();
    assert!(matches!(err, LaunchError::Program(ProgramError::Compile(_))));
    assert!(pending.scene().is_none());
    assert!(pending.backend().draws().is_empty());
}

#[test]
fn pending_acquire_failure_is_context_unavailable() {
    let result = PendingLaunch::<RecordingBackend>::acquire(|| Err(anyhow::anyhow!("no surface")));
    assert!(matches!(result, Err(LaunchError::ContextUnavailable(_))));
}
