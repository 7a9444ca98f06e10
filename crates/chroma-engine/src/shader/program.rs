use thiserror::Error;

use crate::backend::{ProgramHandle, RenderBackend, StageHandle, StageKind};

/// A stage failed to compile. `log` is the backend diagnostic.
#[derive(Debug, Clone, Error)]
#[error("could not compile {stage} shader: {log}")]
pub struct ShaderCompileError {
    pub stage: StageKind,
    pub log: String,
}

/// Two stages failed to link. `log` is the backend diagnostic.
#[derive(Debug, Clone, Error)]
#[error("program failed to link: {log}")]
pub struct ProgramLinkError {
    pub log: String,
}

/// Any failure while building a program from sources.
#[derive(Debug, Clone, Error)]
pub enum ProgramError {
    #[error(transparent)]
    Compile(#[from] ShaderCompileError),
    #[error(transparent)]
    Link(#[from] ProgramLinkError),
}

/// Compiles `source` as a `kind` stage on `backend`.
pub fn compile_shader_stage<B: RenderBackend + ?Sized>(
    backend: &mut B,
    source: &str,
    kind: StageKind,
) -> Result<StageHandle, ShaderCompileError> {
    match backend.compile_stage(kind, source) {
        Ok(stage) => {
            log::debug!("compiled {kind} stage {stage:?}");
            Ok(stage)
        }
        Err(log) => {
            log::error!("{kind} stage failed to compile:\n{log}");
            Err(ShaderCompileError { stage: kind, log })
        }
    }
}

/// Links a compiled vertex stage and fragment stage into a program.
pub fn link_program<B: RenderBackend + ?Sized>(
    backend: &mut B,
    vertex: StageHandle,
    fragment: StageHandle,
) -> Result<ProgramHandle, ProgramLinkError> {
    match backend.link_program(vertex, fragment) {
        Ok(program) => {
            log::debug!("linked program {program:?} from {vertex:?} + {fragment:?}");
            Ok(program)
        }
        Err(log) => {
            log::error!("program failed to link:\n{log}");
            Err(ProgramLinkError { log })
        }
    }
}

/// Compiles both sources and links them.
pub fn build_program<B: RenderBackend + ?Sized>(
    backend: &mut B,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<ProgramHandle, ProgramError> {
    let vertex = compile_shader_stage(backend, vertex_source, StageKind::Vertex)?;
    let fragment = compile_shader_stage(backend, fragment_source, StageKind::Fragment)?;
    Ok(link_program(backend, vertex, fragment)?)
}
