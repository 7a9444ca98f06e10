//! Shader sources, compilation and linking.
//!
//! `reflect` is the device-free GLSL front-end shared by all backends;
//! `program` holds the compile/link entry points and their error types.

mod program;

pub mod reflect;
pub mod source;

pub use program::{
    build_program, compile_shader_stage, link_program, ProgramError, ProgramLinkError,
    ShaderCompileError,
};
