//! Shader program builder.
//!
//! Building a program is two-phase:
//! 1. CPU: each WGSL stage is parsed and validated with naga ([`compile_stage`]),
//!    then the pair is checked against each other and against the mesh's
//!    vertex attributes ([`link`]). All failures surface here, before any GPU
//!    object exists.
//! 2. GPU: [`ShaderProgram::build`] creates the pipeline, one uniform buffer
//!    per reflected uniform, and the bind groups.
//!
//! Uniforms are addressed by their WGSL variable name.

mod compile;
mod error;
mod link;
mod program;
mod stage;

pub use compile::{compile_stage, CompiledStage};
pub use error::ShaderError;
pub use link::{link, AttributeKind, ProgramInterface, UniformSlot, VertexAttribute};
pub use program::{check_program, vec3_uniform_bytes, ShaderProgram};
pub use stage::ShaderStage;
