use thiserror::Error;

use super::ShaderStage;

/// Errors raised while building GPU programs.
///
/// All of these occur during setup. Once a program is linked, per-frame calls
/// do not fail; misuse is logged and ignored.
#[derive(Debug, Error)]
pub enum GfxError {
    /// Shader source failed to parse or validate.
    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },

    /// Vertex and fragment units could not be combined into a program.
    #[error("failed to link program: {0}")]
    Link(String),

    /// The vertex stage has no input with this name.
    #[error("vertex attribute `{0}` not found in program")]
    UnknownAttribute(String),

    /// A handle did not refer to a live object of the expected kind.
    #[error("invalid {0} handle")]
    InvalidHandle(&'static str),
}
