use thiserror::Error;

use crate::gl::Stage;

/// Failure while building a shader program.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShaderError {
    /// The driver refused to allocate a shader or program object.
    #[error("failed to create {object} object: {reason}")]
    CreateFailed {
        object: &'static str,
        reason: String,
    },

    #[error("{stage} shader compilation failed:\n{log}")]
    StageCompileFailed { stage: Stage, log: String },

    #[error("PROGRAM linking failed:\n{log}")]
    ProgramLinkFailed { log: String },
}

/// A preset name that does not match any built-in shader variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown shader preset `{0}` (expected `solid` or `color`)")]
pub struct UnknownPreset(pub String);
