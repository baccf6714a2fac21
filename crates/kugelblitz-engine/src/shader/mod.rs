//! Shader programs.
//!
//! A [`ShaderProgram`] is built once from a [`ShaderSource`], activated every
//! frame, and released when dropped. Compile and link failures are logged with
//! their stage tag and returned as [`ShaderError`], so a caller can refuse to
//! render with a program that does not exist.

mod error;
mod program;
mod source;

pub use error::{ShaderError, UnknownPreset};
pub use program::{ActiveProgram, INFO_LOG_CAPACITY, PROGRAM_TAG, ShaderProgram};
pub use source::{Preset, ShaderSource};

pub use crate::gl::Stage;
