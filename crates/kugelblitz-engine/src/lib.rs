//! Kugelblitz engine crate.
//!
//! Window + OpenGL context bootstrap, shader programs, and the render loop.
//! Everything here runs on the thread that owns the GL context.

pub mod core;
pub mod device;
pub mod gl;
pub mod logging;
pub mod render;
pub mod shader;
pub mod time;
pub mod window;
