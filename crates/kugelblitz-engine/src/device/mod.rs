//! Window + OpenGL context management.
//!
//! This module is responsible for:
//! - creating the window together with a compatible GL display config
//! - creating the context and window surface and making them current
//! - loading GL entry points into a shared [`Gl`](crate::gl::Gl) handle
//! - resizing the surface/viewport and presenting frames

mod gl_device;
mod init;

pub use gl_device::GlDevice;
pub use init::DeviceInit;
