//! OpenGL driver seam.
//!
//! `GlBackend` is the narrow set of driver calls the shader layer consumes.
//! `Gl` wraps a backend together with the "current program" slot, so code that
//! depends on which program is active reads it from an explicit value instead
//! of ambient driver state.
//!
//! Threading: a GL context is bound to the thread that made it current. `Gl`
//! is shared through `Rc`, which keeps every handle derived from it on that
//! thread.

mod backend;
mod context;
mod glow_backend;

#[cfg(test)]
pub(crate) mod soft;

pub use backend::{GlBackend, Stage};
pub use context::{Gl, GlError};
