use std::rc::Rc;

use glow::HasContext;
use winit::dpi::PhysicalSize;

use crate::gl::{Gl, GlError};
use crate::render::Color;
use crate::time::FrameTime;

/// Per-frame context passed to `core::App::on_frame`.
pub struct FrameCtx<'a> {
    pub gl: &'a Rc<Gl>,
    pub time: FrameTime,

    /// Drawable size in physical pixels.
    pub size: PhysicalSize<u32>,

    clear_color: Color,
}

impl<'a> FrameCtx<'a> {
    pub fn new(
        gl: &'a Rc<Gl>,
        time: FrameTime,
        size: PhysicalSize<u32>,
        clear_color: Color,
    ) -> Self {
        Self {
            gl,
            time,
            size,
            clear_color,
        }
    }

    /// Clears the color buffer with the configured clear color.
    pub fn clear(&self) {
        self.clear_with(self.clear_color);
    }

    /// Clears the color buffer; components are clamped to `0.0..=1.0` first.
    pub fn clear_with(&self, color: Color) {
        let color = color.clamped();
        let api = self.gl.api();
        // SAFETY: the runtime only builds a `FrameCtx` while the context is current.
        unsafe {
            api.clear_color(color.r, color.g, color.b, color.a);
            api.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    /// Drains driver errors raised since the last check.
    pub fn check_error(&self, operation: &str) -> Result<(), GlError> {
        self.gl.check_error(operation)
    }
}
