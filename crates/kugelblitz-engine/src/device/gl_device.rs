use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use glow::HasContext;
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use super::DeviceInit;
use crate::gl::Gl;

/// Owns the GL context, its window surface, and the loaded entry points.
///
/// Field order is drop order: the `Gl` handle goes before the surface and
/// context it was loaded from. The window returned by [`GlDevice::new`] must
/// outlive the device.
pub struct GlDevice {
    gl: Rc<Gl>,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl GlDevice {
    /// Creates the window and a current GL context for it.
    pub fn new(
        event_loop: &ActiveEventLoop,
        attributes: WindowAttributes,
        init: &DeviceInit,
    ) -> Result<(Window, Self)> {
        let template = ConfigTemplateBuilder::new().with_alpha_size(init.alpha_size);

        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, pick_config)
            .map_err(|e| anyhow!("failed to create window and GL display: {e}"))?;
        let window = window.context("GL display was created without a window")?;
        log::info!("window created");

        let raw_window = window
            .window_handle()
            .context("window has no native handle")?
            .as_raw();

        let display = config.display();
        let (major, minor) = init.gl_version;
        let profile = if init.core_profile {
            GlProfile::Core
        } else {
            GlProfile::Compatibility
        };
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(profile)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(raw_window));

        // SAFETY: `raw_window` belongs to `window`, which is returned to the
        // caller and outlives the context.
        let not_current = unsafe { display.create_context(&config, &context_attributes) }
            .with_context(|| format!("failed to create OpenGL {major}.{minor} context"))?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .context("failed to describe window surface")?;
        // SAFETY: same window handle as above.
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .context("failed to create window surface")?;

        let context = not_current
            .make_current(&surface)
            .context("failed to make GL context current")?;

        if init.vsync {
            let interval = SwapInterval::Wait(NonZeroU32::MIN);
            if let Err(e) = surface.set_swap_interval(&context, interval) {
                log::warn!("vsync unavailable: {e}");
            }
        }

        // SAFETY: the context is current on this thread, so the resolved entry
        // points belong to it.
        let api = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| display.get_proc_address(symbol))
        };
        // SAFETY: as above.
        let (version, renderer) = unsafe {
            (
                api.get_parameter_string(glow::VERSION),
                api.get_parameter_string(glow::RENDERER),
            )
        };
        log::info!("OpenGL loaded: {version} ({renderer})");

        let device = Self {
            gl: Rc::new(Gl::new(api)),
            surface,
            context,
            size: window.inner_size(),
        };
        device.apply_viewport();

        Ok((window, device))
    }

    pub fn gl(&self) -> &Rc<Gl> {
        &self.gl
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Resizes the surface and the viewport.
    ///
    /// A zero-sized (minimized) window only updates the recorded size; the
    /// surface keeps its last valid extent.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;

        let width = NonZeroU32::new(new_size.width);
        let height = NonZeroU32::new(new_size.height);
        let (Some(w), Some(h)) = (width, height) else {
            return;
        };

        self.surface.resize(&self.context, w, h);
        self.apply_viewport();
    }

    /// Presents the back buffer.
    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }

    fn apply_viewport(&self) {
        let Some((w, h)) = viewport_extent(self.size) else {
            return;
        };
        // SAFETY: `self.context` is current on this thread.
        unsafe { self.gl.api().viewport(0, 0, w, h) };
    }
}

/// Viewport extent for a drawable size, `None` while minimized.
fn viewport_extent(size: PhysicalSize<u32>) -> Option<(i32, i32)> {
    if size.width == 0 || size.height == 0 {
        return None;
    }
    let w = i32::try_from(size.width).unwrap_or(i32::MAX);
    let h = i32::try_from(size.height).unwrap_or(i32::MAX);
    Some((w, h))
}

/// Prefers the config with the most MSAA samples.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| {
            if config.num_samples() > best.num_samples() {
                config
            } else {
                best
            }
        })
        // glutin-winit only calls the picker with the configs the display matched.
        .expect("display offered no GL configs")
}
