use std::rc::Rc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{DeviceInit, GlDevice};
use crate::gl::Gl;
use crate::render::Color;
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub clear_color: Color,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Kugelblitz Engine".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            clear_color: Color::SLATE,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs the event loop until the window closes.
    ///
    /// `factory` is called once, on the event-loop thread, after the GL context
    /// is current. If it fails, no frame is rendered and the error is returned.
    pub fn run<A, F>(config: RuntimeConfig, device_init: DeviceInit, factory: F) -> Result<()>
    where
        A: App + 'static,
        F: FnOnce(&Rc<Gl>) -> Result<A> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, device_init, factory);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Everything tied to the live window. Field order is drop order.
struct WindowEntry<A> {
    app: A,
    device: GlDevice,
    clock: FrameClock,
    window: Window,
}

impl<A: App> WindowEntry<A> {
    fn render_frame(&mut self, clear_color: Color) -> Result<AppControl> {
        let time = self.clock.tick();

        let control = {
            let mut ctx = FrameCtx::new(self.device.gl(), time, self.device.size(), clear_color);
            self.app.on_frame(&mut ctx)
        };

        self.window.pre_present_notify();
        self.device.swap_buffers()?;

        Ok(control)
    }
}

struct AppState<A, F> {
    config: RuntimeConfig,
    device_init: DeviceInit,
    factory: Option<F>,

    entry: Option<WindowEntry<A>>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A, F> AppState<A, F>
where
    A: App + 'static,
    F: FnOnce(&Rc<Gl>) -> Result<A> + 'static,
{
    fn new(config: RuntimeConfig, device_init: DeviceInit, factory: F) -> Self {
        Self {
            config,
            device_init,
            factory: Some(factory),
            entry: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.request_exit(event_loop);
    }

    fn create_entry(&mut self, event_loop: &ActiveEventLoop, factory: F) -> Result<WindowEntry<A>> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let (window, device) = GlDevice::new(event_loop, attrs, &self.device_init)?;
        let app = factory(device.gl()).context("application setup failed")?;

        Ok(WindowEntry {
            app,
            device,
            clock: FrameClock::default(),
            window,
        })
    }
}

impl<A, F> ApplicationHandler for AppState<A, F>
where
    A: App + 'static,
    F: FnOnce(&Rc<Gl>) -> Result<A> + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }
        let Some(factory) = self.factory.take() else {
            return;
        };

        match self.create_entry(event_loop, factory) {
            Ok(entry) => {
                entry.window.request_redraw();
                self.entry = Some(entry);
            }
            Err(e) => self.fail(event_loop, e.context("startup failed")),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(entry) = &self.entry {
            entry.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let clear_color = self.config.clear_color;
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if entry.window.id() != window_id {
            return;
        }

        if entry.app.on_window_event(&event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        let outcome = match &event {
            WindowEvent::CloseRequested => Ok(AppControl::Exit),
            WindowEvent::KeyboardInput { event: key, .. } if is_escape_press(key) => {
                Ok(AppControl::Exit)
            }
            WindowEvent::Resized(new_size) => {
                entry.device.resize(*new_size);
                entry.window.request_redraw();
                Ok(AppControl::Continue)
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.window.inner_size();
                entry.device.resize(new_size);
                Ok(AppControl::Continue)
            }
            WindowEvent::RedrawRequested => entry.render_frame(clear_color),
            _ => Ok(AppControl::Continue),
        };

        match outcome {
            Ok(AppControl::Continue) => {}
            Ok(AppControl::Exit) => self.request_exit(event_loop),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Drop GL objects while the context still exists.
        if self.entry.take().is_some() {
            log::info!("window closed, GL resources released");
        }
    }
}

fn is_escape_press(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
}
