use std::rc::Rc;

use super::error::ShaderError;
use super::source::ShaderSource;
use crate::gl::{Gl, GlBackend, Stage};

/// Upper bound on driver info logs, including the C terminator the driver writes.
pub const INFO_LOG_CAPACITY: usize = 1024;

/// Diagnostic tag for link-stage messages.
pub const PROGRAM_TAG: &str = "PROGRAM";

/// A linked GPU program.
///
/// Invariant: a value of this type always holds a handle that compiled and
/// linked successfully. The handle is deleted exactly once, on drop.
///
/// Must only be used on the thread that owns the GL context; `Rc<Gl>` keeps
/// the type `!Send`.
pub struct ShaderProgram<B: GlBackend = glow::Context> {
    gl: Rc<Gl<B>>,
    handle: B::Program,
}

impl<B: GlBackend> ShaderProgram<B> {
    /// Compiles both stages and links them.
    ///
    /// Both stages are always compiled and linking is always attempted, so every
    /// diagnostic the driver produces is logged. The returned error is the first
    /// stage failure (vertex before fragment), otherwise the link failure.
    /// Intermediate stage objects are deleted on every path.
    pub fn new(gl: &Rc<Gl<B>>, source: &ShaderSource, verbose: bool) -> Result<Self, ShaderError> {
        let api = gl.api();

        let mut vertex = CompiledStage::compile(api, source, Stage::Vertex, verbose)?;
        let mut fragment = CompiledStage::compile(api, source, Stage::Fragment, verbose)?;

        let handle = api.create_program().map_err(|reason| ShaderError::CreateFailed {
            object: "program",
            reason,
        })?;

        // From here on, dropping `program` deletes the handle.
        let program = Self {
            gl: Rc::clone(gl),
            handle,
        };

        api.attach_shader(handle, vertex.shader);
        api.attach_shader(handle, fragment.shader);
        api.link_program(handle);

        let linked = if api.program_link_status(handle) {
            if verbose {
                log::info!("shader program linking succeeded");
            } else {
                log::debug!("shader program {handle:?} linked");
            }
            Ok(())
        } else {
            let log = bounded_log(api.program_info_log(handle));
            log::error!("shader program linking failed: {PROGRAM_TAG}\n{log}");
            Err(ShaderError::ProgramLinkFailed { log })
        };

        if let Some(err) = vertex.failure.take().or_else(|| fragment.failure.take()) {
            return Err(err);
        }
        linked?;

        Ok(program)
    }

    pub fn handle(&self) -> B::Program {
        self.handle
    }

    pub fn is_current(&self) -> bool {
        self.gl.current_program() == Some(self.handle)
    }

    /// Makes this the context's current program.
    ///
    /// The returned guard writes uniforms into this program for as long as it
    /// stays current. Any later activation of another program turns writes
    /// through this guard into no-ops.
    pub fn activate(&self) -> ActiveProgram<'_, B> {
        self.gl.use_program(Some(self.handle));
        ActiveProgram { program: self }
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_int(name, i32::from(value));
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.write_uniform(name, |api, location| api.uniform_1_i32(location, value));
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.write_uniform(name, |api, location| api.uniform_1_f32(location, value));
    }

    /// Resolves `name` on every call and hands the location to `write`.
    ///
    /// Unknown names resolve to `None`, which the driver ignores. Writes while
    /// another program is current are dropped here so they cannot land in it.
    fn write_uniform<F>(&self, name: &str, write: F)
    where
        F: FnOnce(&B, Option<&B::UniformLocation>),
    {
        if !self.is_current() {
            log::debug!("uniform `{name}` dropped: program {:?} is not current", self.handle);
            return;
        }

        let api = self.gl.api();
        let location = api.uniform_location(self.handle, name);
        if location.is_none() {
            log::trace!("uniform `{name}` not found in program {:?}", self.handle);
        }
        write(api, location.as_ref());
    }

    /// Deletes the program now. Equivalent to dropping it.
    pub fn release(self) {
        drop(self);
    }
}

impl<B: GlBackend> Drop for ShaderProgram<B> {
    fn drop(&mut self) {
        if self.is_current() {
            self.gl.use_program(None);
        }
        self.gl.api().delete_program(self.handle);
        log::debug!("shader program {:?} released", self.handle);
    }
}

/// A program that was made current by [`ShaderProgram::activate`].
pub struct ActiveProgram<'p, B: GlBackend = glow::Context> {
    program: &'p ShaderProgram<B>,
}

impl<'p, B: GlBackend> ActiveProgram<'p, B> {
    /// False once another program has been activated on the context.
    pub fn is_current(&self) -> bool {
        self.program.is_current()
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.program.set_bool(name, value);
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.program.set_int(name, value);
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.program.set_float(name, value);
    }
}

/// A compiled (or failed) stage object, deleted on drop.
struct CompiledStage<'a, B: GlBackend> {
    api: &'a B,
    shader: B::Shader,
    failure: Option<ShaderError>,
}

impl<'a, B: GlBackend> CompiledStage<'a, B> {
    fn compile(
        api: &'a B,
        source: &ShaderSource,
        stage: Stage,
        verbose: bool,
    ) -> Result<Self, ShaderError> {
        let shader = api.create_shader(stage).map_err(|reason| ShaderError::CreateFailed {
            object: stage_object(stage),
            reason,
        })?;

        api.shader_source(shader, source.stage(stage));
        api.compile_shader(shader);

        let failure = if api.shader_compile_status(shader) {
            if verbose {
                log::info!("shader compilation succeeded: {stage}");
            } else {
                log::debug!("shader compilation succeeded: {stage}");
            }
            None
        } else {
            let log = bounded_log(api.shader_info_log(shader));
            log::error!("shader compilation failed: {stage}\n{log}");
            Some(ShaderError::StageCompileFailed { stage, log })
        };

        Ok(Self {
            api,
            shader,
            failure,
        })
    }
}

impl<B: GlBackend> Drop for CompiledStage<'_, B> {
    fn drop(&mut self) {
        // A stage still attached to a program is only flagged; the driver frees it
        // together with the program.
        self.api.delete_shader(self.shader);
    }
}

fn stage_object(stage: Stage) -> &'static str {
    match stage {
        Stage::Vertex => "vertex shader",
        Stage::Fragment => "fragment shader",
    }
}

/// Clips a driver log to what a fixed `INFO_LOG_CAPACITY` buffer would hold.
fn bounded_log(raw: String) -> String {
    let mut end = raw.len().min(INFO_LOG_CAPACITY - 1);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end]
        .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}
