use std::fmt::{self, Debug};

/// Pipeline stage a shader object is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    /// Tag used in diagnostics.
    pub const fn tag(self) -> &'static str {
        match self {
            Stage::Vertex => "VERTEX",
            Stage::Fragment => "FRAGMENT",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Driver calls needed to build and drive a shader program and the geometry
/// drawn with it.
///
/// Handles are opaque values minted by the driver. Implementations must only
/// be called on the thread that owns the current context.
pub trait GlBackend {
    type Shader: Copy + Eq + Debug;
    type Program: Copy + Eq + Debug;
    type UniformLocation: Debug;
    type Buffer: Copy + Eq + Debug;
    type VertexArray: Copy + Eq + Debug;

    fn create_shader(&self, stage: Stage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);

    /// Makes `program` current, or unbinds with `None`.
    fn use_program(&self, program: Option<Self::Program>);

    /// Returns `None` when the name is not an active uniform of `program`.
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;

    /// Writes into the current program. A `None` location is silently ignored.
    fn uniform_1_i32(&self, location: Option<&Self::UniformLocation>, value: i32);
    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, value: f32);

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vao: Self::VertexArray);

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    /// Fills the bound `ARRAY_BUFFER` with `STATIC_DRAW` usage.
    fn array_buffer_data(&self, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Points `location` of the bound vertex array at float data in the bound
    /// array buffer. `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer_f32(&self, location: u32, components: i32, stride: i32, offset: i32);
    fn enable_vertex_attrib_array(&self, location: u32);

    /// Draws `count` vertices of the bound vertex array as a triangle list.
    fn draw_triangles(&self, first: i32, count: i32);

    /// Pops one pending driver error code, if any.
    fn take_error(&self) -> Option<u32>;
}
