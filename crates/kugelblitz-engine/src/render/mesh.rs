use std::rc::Rc;

use thiserror::Error;

use super::layout::VertexLayout;
use crate::gl::{Gl, GlBackend};
use crate::shader::ActiveProgram;

/// One triangle, position only.
#[rustfmt::skip]
pub const TRIANGLE_POSITIONS: [f32; 9] = [
    -0.5, -0.5, 0.0,
     0.5, -0.5, 0.0,
     0.0,  0.5, 0.0,
];

/// One triangle, position then color per vertex.
#[rustfmt::skip]
pub const TRIANGLE_COLORED: [f32; 18] = [
    // position         // color
    -0.5, -0.5, 0.0,    1.0, 0.0, 0.0,
     0.5, -0.5, 0.0,    0.0, 1.0, 0.0,
     0.0,  0.5, 0.0,    0.0, 0.0, 1.0,
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("vertex layout has no attributes")]
    EmptyLayout,

    #[error("{len} floats is not a whole number of {per_vertex}-float vertices")]
    Misaligned { len: usize, per_vertex: usize },

    #[error("too many vertices for a single draw call: {0}")]
    TooManyVertices(usize),

    #[error("vertex stride of {0} bytes exceeds the driver limit")]
    StrideTooLarge(usize),

    #[error("failed to create {object}: {reason}")]
    CreateFailed {
        object: &'static str,
        reason: String,
    },
}

/// Vertex array + vertex buffer holding immutable geometry.
///
/// GL objects are deleted on drop; the mesh must be dropped while its context
/// is still current.
pub struct Mesh<B: GlBackend = glow::Context> {
    gl: Rc<Gl<B>>,
    vao: B::VertexArray,
    vbo: B::Buffer,
    vertex_count: i32,
}

impl<B: GlBackend> Mesh<B> {
    /// Uploads `vertices` with `STATIC_DRAW` and records the attribute setup in a VAO.
    pub fn new(gl: &Rc<Gl<B>>, vertices: &[f32], layout: &VertexLayout) -> Result<Self, MeshError> {
        let vertex_count = vertex_count(vertices.len(), layout)?;
        let stride =
            i32::try_from(layout.stride()).map_err(|_| MeshError::StrideTooLarge(layout.stride()))?;
        let api = gl.api();

        let vao = api.create_vertex_array().map_err(|reason| MeshError::CreateFailed {
            object: "vertex array",
            reason,
        })?;
        let vbo = match api.create_buffer() {
            Ok(vbo) => vbo,
            Err(reason) => {
                api.delete_vertex_array(vao);
                return Err(MeshError::CreateFailed {
                    object: "vertex buffer",
                    reason,
                });
            }
        };

        api.bind_vertex_array(Some(vao));
        api.bind_array_buffer(Some(vbo));
        api.array_buffer_data(bytemuck::cast_slice(vertices));

        for (attr, offset) in layout.attributes() {
            // Offsets are bounded by the stride, which fits in i32.
            api.vertex_attrib_pointer_f32(
                attr.location,
                i32::from(attr.components),
                stride,
                offset as i32,
            );
            api.enable_vertex_attrib_array(attr.location);
        }

        api.bind_array_buffer(None);
        api.bind_vertex_array(None);

        log::debug!("mesh uploaded: {vertex_count} vertices, stride {stride} bytes");

        Ok(Self {
            gl: Rc::clone(gl),
            vao,
            vbo,
            vertex_count,
        })
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    /// Draws the mesh as a triangle list with `program`.
    ///
    /// Taking the activation guard means only a successfully built program can
    /// be drawn with. A guard whose program is no longer current draws nothing.
    pub fn draw(&self, program: &ActiveProgram<'_, B>) {
        if !program.is_current() {
            log::debug!("mesh draw skipped: program is no longer current");
            return;
        }

        let api = self.gl.api();
        api.bind_vertex_array(Some(self.vao));
        api.draw_triangles(0, self.vertex_count);
        api.bind_vertex_array(None);
    }
}

impl<B: GlBackend> Drop for Mesh<B> {
    fn drop(&mut self) {
        let api = self.gl.api();
        api.delete_buffer(self.vbo);
        api.delete_vertex_array(self.vao);
    }
}

fn vertex_count(len: usize, layout: &VertexLayout) -> Result<i32, MeshError> {
    let per_vertex = layout.floats_per_vertex();
    if per_vertex == 0 {
        return Err(MeshError::EmptyLayout);
    }
    if len % per_vertex != 0 {
        return Err(MeshError::Misaligned { len, per_vertex });
    }
    let count = len / per_vertex;
    i32::try_from(count).map_err(|_| MeshError::TooManyVertices(count))
}
