//! Geometry upload and draw submission.
//!
//! Vertex data is tightly packed interleaved `f32`. Attribute locations match
//! the `layout (location = N)` qualifiers of the shader presets.

mod color;
mod layout;
mod mesh;

pub use color::Color;
pub use layout::{VertexAttribute, VertexLayout};
pub use mesh::{Mesh, MeshError, TRIANGLE_COLORED, TRIANGLE_POSITIONS};
