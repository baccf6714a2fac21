use std::str::FromStr;

use super::error::UnknownPreset;
use crate::gl::Stage;

/// Vertex and fragment source text for one program.
///
/// The text is owned and immutable once constructed; variants of a program
/// differ only by the source passed in here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    vertex: String,
    fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn stage(&self, stage: Stage) -> &str {
        match stage {
            Stage::Vertex => &self.vertex,
            Stage::Fragment => &self.fragment,
        }
    }
}

const SOLID_VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
void main()
{
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
";

const SOLID_FRAGMENT: &str = "#version 330 core
out vec4 FragColor;
void main()
{
    FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);
}
";

const VERTEX_COLOR_VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aColor;
out vec3 ourColor;
void main()
{
    gl_Position = vec4(aPos, 1.0);
    ourColor = aColor;
}
";

const VERTEX_COLOR_FRAGMENT: &str = "#version 330 core
out vec4 FragColor;
in vec3 ourColor;
void main()
{
    FragColor = vec4(ourColor, 1.0);
}
";

/// Built-in shader variants.
///
/// - `Solid`: position only (location 0), constant orange fill.
/// - `VertexColor`: position (location 0) and color (location 1), color interpolated.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Preset {
    Solid,
    #[default]
    VertexColor,
}

impl Preset {
    pub fn name(self) -> &'static str {
        match self {
            Preset::Solid => "solid",
            Preset::VertexColor => "color",
        }
    }

    pub fn source(self) -> ShaderSource {
        match self {
            Preset::Solid => ShaderSource::new(SOLID_VERTEX, SOLID_FRAGMENT),
            Preset::VertexColor => ShaderSource::new(VERTEX_COLOR_VERTEX, VERTEX_COLOR_FRAGMENT),
        }
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" => Ok(Preset::Solid),
            "color" | "colour" | "vertex-color" => Ok(Preset::VertexColor),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}
