use std::mem::size_of;

/// One `f32` vector attribute of a vertex.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components (1..=4).
    pub components: u8,
}

impl VertexAttribute {
    pub const POSITION: VertexAttribute = VertexAttribute {
        location: 0,
        components: 3,
    };
    pub const COLOR: VertexAttribute = VertexAttribute {
        location: 1,
        components: 3,
    };
}

/// Interleaved, tightly packed vertex format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout for the `solid` preset: position only.
    pub fn positions() -> Self {
        Self::new().with(VertexAttribute::POSITION)
    }

    /// Layout for the `color` preset: position followed by color.
    pub fn positions_colors() -> Self {
        Self::new()
            .with(VertexAttribute::POSITION)
            .with(VertexAttribute::COLOR)
    }

    pub fn with(mut self, attribute: VertexAttribute) -> Self {
        debug_assert!((1..=4).contains(&attribute.components));
        self.attributes.push(attribute);
        self
    }

    pub fn floats_per_vertex(&self) -> usize {
        self.attributes.iter().map(|a| usize::from(a.components)).sum()
    }

    /// Vertex size in bytes.
    pub fn stride(&self) -> usize {
        self.floats_per_vertex() * size_of::<f32>()
    }

    /// Attributes paired with their byte offset inside a vertex.
    pub fn attributes(&self) -> impl Iterator<Item = (VertexAttribute, usize)> + '_ {
        self.attributes.iter().scan(0usize, |offset, attr| {
            let at = *offset;
            *offset += usize::from(attr.components) * size_of::<f32>();
            Some((*attr, at))
        })
    }
}
