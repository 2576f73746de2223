use crate::math::Point3;

slotmap::new_key_type! {
    /// Handle of a vertex inside a [`Model`](super::Model).
    pub struct VertexKey;
}

/// A point in model space.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Persistent identity, stable across serialization.
    pub id: String,
    /// The 3D position of the vertex.
    pub position: Point3,
    /// Cosmetic flag; hidden vertices are neither drawn nor picked.
    pub hidden: bool,
    /// Transient: the pointer is over this vertex.
    pub hovered: bool,
    /// Transient: the vertex is in the selection.
    pub selected: bool,
}

impl Vertex {
    /// Creates a visible vertex with a fresh id.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self::with_id(super::fresh_id(), position, false)
    }

    /// Creates a vertex with an explicit id.
    #[must_use]
    pub fn with_id(id: impl Into<String>, position: Point3, hidden: bool) -> Self {
        Self {
            id: id.into(),
            position,
            hidden,
            hovered: false,
            selected: false,
        }
    }
}
