use super::vertex::VertexKey;

slotmap::new_key_type! {
    /// Handle of a surface inside a [`Model`](super::Model).
    pub struct SurfaceKey;
}

/// A polygon bounded by a closed loop of vertices.
///
/// Only the distinct vertices are stored, in winding order. The loop closes
/// implicitly from the last vertex back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Persistent identity, stable across serialization.
    pub id: String,
    /// Boundary vertices in winding order.
    pub vertices: Vec<VertexKey>,
    /// Transient: the pointer is over this surface.
    pub hovered: bool,
    /// Transient: the surface is in the selection.
    pub selected: bool,
}

impl Surface {
    /// Creates a surface with a fresh id.
    #[must_use]
    pub fn new(vertices: Vec<VertexKey>) -> Self {
        Self::with_id(super::fresh_id(), vertices)
    }

    /// Creates a surface with an explicit id.
    #[must_use]
    pub fn with_id(id: impl Into<String>, vertices: Vec<VertexKey>) -> Self {
        Self {
            id: id.into(),
            vertices,
            hovered: false,
            selected: false,
        }
    }

    /// Returns `true` if `vertex` is part of the boundary.
    #[must_use]
    pub fn contains(&self, vertex: VertexKey) -> bool {
        self.vertices.contains(&vertex)
    }

    /// A committed surface needs at least three vertices, none repeated.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        if self.vertices.len() < 3 {
            return true;
        }
        self.vertices
            .iter()
            .enumerate()
            .any(|(i, v)| self.vertices[i + 1..].contains(v))
    }
}
