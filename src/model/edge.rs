use super::vertex::VertexKey;

slotmap::new_key_type! {
    /// Handle of an edge inside a [`Model`](super::Model).
    pub struct EdgeKey;
}

/// A straight segment between two vertices.
///
/// The edge only refers to its endpoints; the model owns the vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Persistent identity, stable across serialization.
    pub id: String,
    /// First endpoint.
    pub a: VertexKey,
    /// Second endpoint.
    pub b: VertexKey,
    /// Transient: the pointer is over this edge.
    pub hovered: bool,
    /// Transient: the edge is in the selection.
    pub selected: bool,
}

impl Edge {
    /// Creates an edge with a fresh id.
    #[must_use]
    pub fn new(a: VertexKey, b: VertexKey) -> Self {
        Self::with_id(super::fresh_id(), a, b)
    }

    /// Creates an edge with an explicit id.
    #[must_use]
    pub fn with_id(id: impl Into<String>, a: VertexKey, b: VertexKey) -> Self {
        Self {
            id: id.into(),
            a,
            b,
            hovered: false,
            selected: false,
        }
    }

    /// Returns `true` if either endpoint is `vertex`.
    #[must_use]
    pub fn touches(&self, vertex: VertexKey) -> bool {
        self.a == vertex || self.b == vertex
    }

    /// Returns `true` if both endpoints are the same vertex.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }
}
