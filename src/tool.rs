use std::fmt;

/// Active interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Select,
    CreateVertex,
    CreateEdge,
    CreateSurface,
    /// Camera navigation; leaves in-progress creation untouched.
    Pan,
}

impl Tool {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::CreateVertex => "create-vertex",
            Tool::CreateEdge => "create-edge",
            Tool::CreateSurface => "create-surface",
            Tool::Pan => "pan",
        }
    }

    /// Vertices can be hovered.
    #[must_use]
    pub fn picks_vertices(self) -> bool {
        matches!(self, Tool::Select | Tool::CreateEdge | Tool::CreateSurface)
    }

    /// Edges and surfaces can be hovered.
    #[must_use]
    pub fn picks_edges_and_surfaces(self) -> bool {
        self == Tool::Select
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
