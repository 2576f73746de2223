use thiserror::Error;

/// Top-level error type for the quadview editing core.
#[derive(Debug, Error)]
pub enum QuadviewError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Interaction(#[from] InteractionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("malformed model document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors related to the model's entity graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("{entity} references unknown vertex `{vertex}`")]
    UnknownVertex { entity: String, vertex: String },

    #[error("duplicate entity id `{0}`")]
    DuplicateId(String),

    #[error("degenerate edge `{0}`: both endpoints are the same vertex")]
    DegenerateEdge(String),

    #[error("degenerate surface `{0}`: needs at least 3 distinct vertices")]
    DegenerateSurface(String),
}

/// Errors related to history navigation. All of them leave the stack untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("history index {index} is out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("history is empty")]
    Empty,
}

/// Errors raised by interaction logic before any mutation happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error("selection is empty")]
    EmptySelection,
}

/// Errors in editor configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Convenience type alias for results using [`QuadviewError`].
pub type Result<T> = std::result::Result<T, QuadviewError>;
