use thiserror::Error;

/// Errors that can occur in lattix-link.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied argument is outside its accepted set.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Array lengths or dimensions do not line up.
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Where the mismatch was detected.
        context: &'static str,
        /// Expected shape or length.
        expected: String,
        /// Observed shape or length.
        actual: String,
    },
    /// ndarray rejected a reshape or dimensionality conversion.
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    /// Homogeneous data where heterogeneous was expected (or vice versa),
    /// or a missing edge-type key.
    #[error("Layout mismatch: {0}")]
    LayoutMismatch(String),
    /// Node ID not present in the compaction map or graph.
    #[error("Node not found: {0}")]
    NodeNotFound(i64),
    /// Node type not registered with the graph.
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),
    /// Edge type not registered with the graph.
    #[error("Unknown edge type: {0}")]
    UnknownEdgeType(String),
    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn shape(
        context: &'static str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::ShapeMismatch {
            context,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result type alias for lattix-link.
pub type Result<T> = std::result::Result<T, Error>;
