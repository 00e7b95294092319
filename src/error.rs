use std::fmt;

/// Result alias for `sbp`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by graph construction and partitioning entry points.
///
/// The partitioning engine itself has no recoverable runtime failures:
/// inputs are validated at the boundary and everything past it is total.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid number of target clusters requested.
    InvalidClusterCount {
        /// Requested cluster count.
        requested: usize,
    },

    /// An edge endpoint lies outside `0..vertex_count`.
    VertexOutOfRange {
        /// Offending endpoint.
        vertex: usize,
        /// Number of vertices in the graph.
        vertex_count: usize,
    },

    /// An edge connects a vertex to itself.
    SelfLoop {
        /// The looping vertex.
        vertex: usize,
    },

    /// An adjacency list is not symmetric.
    AsymmetricEdge {
        /// Source vertex listing the neighbor.
        from: usize,
        /// Neighbor missing the reverse entry.
        to: usize,
    },

    /// A configuration or result file could not be read or written.
    Io(String),

    /// Generic error with message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidClusterCount { requested } => {
                write!(f, "invalid target cluster count {requested}; at least 1 required")
            }
            Error::VertexOutOfRange { vertex, vertex_count } => {
                write!(f, "edge endpoint {vertex} out of range for {vertex_count} vertices")
            }
            Error::SelfLoop { vertex } => write!(f, "self-loop at vertex {vertex}"),
            Error::AsymmetricEdge { from, to } => {
                write!(f, "adjacency lists asymmetric: {from} lists {to} but not vice versa")
            }
            Error::Io(msg) => write!(f, "i/o error: {msg}"),
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
