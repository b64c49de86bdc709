//! Error types for the Troika solver.

use thiserror::Error;

/// Errors that can occur while building or solving a Troika instance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TroikaError {
    /// An edge referenced a vertex id outside the graph's vertex range.
    #[error("edge ({u}, {v}) references vertex >= num_vertices ({num_vertices})")]
    VertexOutOfRange {
        u: usize,
        v: usize,
        num_vertices: usize,
    },

    /// The same unordered pair was given two different edge weights.
    #[error("duplicate edge ({u}, {v})")]
    DuplicateEdge { u: usize, v: usize },

    /// A partition failed to cover, or double-covered, the original vertex set.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A super-node lookup referenced a vertex id that does not exist in the
    /// accumulated `super_node_of` mapping.
    #[error("unknown original vertex id {0} during decluster")]
    UnknownOriginalVertex(u32),

    /// A branch's LP relaxation has no feasible solution. Never surfaced
    /// from `troika()`; the search driver catches this internally and
    /// closes the offending node rather than propagating it.
    #[error("branch is LP-infeasible")]
    Infeasible,
}

/// Result type alias for Troika operations.
pub type Result<T> = std::result::Result<T, TroikaError>;
