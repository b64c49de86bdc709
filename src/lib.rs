//! # Troika
//!
//! An exact branch-and-bound solver for the weighted Clique Partitioning
//! Problem (CPP): partition the vertices of an undirected, signed-weight
//! graph into disjoint clusters maximizing the sum of intra-cluster edge
//! weights. Missing edges contribute zero; both positive and negative
//! weights are admissible.
//!
//! The solver combines an LP relaxation with triangle-inequality cuts, a
//! primal community-detection heuristic for incumbent bounds, branching on
//! violated triples rather than single variables, graph-reduction
//! operators that shrink the working instance at each branch, and
//! reduced-cost / implied-fixing propagation between branches.
//!
//! ## Example
//!
//! ```rust
//! use troika::prelude::*;
//!
//! let graph = WorkingGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
//! let result = troika(graph, &TroikaOptions::default());
//! assert_eq!(result.partition.clusters(), &[vec![0u32, 1, 2]]);
//! ```

pub mod branch;
pub mod components;
pub mod config;
pub mod cuts;
pub mod error;
pub mod estimate;
pub mod graph;
pub mod heuristic;
pub mod lp;
pub mod node;
pub mod propagate;
pub mod reductions;
pub mod search;
pub mod types;

pub use search::troika;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::TroikaOptions;
    pub use crate::error::{Result, TroikaError};
    pub use crate::graph::WorkingGraph;
    pub use crate::search::troika;
    pub use crate::types::{Partition, ResultState, TroikaOutput};
}

pub use error::{Result, TroikaError};
