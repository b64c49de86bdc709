//! Search node (spec.md §3 "Search node"): the graph, LP state, and fixed
//! variable sets carried along one root-to-leaf path.
//!
//! The original links nodes into an explicit tree via `parent`/`left`/
//! `right` pointers, but nothing in the search driver ever walks back up
//! that tree — `EXPAND` is strictly level-synchronous BFS over a flat
//! frontier (spec.md §4.H, §9 "explicit stack or iterative BFS to avoid
//! stack overflow"). `SearchNode` therefore carries only `level` and drops
//! the back-pointers; `search.rs` holds the frontier as a plain `Vec`.

use std::collections::{BTreeMap, HashSet};

use crate::lp::{BranchConstraint, VarKey};
use crate::graph::WorkingGraph;
use crate::types::Partition;

#[derive(Debug, Clone)]
pub struct SearchNode {
    pub constraints: Vec<BranchConstraint>,
    pub graph: WorkingGraph,
    pub var_vals: BTreeMap<VarKey, f64>,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub fixed_ones: HashSet<VarKey>,
    pub fixed_zeros: HashSet<VarKey>,
    pub combo_communities: Partition,
    pub closed: bool,
    pub is_integer: bool,
    pub is_infeasible: bool,
    pub level: u32,
}

impl SearchNode {
    /// The root node: no path constraints or fixings yet, `var_vals`/bounds
    /// filled in once the root LP is solved.
    pub fn root(graph: WorkingGraph, incumbent_partition: Partition, incumbent_lower_bound: f64) -> Self {
        Self {
            constraints: Vec::new(),
            graph,
            var_vals: BTreeMap::new(),
            lower_bound: incumbent_lower_bound,
            upper_bound: f64::INFINITY,
            fixed_ones: HashSet::new(),
            fixed_zeros: HashSet::new(),
            combo_communities: incumbent_partition,
            closed: false,
            is_integer: false,
            is_infeasible: false,
            level: 0,
        }
    }

    /// Close this node: no further branching will occur below it. Per
    /// spec.md §4.E step 6, a node closes when infeasible, integer, or its
    /// upper bound cannot beat the incumbent.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn should_close(&self, incumbent: f64) -> bool {
        self.is_infeasible || self.is_integer || self.upper_bound <= incumbent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WorkingGraph;

    #[test]
    fn should_close_when_upper_bound_at_or_below_incumbent() {
        let g = WorkingGraph::new(1, vec![]).unwrap();
        let mut node = SearchNode::root(g, Partition(vec![vec![0]]), 0.0);
        node.upper_bound = 5.0;
        assert!(node.should_close(5.0));
        assert!(!node.should_close(4.0));
    }

    #[test]
    fn should_close_when_infeasible_or_integer() {
        let g = WorkingGraph::new(1, vec![]).unwrap();
        let mut node = SearchNode::root(g, Partition(vec![vec![0]]), 0.0);
        node.upper_bound = 10.0;
        node.is_infeasible = true;
        assert!(node.should_close(0.0));

        node.is_infeasible = false;
        node.is_integer = true;
        assert!(node.should_close(0.0));
    }
}
