//! Upper-bound estimator (spec.md §4.D, §6 "Required upper-bound
//! estimator"): a cheap scalar bound computed once at the root, used
//! alongside the root LP value to seed `best_bound` before branching
//! starts.
//!
//! The original dispatches to an external `EstimateUB.estimateUB_chains_fast`
//! module not present in the distilled source; any valid relaxation works
//! here since the root driver takes `min(obj_lp, ub_est)` regardless (spec.md
//! §4.H "ROOT"). The sum of positive edge weights is such a bound: no
//! partition can ever realize more than the total weight available from
//! edges it is possible to keep intra-cluster, since every negative edge
//! only ever subtracts.
use crate::graph::WorkingGraph;

/// Sum of positive edge weights plus existing self-loop weight (self-loops
/// are already-committed intra-cluster weight from prior reductions).
pub fn estimate_upper_bound(g: &WorkingGraph) -> f64 {
    let positive_edges: f64 = g.edges().map(|(_, _, d)| d.weight.max(0.0)).sum();
    positive_edges + g.self_loop_total()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_negative_edges() {
        let g = WorkingGraph::new(2, vec![(0, 1, -5.0)]).unwrap();
        assert_eq!(estimate_upper_bound(&g), 0.0);
    }

    #[test]
    fn sums_positive_edges_and_self_loops() {
        let mut g = WorkingGraph::new(2, vec![(0, 1, 3.0)]).unwrap();
        g.add_self_loop(0, 2.0);
        assert_eq!(estimate_upper_bound(&g), 5.0);
    }
}
