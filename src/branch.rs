//! Branching engine (spec.md §4.E): violated-triple detection bucketed by
//! positive-edge count, and `get_best_triple`'s anchored-sampling selection.
//!
//! Triples (`triads`, `var_vals` keys) are always named in the **root**
//! graph's coordinate space, since the static cut-triad pool and LP
//! variable set are both fixed at the root. But edge positivity — both the
//! bucketing here and the weighted-degree term in `get_best_triple` — is
//! read from the node's *current* graph, mapping each triple's root ids
//! into it via `map_triple_into` first. `alter_weight`/`reduce_triple` can
//! flip an intra-triple edge's sign or erase it entirely as branching
//! descends, and the bucketing must see that.

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::graph::WorkingGraph;
use crate::lp::{BranchConstraint, VarKey};
use crate::reductions::map_triple_into;

const SAMPLE_CAP: usize = 100;

/// One bucket (by positive-edge count among the triple's three pairs) of
/// the violated-triple search (spec.md §4.E step 1). Buckets are returned
/// highest-count-first, unioned here as a single ranked scan rather than
/// four separate maps — callers get the first non-empty bucket either way.
pub fn find_violated_triples(
    triads: &[[u32; 3]],
    var_vals: &BTreeMap<VarKey, f64>,
    current_graph: &WorkingGraph,
) -> Vec<[u32; 3]> {
    let mut buckets: [Vec<[u32; 3]>; 4] = Default::default();
    for &[i, j, k] in triads {
        let sum = var_vals[&VarKey::new(i, j)] + var_vals[&VarKey::new(j, k)] + var_vals[&VarKey::new(i, k)];
        if !(sum > 0.0 && sum < 2.0) {
            continue;
        }
        let [mi, mj, mk] = map_triple_into(current_graph, [i, j, k]);
        let positive_count = [(mi, mj), (mi, mk), (mj, mk)]
            .iter()
            .filter(|&&(a, b)| current_graph.edge(a, b).map(|d| d.weight > 0.0).unwrap_or(false))
            .count();
        buckets[3 - positive_count].push([i, j, k]);
    }
    for bucket in buckets {
        if !bucket.is_empty() {
            return bucket;
        }
    }
    Vec::new()
}

/// Select one triple from `violated` via score-weighted sampling (spec.md
/// §4.E step 3). Samples at most [`SAMPLE_CAP`] candidates when the bucket
/// is larger, matching the original's `random.sample(..., 100)` cap.
pub fn get_best_triple(
    violated: &[[u32; 3]],
    path: &[BranchConstraint],
    fixed_ones: &HashSet<VarKey>,
    fixed_zeros: &HashSet<VarKey>,
    current_graph: &WorkingGraph,
    root_graph: &WorkingGraph,
    rng: &mut StdRng,
) -> [u32; 3] {
    let root_n = root_graph.num_vertices() as u32;
    let candidates: Vec<[u32; 3]> = if violated.len() <= SAMPLE_CAP {
        violated.to_vec()
    } else {
        violated
            .choose_multiple(rng, SAMPLE_CAP)
            .copied()
            .collect()
    };

    let current_n = current_graph.num_vertices().max(1) as f64;

    let scores: Vec<f64> = candidates
        .iter()
        .map(|&triple| {
            let mapped = map_triple_into(current_graph, triple);
            (0..3)
                .map(|t| {
                    let v = triple[t];
                    let alpha = ((v + 1)..root_n)
                        .filter(|&i| {
                            let key = VarKey::new(v, i);
                            fixed_ones.contains(&key) || fixed_zeros.contains(&key)
                        })
                        .count() as f64;
                    let beta = path.iter().filter(|c| c.triple.contains(&v)).count() as f64;
                    let delta = current_graph.weighted_degree(mapped[t]);
                    (1.0 - (-alpha).exp()) + beta + (delta / current_n).abs()
                })
                .sum()
        })
        .collect();

    let indices: Vec<usize> = (0..candidates.len()).collect();
    let chosen_idx = *indices
        .choose_weighted(rng, |&idx| scores[idx].max(f64::MIN_POSITIVE))
        .unwrap_or(&0);
    candidates[chosen_idx]
}

/// `0 <= x <= 1` integer check with the tolerance spec.md §9 fixes at
/// `1e-6` ("compare integer feasibility by `|x| < ε` / `|1-x| < ε`").
pub fn is_integer_solution(var_vals: &BTreeMap<VarKey, f64>) -> bool {
    const EPS: f64 = 1e-6;
    var_vals.values().all(|&x| x.abs() < EPS || (1.0 - x).abs() < EPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(triples: &[(u32, u32, f64)]) -> BTreeMap<VarKey, f64> {
        triples.iter().map(|&(a, b, v)| (VarKey::new(a, b), v)).collect()
    }

    #[test]
    fn fully_fractional_triple_is_violated() {
        let g = WorkingGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
        let var_vals = vars(&[(0, 1, 0.5), (1, 2, 0.5), (0, 2, 0.5)]);
        let found = find_violated_triples(&[[0, 1, 2]], &var_vals, &g);
        assert_eq!(found, vec![[0, 1, 2]]);
    }

    #[test]
    fn bucketing_reads_edge_sign_from_current_graph_not_root() {
        // Two disjoint candidate triples: [0,1,2] starts with all three
        // edges positive (bucket 0, beats [0,3,4]'s two positive edges), but
        // an `alter_weight` penalty in `current` flips (0,1) negative,
        // demoting [0,1,2] into [0,3,4]'s bucket. Bucketing against `root`
        // must miss that demotion; bucketing against `current` must not.
        let triads = [[0, 1, 2], [0, 3, 4]];
        let var_vals = vars(&[
            (0, 1, 0.5),
            (1, 2, 0.5),
            (0, 2, 0.5),
            (0, 3, 0.5),
            (0, 4, 0.5),
            (3, 4, 0.5),
        ]);
        let root = WorkingGraph::new(
            5,
            vec![
                (0, 1, 1.0),
                (1, 2, 1.0),
                (0, 2, 1.0),
                (0, 3, 1.0),
                (0, 4, -1.0),
                (3, 4, 1.0),
            ],
        )
        .unwrap();
        let mut current = root.clone();
        current.set_edge(
            0,
            1,
            crate::graph::EdgeData {
                weight: -1.0,
                constrained_weight: true,
            },
        );

        let root_found = find_violated_triples(&triads, &var_vals, &root);
        assert_eq!(root_found, vec![[0, 1, 2]]);

        let current_found = find_violated_triples(&triads, &var_vals, &current);
        assert_eq!(current_found, vec![[0, 1, 2], [0, 3, 4]]);
    }

    #[test]
    fn integer_feasible_triple_is_not_violated() {
        let g = WorkingGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
        let var_vals = vars(&[(0, 1, 0.0), (1, 2, 0.0), (0, 2, 0.0)]);
        assert!(find_violated_triples(&[[0, 1, 2]], &var_vals, &g).is_empty());
        let var_vals = vars(&[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]);
        assert!(find_violated_triples(&[[0, 1, 2]], &var_vals, &g).is_empty());
    }

    #[test]
    fn is_integer_solution_tolerates_epsilon_noise() {
        let var_vals = vars(&[(0, 1, 1e-9), (1, 2, 1.0 - 1e-9)]);
        assert!(is_integer_solution(&var_vals));
        let var_vals = vars(&[(0, 1, 0.5)]);
        assert!(!is_integer_solution(&var_vals));
    }
}
