//! Graph-reduction transformations: pre-search `clique_filtering`, and the
//! per-branch `reduce_triple` / `alter_weight` operators (spec.md §4.A, §4.F).

use crate::graph::WorkingGraph;

/// Pendant-and-positive-clique pre-reduction (spec.md §4.A `clique_filtering`).
///
/// For each vertex `v`:
///   1. If `v` is pendant (degree 1) with a positive-weight edge to its
///      neighbor `u`, merge `v` into `u`.
///   2. Else if `v` has local clustering coefficient 1, exactly one
///      neighbor `u` has clustering coefficient < 1, every other neighbor
///      has clustering coefficient 1, and every edge inside `{v} ∪
///      neighbors(v)` is positive, merge `v` into `u`.
///
/// Local clustering coefficients are computed once, fresh, over the input
/// graph before any merges are applied (matching `lcc_dict` in the
/// original Python, computed once at function entry rather than
/// incrementally).
pub fn clique_filtering(g: &WorkingGraph) -> WorkingGraph {
    let n = g.num_vertices();
    let lcc: Vec<f64> = (0..n as u32).map(|v| g.local_clustering_coefficient(v)).collect();

    // shrink_dict[v] = target vertex v merges into (v itself if it stays).
    let mut shrink: Vec<u32> = (0..n as u32).collect();

    for v in 0..n as u32 {
        let neighbors = g.neighbors(v);

        if neighbors.len() == 1 {
            let u = neighbors[0];
            if g.edge(v, u).map(|d| d.weight > 0.0).unwrap_or(false) {
                shrink[v as usize] = u;
            }
            continue;
        }

        if neighbors.is_empty() {
            continue;
        }

        let mut count_ones = 0usize;
        let mut count_not_one = 0usize;
        let mut not_one_neighbor = None;
        for &nb in &neighbors {
            if lcc[nb as usize] == 1.0 {
                count_ones += 1;
            } else {
                count_not_one += 1;
                not_one_neighbor = Some(nb);
            }
        }

        if count_ones == neighbors.len() - 1 && count_not_one == 1 && lcc[v as usize] == 1.0 {
            let all_positive = neighbors.iter().all(|&a| {
                neighbors
                    .iter()
                    .all(|&b| a == b || g.edge(a, b).map(|d| d.weight > 0.0).unwrap_or(true))
            }) && neighbors
                .iter()
                .all(|&u| g.edge(v, u).map(|d| d.weight > 0.0).unwrap_or(false));
            if all_positive {
                shrink[v as usize] = not_one_neighbor.unwrap();
            }
        }
    }

    // Apply merges in increasing vertex order, one hop only: a vertex merges
    // into its `shrink` target exactly when that target is still present.
    // Mirrors the original's single dict pass followed by a sequential merge
    // loop — a vertex whose target was itself merged away earlier simply
    // stays put, rather than chasing the chain to its eventual root. Two
    // mutual pendants (each picking the other) resolve this way too: the
    // lower-indexed vertex merges away first, leaving the other as anchor.
    let mut present = vec![true; n];
    let mut merge_target = vec![None; n];
    for v in 0..n as u32 {
        let t = shrink[v as usize];
        if t != v && present[t as usize] {
            merge_target[v as usize] = Some(t);
            present[v as usize] = false;
        }
    }

    let mut reduced = g.clone();
    for v in 0..n as u32 {
        if let Some(t) = merge_target[v as usize] {
            reduced.merge_into(v, t);
        }
    }

    let keep: Vec<u32> = (0..n as u32).filter(|&v| present[v as usize]).collect();
    reduced.relabel(&keep)
}

/// Map a triple of vertex ids in `orig_g`'s coordinate space into the
/// current graph `g`, by locating the working vertex whose `super_node_of`
/// contains each original id. Mirrors the repeated linear scans in the
/// original `reduce_triple` / `alter_weight` / `get_best_triple`.
pub fn map_triple_into(g: &WorkingGraph, orig_ids: [u32; 3]) -> [u32; 3] {
    let mut mapped = [u32::MAX; 3];
    for v in g.vertices() {
        let members = &g.super_node_of(v).0;
        for (slot, &orig) in orig_ids.iter().enumerate() {
            if mapped[slot] == u32::MAX && members.binary_search(&orig).is_ok() {
                mapped[slot] = v;
            }
        }
        if mapped.iter().all(|&m| m != u32::MAX) {
            break;
        }
    }
    mapped
}

/// Median of `|weight|` over all edges of `orig_g`; the penalty magnitude
/// `delta` used by both `reduce_triple` and `alter_weight`.
pub fn median_abs_weight(orig_g: &WorkingGraph) -> f64 {
    let mut weights: Vec<f64> = orig_g.edges().map(|(_, _, d)| d.weight.abs()).collect();
    if weights.is_empty() {
        return 0.0;
    }
    weights.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = weights.len() / 2;
    if weights.len() % 2 == 1 {
        weights[mid]
    } else {
        (weights[mid - 1] + weights[mid]) / 2.0
    }
}

/// Left-branch merge (spec.md §4.A `reduce_triple`): collapse the triple
/// `(a, b, c)` into a single vertex `a`, accumulating intra-triple weight
/// into `a`'s self-loop, redirecting all other incident edges onto `a`,
/// then subtracting `delta` from every surviving `constrained_weight` edge.
pub fn reduce_triple(g: &WorkingGraph, triple_orig: [u32; 3], orig_g: &WorkingGraph) -> WorkingGraph {
    let [a, b, c] = map_triple_into(g, triple_orig);
    let mut out = g.clone();

    // `merge_into` already folds the `a`-`b` and `a`-`c` edges into `a`'s
    // self-loop as it redirects them, and folds the (possibly `b`-`c`
    // redirected-through-`a`) edge in on the second call — no separate
    // bookkeeping needed here.
    if b != a {
        out.merge_into(b, a);
    }
    if c != a && c != b {
        out.merge_into(c, a);
    }

    let keep: Vec<u32> = out.vertices().filter(|&v| v != b && v != c).collect();
    let mut out = out.relabel(&keep);

    let delta = median_abs_weight(orig_g);
    let constrained: Vec<(u32, u32)> = out
        .edges()
        .filter(|(_, _, d)| d.constrained_weight)
        .map(|(u, v, _)| (u, v))
        .collect();
    for (u, v) in constrained {
        let mut d = out.edge(u, v).unwrap();
        d.weight -= delta;
        out.set_edge(u, v, d);
    }
    out
}

/// Right-branch penalty (spec.md §4.A `alter_weight`): subtract `delta`
/// from each of the triple's present intra-triple edges and mark them
/// `constrained_weight`; clear the flag on every other edge. Does not
/// change graph structure.
pub fn alter_weight(g: &WorkingGraph, triple_orig: [u32; 3], orig_g: &WorkingGraph) -> WorkingGraph {
    let [a, b, c] = map_triple_into(g, triple_orig);
    let delta = median_abs_weight(orig_g);
    let mut out = g.clone();

    let intra: [(u32, u32); 3] = [(a, b), (a, c), (b, c)];
    let updates: Vec<(u32, u32, crate::graph::EdgeData)> = out
        .edges()
        .map(|(u, v, mut d)| {
            if intra.iter().any(|&(x, y)| (x, y) == (u, v) || (x, y) == (v, u)) {
                d.weight -= delta;
                d.constrained_weight = true;
            } else {
                d.constrained_weight = false;
            }
            (u, v, d)
        })
        .collect();
    for (u, v, d) in updates {
        out.set_edge(u, v, d);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pendant_with_positive_edge_merges_into_anchor() {
        // both vertices are mutual degree-1 pendants; the lower-indexed one
        // merges into the other, leaving a single vertex with the edge
        // weight absorbed as a self-loop.
        let g = WorkingGraph::new(2, vec![(0, 1, 2.0)]).unwrap();
        let reduced = clique_filtering(&g);
        assert_eq!(reduced.num_vertices(), 1);
        assert_eq!(reduced.self_loop_weight(0), 2.0);
    }

    #[test]
    fn pendant_with_negative_edge_does_not_merge() {
        let g = WorkingGraph::new(2, vec![(0, 1, -2.0)]).unwrap();
        let reduced = clique_filtering(&g);
        assert_eq!(reduced.num_vertices(), 2);
    }

    #[test]
    fn reduce_triple_collapses_triangle_to_self_loop() {
        let g = WorkingGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
        let reduced = reduce_triple(&g, [0, 1, 2], &g);
        assert_eq!(reduced.num_vertices(), 1);
        assert_eq!(reduced.self_loop_weight(0), 3.0);
    }

    #[test]
    fn alter_weight_penalizes_only_intra_triple_edges() {
        let g = WorkingGraph::new(4, vec![(0, 1, 4.0), (1, 2, 4.0), (0, 2, 4.0), (2, 3, 4.0)]).unwrap();
        let penalized = alter_weight(&g, [0, 1, 2], &g);
        let delta = median_abs_weight(&g);
        assert_eq!(penalized.edge(0, 1).unwrap().weight, 4.0 - delta);
        assert!(penalized.edge(0, 1).unwrap().constrained_weight);
        assert_eq!(penalized.edge(2, 3).unwrap().weight, 4.0);
        assert!(!penalized.edge(2, 3).unwrap().constrained_weight);
    }
}
