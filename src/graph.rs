//! The weighted working graph: vertices carrying super-node metadata, and
//! edges carrying a real weight plus the `constrained_weight` flag used by
//! the branch-and-bound reduction operators.
//!
//! Vertex ids are contiguous `u32`s in `[0, n)`. Structural edits
//! (`remove_vertices`, merges) always relabel back to a contiguous range, so
//! the graph never carries holes between edits.

use std::collections::BTreeMap;

use crate::error::{Result, TroikaError};

/// A single vertex's provenance: the sorted original vertex ids it represents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuperNode(pub Vec<u32>);

impl SuperNode {
    pub fn singleton(id: u32) -> Self {
        Self(vec![id])
    }

    /// Merge `other` into `self`, keeping the union sorted and deduplicated.
    pub fn merge(&mut self, other: &SuperNode) {
        self.0.extend_from_slice(&other.0);
        self.0.sort_unstable();
        self.0.dedup();
    }
}

/// An edge between two distinct working vertices, or a self-loop that
/// accumulates weight absorbed by merges (spec.md §3 "Edge").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeData {
    pub weight: f64,
    /// Set when this weight has already been penalized by a right-branch
    /// `alter_weight` call; prevents double-penalizing the same edge.
    pub constrained_weight: bool,
}

impl EdgeData {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            constrained_weight: false,
        }
    }
}

/// The working graph for one search node or reduction step.
///
/// At most one edge per unordered pair of distinct vertices; self-loops
/// (`u == v`) accumulate merged clique weight and are stored separately from
/// the adjacency map.
#[derive(Debug, Clone)]
pub struct WorkingGraph {
    n: usize,
    super_nodes: Vec<SuperNode>,
    /// `edges[(u, v)]` with `u < v`.
    edges: BTreeMap<(u32, u32), EdgeData>,
    /// Self-loop weight per vertex, accumulated by merges. Not a real LP
    /// variable; contributes a constant to the objective (spec.md §4.C).
    self_loops: Vec<f64>,
}

impl WorkingGraph {
    /// Build a graph on `n` vertices from a deduplicated edge list, each
    /// vertex starting as its own singleton super-node.
    pub fn new(n: usize, edges: Vec<(usize, usize, f64)>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for (u, v, w) in edges {
            if u >= n || v >= n {
                return Err(TroikaError::VertexOutOfRange {
                    u,
                    v,
                    num_vertices: n,
                });
            }
            if u == v {
                continue; // self-loops are not admissible as input edges
            }
            let (a, b) = if u < v {
                (u as u32, v as u32)
            } else {
                (v as u32, u as u32)
            };
            if map.insert((a, b), EdgeData::new(w)).is_some() {
                return Err(TroikaError::DuplicateEdge {
                    u: a as usize,
                    v: b as usize,
                });
            }
        }
        Ok(Self {
            n,
            super_nodes: (0..n as u32).map(SuperNode::singleton).collect(),
            edges: map,
            self_loops: vec![0.0; n],
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.n
    }

    pub fn vertices(&self) -> impl Iterator<Item = u32> {
        0..self.n as u32
    }

    pub fn super_node_of(&self, v: u32) -> &SuperNode {
        &self.super_nodes[v as usize]
    }

    pub fn self_loop_weight(&self, v: u32) -> f64 {
        self.self_loops[v as usize]
    }

    /// Total self-loop weight, the constant term added back into the
    /// objective once the LP solution is extracted (spec.md §4.C).
    pub fn self_loop_total(&self) -> f64 {
        self.self_loops.iter().sum()
    }

    pub fn edge(&self, u: u32, v: u32) -> Option<EdgeData> {
        let key = if u < v { (u, v) } else { (v, u) };
        self.edges.get(&key).copied()
    }

    pub fn has_edge(&self, u: u32, v: u32) -> bool {
        self.edge(u, v).is_some()
    }

    pub fn edges(&self) -> impl Iterator<Item = (u32, u32, EdgeData)> + '_ {
        self.edges.iter().map(|(&(u, v), &d)| (u, v, d))
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn set_edge(&mut self, u: u32, v: u32, data: EdgeData) {
        let key = if u < v { (u, v) } else { (v, u) };
        self.edges.insert(key, data);
    }

    pub fn remove_edge(&mut self, u: u32, v: u32) -> Option<EdgeData> {
        let key = if u < v { (u, v) } else { (v, u) };
        self.edges.remove(&key)
    }

    pub fn add_self_loop(&mut self, v: u32, weight: f64) {
        self.self_loops[v as usize] += weight;
    }

    pub fn neighbors(&self, v: u32) -> Vec<u32> {
        self.edges
            .keys()
            .filter_map(|&(a, b)| {
                if a == v {
                    Some(b)
                } else if b == v {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn degree(&self, v: u32) -> usize {
        self.neighbors(v).len()
    }

    /// Weighted degree: sum of incident edge weights (used by the branching
    /// score's `delta_t` term, spec.md §4.E step 3).
    pub fn weighted_degree(&self, v: u32) -> f64 {
        self.edges
            .iter()
            .filter_map(|(&(a, b), d)| {
                if a == v || b == v {
                    Some(d.weight)
                } else {
                    None
                }
            })
            .sum()
    }

    /// Isolated-node removal (spec.md §4.A `handle_isolated_nodes`).
    ///
    /// Returns `(reduced_graph, isolated_super_nodes)`; isolated vertices
    /// become singleton clusters in the final answer.
    pub fn extract_isolated(&self) -> (WorkingGraph, Vec<SuperNode>) {
        let mut keep = Vec::new();
        let mut isolated = Vec::new();
        for v in self.vertices() {
            if self.degree(v) == 0 && self.self_loop_weight(v) == 0.0 {
                isolated.push(self.super_node_of(v).clone());
            } else {
                keep.push(v);
            }
        }
        (self.subgraph_relabeled(&keep), isolated)
    }

    /// Build a new graph containing only `keep` (in the given order),
    /// relabeled to `[0, keep.len())`.
    pub fn subgraph_relabeled(&self, keep: &[u32]) -> WorkingGraph {
        let mut old_to_new = vec![None; self.n];
        for (new_id, &old_id) in keep.iter().enumerate() {
            old_to_new[old_id as usize] = Some(new_id as u32);
        }
        let mut edges = BTreeMap::new();
        for (&(a, b), &d) in &self.edges {
            if let (Some(na), Some(nb)) = (old_to_new[a as usize], old_to_new[b as usize]) {
                let key = if na < nb { (na, nb) } else { (nb, na) };
                edges.insert(key, d);
            }
        }
        let super_nodes = keep
            .iter()
            .map(|&old| self.super_nodes[old as usize].clone())
            .collect();
        let self_loops = keep.iter().map(|&old| self.self_loops[old as usize]).collect();
        WorkingGraph {
            n: keep.len(),
            super_nodes,
            edges,
            self_loops,
        }
    }

    /// Merge vertex `src` into vertex `dst`: move `src`'s super-node entries
    /// and self-loop weight onto `dst`, redirect every edge incident to
    /// `src` onto `dst` (summing weights when an edge to `dst` already
    /// exists or two redirected edges collide), then drop `src`.
    ///
    /// Does not relabel; callers batch several merges and relabel once.
    pub fn merge_into(&mut self, src: u32, dst: u32) {
        debug_assert_ne!(src, dst);
        self.self_loops[dst as usize] += self.self_loops[src as usize];
        self.self_loops[src as usize] = 0.0;
        let src_node = self.super_nodes[src as usize].clone();
        self.super_nodes[dst as usize].merge(&src_node);

        let incident: Vec<((u32, u32), EdgeData)> = self
            .edges
            .iter()
            .filter(|(&(a, b), _)| a == src || b == src)
            .map(|(&k, &d)| (k, d))
            .collect();
        for ((a, b), d) in incident {
            self.edges.remove(&(a, b));
            let other = if a == src { b } else { a };
            if other == dst {
                // edge between src and dst collapses into dst's self-loop
                self.self_loops[dst as usize] += d.weight;
                continue;
            }
            let key = if dst < other {
                (dst, other)
            } else {
                (other, dst)
            };
            self.edges
                .entry(key)
                .and_modify(|existing| existing.weight += d.weight)
                .or_insert(EdgeData {
                    weight: d.weight,
                    constrained_weight: false,
                });
        }
    }

    /// Relabel vertices to `[0, keep.len())` in `keep` order. Vertices not
    /// listed are dropped entirely (their super-node data is lost — callers
    /// must have already merged it elsewhere).
    pub fn relabel(&self, keep: &[u32]) -> WorkingGraph {
        self.subgraph_relabeled(keep)
    }

    /// Local clustering coefficient of `v`: the fraction of pairs of `v`'s
    /// neighbors that are themselves adjacent. Returns `0.0` for degree
    /// `0` or `1` vertices (no pairs to close).
    pub fn local_clustering_coefficient(&self, v: u32) -> f64 {
        let neighbors = self.neighbors(v);
        let k = neighbors.len();
        if k < 2 {
            return 0.0;
        }
        let mut closed = 0usize;
        for i in 0..k {
            for j in (i + 1)..k {
                if self.has_edge(neighbors[i], neighbors[j]) {
                    closed += 1;
                }
            }
        }
        let possible = k * (k - 1) / 2;
        closed as f64 / possible as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_vertex() {
        let err = WorkingGraph::new(2, vec![(0, 2, 1.0)]).unwrap_err();
        assert!(matches!(err, TroikaError::VertexOutOfRange { .. }));
    }

    #[test]
    fn rejects_duplicate_edge() {
        let err = WorkingGraph::new(2, vec![(0, 1, 1.0), (1, 0, 2.0)]).unwrap_err();
        assert!(matches!(err, TroikaError::DuplicateEdge { .. }));
    }

    #[test]
    fn isolated_vertex_extracted() {
        let g = WorkingGraph::new(4, vec![(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        let (reduced, isolated) = g.extract_isolated();
        assert_eq!(reduced.num_vertices(), 3);
        assert_eq!(isolated.len(), 1);
        assert_eq!(isolated[0].0, vec![3]);
    }

    #[test]
    fn merge_sums_parallel_edges_and_self_loops() {
        // triangle 0-1-2, merge 1 into 0: edge(0,1) becomes self-loop on 0,
        // edge(1,2) becomes edge(0,2) summed with the existing edge(0,2).
        let mut g = WorkingGraph::new(3, vec![(0, 1, 2.0), (1, 2, 3.0), (0, 2, 1.0)]).unwrap();
        g.merge_into(1, 0);
        assert_eq!(g.self_loop_weight(0), 2.0);
        assert_eq!(g.edge(0, 2).unwrap().weight, 4.0);
        assert_eq!(g.super_node_of(0).0, vec![0, 1]);
    }

    #[test]
    fn local_clustering_coefficient_triangle() {
        let g = WorkingGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
        assert_eq!(g.local_clustering_coefficient(0), 1.0);
    }

    #[test]
    fn local_clustering_coefficient_path_center() {
        let g = WorkingGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        assert_eq!(g.local_clustering_coefficient(1), 0.0);
    }
}
