//! End-to-end scenarios exercising the full `troika` pipeline.

use troika::config::TroikaOptions;
use troika::graph::WorkingGraph;
use troika::troika;

fn opts() -> TroikaOptions {
    TroikaOptions::default()
}

#[test]
fn triangle_all_positive_merges_into_one_cluster() {
    let g = WorkingGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
    let out = troika(g, &opts());
    assert_eq!(out.partition.clusters(), &[vec![0u32, 1, 2]]);
    assert!((out.lower_bound - 3.0).abs() < 1e-6);
    assert!(out.gap() <= 1e-3 + 1e-9);
}

#[test]
fn triangle_mixed_weights_splits_the_negative_edge() {
    // Two positive edges at weight 2, one negative edge at -3: keeping all
    // three together scores 2 + 2 - 3 = 1, splitting off the negative edge
    // scores 2.
    let g = WorkingGraph::new(3, vec![(0, 1, 2.0), (1, 2, 2.0), (0, 2, -3.0)]).unwrap();
    let out = troika(g, &opts());
    assert!(out.partition.is_valid_cover(3));
    assert!((out.lower_bound - 2.0).abs() < 1e-6);
    assert_eq!(out.partition.clusters().len(), 2);
}

#[test]
fn two_disconnected_triangles_solve_as_independent_components() {
    let g = WorkingGraph::new(
        6,
        vec![
            (0, 1, 1.0),
            (1, 2, 1.0),
            (0, 2, 1.0),
            (3, 4, 1.0),
            (4, 5, 1.0),
            (3, 5, 1.0),
        ],
    )
    .unwrap();
    let out = troika(g, &opts());
    assert!(out.partition.is_valid_cover(6));
    assert!((out.lower_bound - 6.0).abs() < 1e-6);
    assert_eq!(out.partition.clusters().len(), 2);
}

#[test]
fn pendant_node_stays_isolated_when_its_only_edge_is_negative() {
    // 0-1-2 is a positive triangle; vertex 3 hangs off vertex 0 with a
    // negative edge, so it is cheaper kept alone.
    let g = WorkingGraph::new(
        4,
        vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0), (0, 3, -1.0)],
    )
    .unwrap();
    let out = troika(g, &opts());
    assert!(out.partition.is_valid_cover(4));
    let singleton_present = out.partition.clusters().iter().any(|c| c == &vec![3u32]);
    assert!(singleton_present);
}

#[test]
fn star_with_one_negative_pendant_edge_merges_two_leaves() {
    // Star center 0, leaves 1,2,3, all edges +1, plus w{1,2} = -5: keeping
    // {0,1,2,3} together scores 3-5 = -2, peeling leaf 2 off alone scores
    // 1 (edge 0-1) + 1 (edge 0-3) = 2, better than peeling any other way.
    let g = WorkingGraph::new(
        4,
        vec![
            (0, 1, 1.0),
            (0, 2, 1.0),
            (0, 3, 1.0),
            (1, 2, -5.0),
        ],
    )
    .unwrap();
    let out = troika(g, &opts());
    assert!(out.partition.is_valid_cover(4));
    assert!((out.lower_bound - 2.0).abs() < 1e-6);
    let mut clusters: Vec<Vec<u32>> = out.partition.clusters().iter().cloned().collect();
    for c in &mut clusters {
        c.sort_unstable();
    }
    clusters.sort();
    assert_eq!(clusters, vec![vec![0u32, 1, 3], vec![2u32]]);
}

#[test]
fn five_clique_with_one_negative_edge_keeps_the_rest_together() {
    let mut edges = Vec::new();
    for i in 0..5u32 {
        for j in (i + 1)..5u32 {
            edges.push((i as usize, j as usize, 1.0));
        }
    }
    // overwrite one edge to be strongly negative
    edges.retain(|&(u, v, _)| !(u == 0 && v == 1));
    edges.push((0, 1, -10.0));
    let g = WorkingGraph::new(5, edges).unwrap();
    let out = troika(g, &opts());
    assert!(out.partition.is_valid_cover(5));
    // vertices 0 and 1 should end up in different clusters
    let cluster_of = |v: u32| {
        out.partition
            .clusters()
            .iter()
            .position(|c| c.contains(&v))
            .unwrap()
    };
    assert_ne!(cluster_of(0), cluster_of(1));
}

#[test]
fn isolated_node_with_no_edges_becomes_its_own_singleton() {
    let g = WorkingGraph::new(4, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
    let out = troika(g, &opts());
    assert!(out.partition.is_valid_cover(4));
    assert!(out.partition.clusters().iter().any(|c| c == &vec![3u32]));
}

#[test]
fn develop_mode_reports_a_consistent_state_and_bounds() {
    let g = WorkingGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
    let mut o = opts();
    o.develop_mode = true;
    let out = troika(g, &o);
    assert!(out.lower_bound <= out.upper_bound + 1e-9);
}
