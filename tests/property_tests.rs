//! Property-based invariants for the public `troika` entry point and the
//! pure graph-reduction helpers it relies on.

use proptest::prelude::*;
use troika::config::TroikaOptions;
use troika::graph::WorkingGraph;
use troika::reductions::clique_filtering;
use troika::troika;

/// A small random graph: up to 6 vertices, each unordered pair present with
/// probability ~0.5, weights in `[-3, 3]`.
fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize, f64)>)> {
    (2usize..=6).prop_flat_map(|n| {
        let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (i, j))).collect();
        let edge_opts = proptest::collection::vec(
            prop_oneof![Just(None::<f64>), (-3.0f64..3.0).prop_map(Some)],
            pairs.len(),
        );
        edge_opts.prop_map(move |opts| {
            let edges = pairs
                .iter()
                .zip(opts)
                .filter_map(|(&(u, v), w)| w.map(|w| (u, v, w)))
                .collect();
            (n, edges)
        })
    })
}

proptest! {
    #[test]
    fn partition_covers_every_vertex_exactly_once((n, edges) in arb_graph()) {
        let g = WorkingGraph::new(n, edges).unwrap();
        let mut opts = TroikaOptions::default();
        opts.time_allowed = 5.0;
        let out = troika(g, &opts);
        prop_assert!(out.partition.is_valid_cover(n));
    }

    #[test]
    fn lower_bound_never_exceeds_upper_bound((n, edges) in arb_graph()) {
        let g = WorkingGraph::new(n, edges).unwrap();
        let mut opts = TroikaOptions::default();
        opts.time_allowed = 5.0;
        let out = troika(g, &opts);
        prop_assert!(out.lower_bound <= out.upper_bound + 1e-6);
    }

    #[test]
    fn relabeling_vertices_does_not_change_the_optimal_objective((n, edges) in arb_graph(), seed in any::<u64>()) {
        use rand::seq::SliceRandom;
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut perm: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        perm.shuffle(&mut rng);

        let g = WorkingGraph::new(n, edges.clone()).unwrap();
        let relabeled_edges: Vec<(usize, usize, f64)> =
            edges.iter().map(|&(u, v, w)| (perm[u], perm[v], w)).collect();
        let g2 = WorkingGraph::new(n, relabeled_edges).unwrap();

        let mut opts = TroikaOptions::default();
        opts.time_allowed = 5.0;
        let out1 = troika(g, &opts);
        let out2 = troika(g2, &opts);
        prop_assert!((out1.lower_bound - out2.lower_bound).abs() < 1e-4);
    }

    #[test]
    fn clique_filtering_preserves_every_original_vertex((n, edges) in arb_graph()) {
        let g = WorkingGraph::new(n, edges).unwrap();
        let reduced = clique_filtering(&g);
        let mut covered: Vec<u32> = reduced.vertices().flat_map(|v| reduced.super_node_of(v).0.clone()).collect();
        covered.sort_unstable();
        covered.dedup();
        prop_assert_eq!(covered, (0..n as u32).collect::<Vec<_>>());
    }

    #[test]
    fn clique_filtering_never_increases_vertex_count((n, edges) in arb_graph()) {
        let g = WorkingGraph::new(n, edges).unwrap();
        let reduced = clique_filtering(&g);
        prop_assert!(reduced.num_vertices() <= n);
    }
}
