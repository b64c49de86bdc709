//! Search driver (spec.md §4.H): the `INIT -> ROOT -> EXPAND* -> DONE` state
//! machine, `perform_branch`'s per-node left/right expansion, and
//! `post_processing`. `troika()` is the crate's public entry point.

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, info_span};

use crate::branch::{find_violated_triples, get_best_triple, is_integer_solution};
use crate::components::{recombine, split_components};
use crate::config::TroikaOptions;
use crate::cuts::find_cut_triads;
use crate::estimate::estimate_upper_bound;
use crate::graph::WorkingGraph;
use crate::heuristic::{objective_value, HeuristicResult, HeuristicRun};
use crate::lp::{round8, BranchConstraint, BranchSide, LpModel, VarKey};
use crate::node::SearchNode;
use crate::propagate::{left_implied, right_implied};
use crate::types::{Partition, ResultState, Timings, TroikaOutput};

/// Run the full Troika pipeline on `graph` and return the combined result
/// (spec.md §6 `troika` entry point).
pub fn troika(graph: WorkingGraph, opts: &TroikaOptions) -> TroikaOutput {
    let _span = info_span!("troika").entered();

    if graph.num_vertices() == 0 {
        return TroikaOutput {
            state: ResultState::ExhaustedIntegerIncumbent,
            lower_bound: 0.0,
            upper_bound: 0.0,
            partition: Partition(Vec::new()),
            timings: Timings::default(),
        };
    }

    let components = split_components(&graph);
    let scaled_threshold = opts.global_threshold / components.len() as f64;
    info!(num_components = components.len(), scaled_threshold, "split into components");

    let mut worst_state = ResultState::HeuristicGapClosed;
    let mut lower_bound = 0.0;
    let mut upper_bound = 0.0;
    let mut timings = Timings::default();
    let mut partitions = Vec::with_capacity(components.len());

    for component in components {
        let result = solve_component(component, opts, scaled_threshold);
        if result.state.code() > worst_state.code() {
            worst_state = result.state;
        }
        lower_bound += result.lower_bound;
        upper_bound += result.upper_bound;
        timings.preprocessing_time += result.timings.preprocessing_time;
        timings.formulation_time += result.timings.formulation_time;
        timings.solve_time += result.timings.solve_time;
        partitions.push(result.partition);
    }

    TroikaOutput {
        state: worst_state,
        lower_bound: round8(lower_bound),
        upper_bound: round8(upper_bound),
        partition: recombine(partitions),
        timings,
    }
}

struct ComponentResult {
    state: ResultState,
    lower_bound: f64,
    upper_bound: f64,
    partition: Partition,
    timings: Timings,
}

fn fallback_partition(g: &WorkingGraph, isolated: &[crate::graph::SuperNode]) -> HeuristicResult {
    let mut clusters: Vec<Vec<u32>> = g.vertices().map(|v| g.super_node_of(v).0.clone()).collect();
    for s in isolated {
        clusters.push(s.0.clone());
    }
    let partition = Partition(clusters).canonicalize();
    HeuristicResult {
        lower_bound: round8(g.self_loop_total()),
        partition,
    }
}

fn solve_component(input: WorkingGraph, opts: &TroikaOptions, threshold: f64) -> ComponentResult {
    let span = info_span!("component", n = input.num_vertices());
    let _enter = span.enter();

    // INIT
    let t_init = Instant::now();
    let filtered = crate::reductions::clique_filtering(&input);
    let (core_graph, isolated) = filtered.extract_isolated();
    let root_graph = core_graph.clone();
    let preprocessing_time = t_init.elapsed().as_secs_f64();

    if core_graph.num_vertices() == 0 {
        let fallback = fallback_partition(&root_graph, &isolated);
        return ComponentResult {
            state: ResultState::ExhaustedIntegerIncumbent,
            lower_bound: fallback.lower_bound,
            upper_bound: fallback.lower_bound,
            partition: fallback.partition,
            timings: Timings {
                preprocessing_time,
                formulation_time: 0.0,
                solve_time: 0.0,
            },
        };
    }

    // ROOT
    info!("ROOT");
    let mut heuristic_run = HeuristicRun::new(fallback_partition(&root_graph, &isolated));
    let heuristic_result = heuristic_run.run_combo(&core_graph, &root_graph, &isolated, opts);
    let mut incumbent = heuristic_result.lower_bound;
    let mut incumbent_proven_integer = false;
    let mut best_partition = heuristic_result.partition.clone();

    let ub_est = estimate_upper_bound(&root_graph);
    if ub_est <= 1e-12 || (ub_est - incumbent) / ub_est < threshold {
        return ComponentResult {
            state: ResultState::HeuristicGapClosed,
            lower_bound: incumbent,
            upper_bound: ub_est.max(incumbent),
            partition: best_partition,
            timings: Timings {
                preprocessing_time,
                formulation_time: 0.0,
                solve_time: 0.0,
            },
        };
    }

    let t_formulate = Instant::now();
    let triads = find_cut_triads(&core_graph, opts.threads);
    let lp_model = LpModel::new(core_graph.clone(), triads, opts.threads);
    let root_solution = lp_model.solve_lp(&HashSet::new(), &HashSet::new(), &[]);
    let formulation_time = t_formulate.elapsed().as_secs_f64();

    let Some(root_solution) = root_solution else {
        // The all-same-cluster point is always LP-feasible, so this branch
        // only fires on a solver-level failure; fall back to the heuristic
        // incumbent rather than aborting the whole component.
        return ComponentResult {
            state: ResultState::ExhaustedNoIntegerIncumbent,
            lower_bound: incumbent,
            upper_bound: ub_est.max(incumbent),
            partition: best_partition,
            timings: Timings {
                preprocessing_time,
                formulation_time,
                solve_time: 0.0,
            },
        };
    };

    if is_integer_solution(&root_solution.var_vals) {
        let (partition, objective) = post_processing(&root_graph, &root_solution.var_vals);
        return ComponentResult {
            state: ResultState::RootIntegerLp,
            lower_bound: objective,
            upper_bound: objective,
            partition,
            timings: Timings {
                preprocessing_time,
                formulation_time,
                solve_time: 0.0,
            },
        };
    }

    let obj_lp = root_solution.objective;
    if obj_lp > 0.0 && (obj_lp - incumbent) / obj_lp < threshold {
        return ComponentResult {
            state: ResultState::RootLpGapClosed,
            lower_bound: incumbent,
            upper_bound: obj_lp,
            partition: best_partition,
            timings: Timings {
                preprocessing_time,
                formulation_time,
                solve_time: 0.0,
            },
        };
    }

    let mut best_bound = obj_lp.min(ub_est);

    // EXPAND
    info!("EXPAND");
    let t_solve = Instant::now();
    let deadline = t_solve + Duration::from_secs_f64(opts.time_allowed);

    let mut root_node = SearchNode::root(core_graph, heuristic_result.partition.clone(), incumbent);
    root_node.var_vals = root_solution.var_vals;
    root_node.upper_bound = obj_lp;
    let mut frontier = vec![root_node];
    let mut rng = StdRng::seed_from_u64(0);

    let termination = loop {
        if frontier.is_empty() {
            break Termination::Exhausted;
        }
        if incumbent >= best_bound {
            break Termination::Exhausted;
        }
        if best_bound > 0.0 && (best_bound - incumbent) / best_bound <= threshold {
            break Termination::Exhausted;
        }
        if Instant::now() >= deadline {
            break Termination::Timeout;
        }

        let mut next_frontier = Vec::new();
        for node in frontier {
            let children = perform_branch(
                node,
                &lp_model,
                &root_graph,
                &mut heuristic_run,
                &isolated,
                opts,
                incumbent,
                &mut rng,
            );
            for mut child in children {
                if child.lower_bound > incumbent {
                    incumbent = child.lower_bound;
                    best_partition = child.combo_communities.clone();
                    incumbent_proven_integer = child.is_integer;
                }
                if child.should_close(incumbent) {
                    child.close();
                } else {
                    next_frontier.push(child);
                }
            }
        }
        frontier = next_frontier;
        best_bound = frontier
            .iter()
            .map(|n| n.upper_bound)
            .fold(f64::NEG_INFINITY, f64::max)
            .min(best_bound);
        if frontier.is_empty() {
            // nothing left open: the last computed best_bound no longer
            // reflects an open node, so collapse it onto the incumbent.
            best_bound = incumbent;
        }
    };

    let solve_time = t_solve.elapsed().as_secs_f64();
    let state = match (termination, incumbent_proven_integer) {
        (Termination::Timeout, true) => ResultState::TimeoutIntegerIncumbent,
        (Termination::Timeout, false) if incumbent > 0.0 => ResultState::TimeoutFractionalIncumbent,
        (Termination::Timeout, false) => ResultState::TimeoutNoIntegerIncumbent,
        (Termination::Exhausted, true) => ResultState::ExhaustedIntegerIncumbent,
        (Termination::Exhausted, false) if incumbent > 0.0 => ResultState::ExhaustedFractionalIncumbent,
        (Termination::Exhausted, false) => ResultState::ExhaustedNoIntegerIncumbent,
    };

    ComponentResult {
        state,
        lower_bound: round8(incumbent),
        upper_bound: round8(best_bound.max(incumbent)),
        partition: best_partition,
        timings: Timings {
            preprocessing_time,
            formulation_time,
            solve_time,
        },
    }
}

#[derive(Clone, Copy)]
enum Termination {
    Timeout,
    Exhausted,
}

/// One node's expansion (spec.md §4.E `perform_branch`): either a single
/// closed integer leaf (step 2) or a left/right child pair (steps 3-6).
#[allow(clippy::too_many_arguments)]
fn perform_branch(
    node: SearchNode,
    lp_model: &LpModel,
    root_graph: &WorkingGraph,
    heuristic_run: &mut HeuristicRun,
    isolated: &[crate::graph::SuperNode],
    opts: &TroikaOptions,
    incumbent: f64,
    rng: &mut StdRng,
) -> Vec<SearchNode> {
    let triads_violated = find_violated_triples(lp_model.triads(), &node.var_vals, &node.graph);

    if triads_violated.is_empty() {
        let ip_solution = lp_model.solve_ip(&node.fixed_ones, &node.fixed_zeros, &node.constraints);
        return match ip_solution {
            None => {
                let mut leaf = node;
                leaf.is_infeasible = true;
                leaf.close();
                vec![leaf]
            }
            Some(sol) => {
                let (partition, objective) = post_processing(&node.graph, &sol.var_vals);
                let mut leaf = node;
                leaf.var_vals = sol.var_vals;
                leaf.lower_bound = objective;
                leaf.upper_bound = objective;
                leaf.combo_communities = partition;
                leaf.is_integer = true;
                leaf.close();
                vec![leaf]
            }
        };
    }

    let triple = get_best_triple(
        &triads_violated,
        &node.constraints,
        &node.fixed_ones,
        &node.fixed_zeros,
        &node.graph,
        root_graph,
        rng,
    );

    let mut children = Vec::with_capacity(2);

    // Left branch: the triple merges structurally in `left_graph`, so the
    // constraint need not be carried forward on the path stack — only used
    // transiently to extract `left_ub` (spec.md §4.E step 4, "remove
    // branching constraints").
    {
        let mut left_constraints = node.constraints.clone();
        left_constraints.push(BranchConstraint {
            triple,
            side: BranchSide::Left,
        });
        match lp_model.solve_lp(&node.fixed_ones, &node.fixed_zeros, &left_constraints) {
            None => {
                let mut leaf = blank_child(&node);
                leaf.is_infeasible = true;
                leaf.close();
                children.push(leaf);
            }
            Some(sol) => {
                let (rc_zeros, rc_ones) =
                    lp_model.reduced_cost_fixing(&node.fixed_ones, &node.fixed_zeros, &left_constraints, sol.objective, incumbent);
                let mut fixed_ones = node.fixed_ones.clone();
                let mut fixed_zeros = node.fixed_zeros.clone();
                fixed_ones.extend(rc_ones);
                fixed_zeros.extend(rc_zeros);

                let ones_vec: Vec<VarKey> = fixed_ones.iter().copied().collect();
                let zeros_vec: Vec<VarKey> = fixed_zeros.iter().copied().collect();
                let (implied_zeros, implied_ones) = left_implied(&ones_vec, &zeros_vec, triple);
                fixed_ones.extend(implied_ones);
                fixed_zeros.extend(implied_zeros);

                let left_graph = crate::reductions::reduce_triple(&node.graph, triple, root_graph);
                let left_heuristic = heuristic_run.run_combo(&left_graph, root_graph, isolated, opts);

                let child = SearchNode {
                    constraints: node.constraints.clone(),
                    graph: left_graph,
                    var_vals: sol.var_vals,
                    lower_bound: left_heuristic.lower_bound,
                    upper_bound: sol.objective,
                    fixed_ones,
                    fixed_zeros,
                    combo_communities: left_heuristic.partition,
                    closed: false,
                    is_integer: false,
                    is_infeasible: false,
                    level: node.level + 1,
                };
                children.push(child);
            }
        }
    }

    // Right branch: the constraint stays structurally necessary in
    // `right_graph` (only a weight penalty, not a merge), so it — plus any
    // right-implied constraints — is carried forward.
    {
        let mut right_constraints = node.constraints.clone();
        right_constraints.push(BranchConstraint {
            triple,
            side: BranchSide::Right,
        });
        match lp_model.solve_lp(&node.fixed_ones, &node.fixed_zeros, &right_constraints) {
            None => {
                let mut leaf = blank_child(&node);
                leaf.is_infeasible = true;
                leaf.close();
                children.push(leaf);
            }
            Some(sol) => {
                let (rc_zeros, rc_ones) =
                    lp_model.reduced_cost_fixing(&node.fixed_ones, &node.fixed_zeros, &right_constraints, sol.objective, incumbent);
                let mut fixed_ones = node.fixed_ones.clone();
                let mut fixed_zeros = node.fixed_zeros.clone();
                fixed_ones.extend(rc_ones);
                fixed_zeros.extend(rc_zeros);

                let zeros_vec: Vec<VarKey> = fixed_zeros.iter().copied().collect();
                let implied_constraints = right_implied(&zeros_vec, triple);
                right_constraints.extend(implied_constraints);

                let right_graph = crate::reductions::alter_weight(&node.graph, triple, root_graph);
                let right_heuristic = heuristic_run.run_combo(&right_graph, root_graph, isolated, opts);

                let child = SearchNode {
                    constraints: right_constraints,
                    graph: right_graph,
                    var_vals: sol.var_vals,
                    lower_bound: right_heuristic.lower_bound,
                    upper_bound: sol.objective,
                    fixed_ones,
                    fixed_zeros,
                    combo_communities: right_heuristic.partition,
                    closed: false,
                    is_integer: false,
                    is_infeasible: false,
                    level: node.level + 1,
                };
                children.push(child);
            }
        }
    }

    children
}

fn blank_child(node: &SearchNode) -> SearchNode {
    SearchNode {
        constraints: node.constraints.clone(),
        graph: node.graph.clone(),
        var_vals: BTreeMap::new(),
        lower_bound: node.lower_bound,
        upper_bound: node.lower_bound,
        fixed_ones: node.fixed_ones.clone(),
        fixed_zeros: node.fixed_zeros.clone(),
        combo_communities: node.combo_communities.clone(),
        closed: false,
        is_integer: false,
        is_infeasible: false,
        level: node.level + 1,
    }
}

/// Rebuild connected components of the positive-edge, `x_uv≈0` subgraph and
/// force every pair inside one onto the same cluster, absorbing any
/// fractional noise left over from the IP solve (spec.md §4.H
/// `post_processing`).
fn post_processing(graph: &WorkingGraph, var_vals: &BTreeMap<VarKey, f64>) -> (Partition, f64) {
    let n = graph.num_vertices();
    let mut parent: Vec<usize> = (0..n).collect();

    // Iterative union-find with path compression (spec.md §9: no recursion
    // in `post_processing`).
    fn find(parent: &mut [usize], mut x: usize) -> usize {
        let mut root = x;
        while parent[root] != root {
            root = parent[root];
        }
        while parent[x] != root {
            let next = parent[x];
            parent[x] = root;
            x = next;
        }
        root
    }
    fn union(parent: &mut [usize], a: usize, b: usize) {
        let (ra, rb) = (find(parent, a), find(parent, b));
        if ra != rb {
            parent[ra] = rb;
        }
    }

    for (u, v, d) in graph.edges() {
        if d.weight <= 0.0 {
            continue;
        }
        if let Some(&x) = var_vals.get(&VarKey::new(u, v)) {
            if x.abs() < 1e-6 {
                union(&mut parent, u as usize, v as usize);
            }
        }
    }

    let mut groups: BTreeMap<usize, Vec<u32>> = BTreeMap::new();
    for v in 0..n {
        let root = find(&mut parent, v);
        groups.entry(root).or_default().push(v as u32);
    }

    let clusters: Vec<Vec<u32>> = groups
        .into_values()
        .map(|members| members.iter().flat_map(|&v| graph.super_node_of(v).0.iter().copied()).collect())
        .collect();
    let partition = Partition(clusters).canonicalize();
    let objective = objective_value(&partition, graph);
    (partition, objective)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_all_positive_yields_single_cluster() {
        let g = WorkingGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
        let out = troika(g, &TroikaOptions::default());
        assert_eq!(out.partition.clusters(), &[vec![0u32, 1, 2]]);
        assert!((out.lower_bound - 3.0).abs() < 1e-6);
    }

    #[test]
    fn all_negative_weights_yield_singletons() {
        let g = WorkingGraph::new(3, vec![(0, 1, -1.0), (1, 2, -1.0), (0, 2, -1.0)]).unwrap();
        let out = troika(g, &TroikaOptions::default());
        assert_eq!(out.partition.clusters().len(), 3);
        assert!(out.lower_bound.abs() < 1e-6);
    }

    #[test]
    fn empty_graph_returns_empty_partition() {
        let g = WorkingGraph::new(0, vec![]).unwrap();
        let out = troika(g, &TroikaOptions::default());
        assert!(out.partition.clusters().is_empty());
        assert_eq!(out.lower_bound, 0.0);
    }

    #[test]
    fn disconnected_pair_solved_as_separate_components() {
        let g = WorkingGraph::new(4, vec![(0, 1, 2.0), (2, 3, 2.0)]).unwrap();
        let out = troika(g, &TroikaOptions::default());
        assert!(out.partition.is_valid_cover(4));
        assert!((out.lower_bound - 4.0).abs() < 1e-6);
    }
}
