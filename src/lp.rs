//! LP/IP builder (spec.md §4.C): one continuous variable `x_{ij} ∈ [0,1]`
//! per unordered vertex pair, triangle-inequality cuts over the static
//! cut-triad pool, and the relaxation/binary re-solve used at every branch.
//!
//! The original wraps a single long-lived solver handle and toggles
//! variable bounds in place between calls. `good_lp` has no such
//! incremental-solve API, so `LpModel` instead holds the *inputs* that are
//! invariant across the whole search (the root graph and its triad pool)
//! and rebuilds a fresh model from them on every [`LpModel::solve_lp`] /
//! [`LpModel::solve_ip`] call, parameterized by the caller's current
//! `fixed_ones` / `fixed_zeros` / branch-constraint stack. This keeps the
//! same conceptual "one formulation, many re-solves" shape while staying
//! inside what the crate's solver trait actually supports.

use std::collections::{BTreeMap, HashSet};

use good_lp::{variable, Expression, ProblemVariables, Solution, SolverModel, Variable};

use crate::graph::WorkingGraph;

/// A canonical LP variable key: always `u < v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarKey(pub u32, pub u32);

impl VarKey {
    pub fn new(a: u32, b: u32) -> Self {
        if a < b {
            VarKey(a, b)
        } else {
            VarKey(b, a)
        }
    }
}

/// A `==0` (left) or `>=2` (right) branch constraint over a triple's three
/// pair-variables (spec.md §3 "Search node" `constraints` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchConstraint {
    pub triple: [u32; 3],
    pub side: BranchSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSide {
    /// `x_ij + x_jk + x_ik == 0`: all three vertices in one cluster.
    Left,
    /// `x_ij + x_jk + x_ik >= 2`: at least one pair split.
    Right,
}

/// Result of one LP/IP solve: `None` is the Rust-native replacement for the
/// original's `(-1, -1)` infeasibility sentinel (spec.md §4.C, §7).
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub objective: f64,
    pub var_vals: BTreeMap<VarKey, f64>,
}

/// The static part of the root formulation: the graph it was built over
/// and its cut-triad pool. Re-solves never change either field.
pub struct LpModel {
    graph: WorkingGraph,
    triads: Vec<[u32; 3]>,
    threads: usize,
}

impl LpModel {
    pub fn new(graph: WorkingGraph, triads: Vec<[u32; 3]>, threads: usize) -> Self {
        Self {
            graph,
            triads,
            threads,
        }
    }

    pub fn graph(&self) -> &WorkingGraph {
        &self.graph
    }

    pub fn triads(&self) -> &[[u32; 3]] {
        &self.triads
    }

    /// Solve the continuous relaxation with `fixed_ones`/`fixed_zeros`
    /// bounds and the given branch-constraint stack applied.
    pub fn solve_lp(
        &self,
        fixed_ones: &HashSet<VarKey>,
        fixed_zeros: &HashSet<VarKey>,
        branch_stack: &[BranchConstraint],
    ) -> Option<LpSolution> {
        self.solve(fixed_ones, fixed_zeros, branch_stack, false)
    }

    /// Solve the binary relaxation (used once no violated triple remains,
    /// spec.md §4.E step 2).
    pub fn solve_ip(
        &self,
        fixed_ones: &HashSet<VarKey>,
        fixed_zeros: &HashSet<VarKey>,
        branch_stack: &[BranchConstraint],
    ) -> Option<LpSolution> {
        self.solve(fixed_ones, fixed_zeros, branch_stack, true)
    }

    fn solve(
        &self,
        fixed_ones: &HashSet<VarKey>,
        fixed_zeros: &HashSet<VarKey>,
        branch_stack: &[BranchConstraint],
        integer: bool,
    ) -> Option<LpSolution> {
        let g = &self.graph;
        let n = g.num_vertices();

        let mut vars_builder = ProblemVariables::new();
        let mut keys: Vec<VarKey> = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        let mut vars: BTreeMap<VarKey, Variable> = BTreeMap::new();
        for i in 0..n as u32 {
            for j in (i + 1)..n as u32 {
                let key = VarKey(i, j);
                let lb = if fixed_ones.contains(&key) { 1.0 } else { 0.0 };
                let ub = if fixed_zeros.contains(&key) { 0.0 } else { 1.0 };
                let mut v = variable().min(lb).max(ub);
                if integer {
                    v = v.integer();
                }
                let handle = vars_builder.add(v);
                vars.insert(key, handle);
                keys.push(key);
            }
        }

        let objective: Expression = g
            .edges()
            .map(|(u, v, d)| d.weight * (1.0 - vars[&VarKey::new(u, v)]))
            .sum();

        // `self.threads` mirrors the original's `Threads` solver parameter
        // (spec.md §4.C); `good_lp`'s portable `SolverModel` trait has no
        // uniform way to set it across backends, so it is carried on
        // `LpModel` for callers/backends that can honor it directly but not
        // applied here (see DESIGN.md).
        let _ = self.threads;
        let mut model = vars_builder.maximise(objective).using(good_lp::default_solver);

        for &[i, j, k] in &self.triads {
            let e_ij = g.edge(i, j);
            let e_ik = g.edge(i, k);
            let e_jk = g.edge(j, k);
            let positive = |e: Option<crate::graph::EdgeData>| e.map(|d| d.weight > 0.0).unwrap_or(false);

            let x_ij = vars[&VarKey::new(i, j)];
            let x_ik = vars[&VarKey::new(i, k)];
            let x_jk = vars[&VarKey::new(j, k)];

            if positive(e_ik) || positive(e_jk) {
                model = model.with((x_ik + x_jk).geq(x_ij));
            }
            if positive(e_jk) || positive(e_ij) {
                model = model.with((x_jk + x_ij).geq(x_ik));
            }
            if positive(e_ij) || positive(e_ik) {
                model = model.with((x_ij + x_ik).geq(x_jk));
            }
        }

        for constraint in branch_stack {
            let [i, j, k] = constraint.triple;
            let sum = vars[&VarKey::new(i, j)] + vars[&VarKey::new(j, k)] + vars[&VarKey::new(i, k)];
            model = match constraint.side {
                BranchSide::Left => model.with(sum.eq(0.0)),
                BranchSide::Right => model.with(sum.geq(2.0)),
            };
        }

        let solution = model.solve().ok()?;

        let var_vals: BTreeMap<VarKey, f64> = keys
            .iter()
            .map(|&key| (key, solution.value(vars[&key])))
            .collect();
        let raw_objective: f64 = g
            .edges()
            .map(|(u, v, d)| d.weight * (1.0 - var_vals[&VarKey::new(u, v)]))
            .sum();
        let objective = round8(raw_objective + g.self_loop_total());

        Some(LpSolution { objective, var_vals })
    }

    /// Reduced-cost extraction and fixing (spec.md §4.G): re-solves through
    /// `good_lp`'s `highs` backend directly rather than `default_solver`, so
    /// `HighsSolution::into_inner()` hands back the underlying
    /// `highs::Solution` with `.columns()`/`.dual_columns()` — `good_lp`'s
    /// portable `Solution` trait has no cross-solver way to expose duals.
    /// `objective` is the branch's LP optimum (`z_LP`), `incumbent` is the
    /// current best integer objective (`z*`); a variable at `1` is fixed to
    /// `1` when `z_LP - rc < z*`, one at `0` is fixed to `0` when
    /// `z_LP + rc < z*`. Returns `(fixed_to_zero, fixed_to_one)`. Other
    /// backends fall through to a no-op (no fixings derived, search stays
    /// correct, just loses this pruning).
    #[cfg(feature = "ilp-highs")]
    pub fn reduced_cost_fixing(
        &self,
        fixed_ones: &HashSet<VarKey>,
        fixed_zeros: &HashSet<VarKey>,
        branch_stack: &[BranchConstraint],
        objective: f64,
        incumbent: f64,
    ) -> (Vec<VarKey>, Vec<VarKey>) {
        use good_lp::solvers::highs::highs;

        let g = &self.graph;
        let n = g.num_vertices();

        let mut vars_builder = ProblemVariables::new();
        let mut keys: Vec<VarKey> = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        let mut vars: BTreeMap<VarKey, Variable> = BTreeMap::new();
        for i in 0..n as u32 {
            for j in (i + 1)..n as u32 {
                let key = VarKey(i, j);
                let lb = if fixed_ones.contains(&key) { 1.0 } else { 0.0 };
                let ub = if fixed_zeros.contains(&key) { 0.0 } else { 1.0 };
                let handle = vars_builder.add(variable().min(lb).max(ub));
                vars.insert(key, handle);
                keys.push(key);
            }
        }

        let lp_objective: Expression = g
            .edges()
            .map(|(u, v, d)| d.weight * (1.0 - vars[&VarKey::new(u, v)]))
            .sum();

        let mut model = vars_builder.maximise(lp_objective).using(highs);

        for &[i, j, k] in &self.triads {
            let e_ij = g.edge(i, j);
            let e_ik = g.edge(i, k);
            let e_jk = g.edge(j, k);
            let positive = |e: Option<crate::graph::EdgeData>| e.map(|d| d.weight > 0.0).unwrap_or(false);

            let x_ij = vars[&VarKey::new(i, j)];
            let x_ik = vars[&VarKey::new(i, k)];
            let x_jk = vars[&VarKey::new(j, k)];

            if positive(e_ik) || positive(e_jk) {
                model = model.with((x_ik + x_jk).geq(x_ij));
            }
            if positive(e_jk) || positive(e_ij) {
                model = model.with((x_jk + x_ij).geq(x_ik));
            }
            if positive(e_ij) || positive(e_ik) {
                model = model.with((x_ij + x_ik).geq(x_jk));
            }
        }

        for constraint in branch_stack {
            let [i, j, k] = constraint.triple;
            let sum = vars[&VarKey::new(i, j)] + vars[&VarKey::new(j, k)] + vars[&VarKey::new(i, k)];
            model = match constraint.side {
                BranchSide::Left => model.with(sum.eq(0.0)),
                BranchSide::Right => model.with(sum.geq(2.0)),
            };
        }

        let Ok(solution) = model.solve() else {
            return (Vec::new(), Vec::new());
        };
        let highs_solution = solution.into_inner();
        let values = highs_solution.columns();
        let reduced_costs = highs_solution.dual_columns();

        let mut fix_to_one = Vec::new();
        let mut fix_to_zero = Vec::new();
        for (idx, &key) in keys.iter().enumerate() {
            let value = values[idx];
            let rc = reduced_costs[idx];
            if value > 0.5 {
                if objective - rc < incumbent {
                    fix_to_one.push(key);
                }
            } else if objective + rc < incumbent {
                fix_to_zero.push(key);
            }
        }
        (fix_to_zero, fix_to_one)
    }

    #[cfg(not(feature = "ilp-highs"))]
    pub fn reduced_cost_fixing(
        &self,
        _fixed_ones: &HashSet<VarKey>,
        _fixed_zeros: &HashSet<VarKey>,
        _branch_stack: &[BranchConstraint],
        _objective: f64,
        _incumbent: f64,
    ) -> (Vec<VarKey>, Vec<VarKey>) {
        (Vec::new(), Vec::new())
    }
}

/// Round to 8 decimals, matching the original's `np.round(..., 8)` calls
/// throughout the objective-value plumbing.
pub fn round8(x: f64) -> f64 {
    (x * 1e8).round() / 1e8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_key_canonicalizes_order() {
        assert_eq!(VarKey::new(3, 1), VarKey::new(1, 3));
        assert_eq!(VarKey::new(3, 1), VarKey(1, 3));
    }

    #[test]
    fn triangle_all_positive_solves_integer_at_zero() {
        // all three x_ij pinned to 0 (same cluster) is feasible and optimal
        // when every edge is positive: objective collapses to the full sum.
        let g = WorkingGraph::new(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]).unwrap();
        let model = LpModel::new(g, vec![[0, 1, 2]], 1);
        let sol = model
            .solve_lp(&HashSet::new(), &HashSet::new(), &[])
            .expect("root LP must be feasible");
        assert!((sol.objective - 3.0).abs() < 1e-6);
    }

    #[test]
    fn fixed_zero_pins_variable_to_zero() {
        let g = WorkingGraph::new(2, vec![(0, 1, 5.0)]).unwrap();
        let model = LpModel::new(g, vec![], 1);
        let mut zeros = HashSet::new();
        zeros.insert(VarKey(0, 1));
        let sol = model.solve_lp(&HashSet::new(), &zeros, &[]).unwrap();
        assert_eq!(sol.var_vals[&VarKey(0, 1)], 0.0);
    }

    #[test]
    fn left_branch_constraint_forces_zero_sum() {
        let g = WorkingGraph::new(3, vec![(0, 1, -1.0), (1, 2, -1.0), (0, 2, -1.0)]).unwrap();
        let model = LpModel::new(g, vec![[0, 1, 2]], 1);
        let branch = [BranchConstraint {
            triple: [0, 1, 2],
            side: BranchSide::Left,
        }];
        let sol = model.solve_lp(&HashSet::new(), &HashSet::new(), &branch).unwrap();
        let sum = sol.var_vals[&VarKey(0, 1)] + sol.var_vals[&VarKey(1, 2)] + sol.var_vals[&VarKey(0, 2)];
        assert!(sum.abs() < 1e-6);
    }
}
