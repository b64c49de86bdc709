//! Shared result types: partitions and the two `troika` output shapes.

/// A partition of the original vertex set: sorted clusters, canonically
/// sorted as a list (spec.md §3 "Partition").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition(pub Vec<Vec<u32>>);

impl Partition {
    /// Canonicalize: sort each cluster, then sort the list of clusters.
    pub fn canonicalize(mut self) -> Self {
        for cluster in &mut self.0 {
            cluster.sort_unstable();
        }
        self.0.sort();
        self
    }

    pub fn clusters(&self) -> &[Vec<u32>] {
        &self.0
    }

    /// Every original vertex id in `0..n` appears in exactly one cluster.
    pub fn is_valid_cover(&self, n: usize) -> bool {
        let mut seen = vec![false; n];
        let mut total = 0usize;
        for cluster in &self.0 {
            for &v in cluster {
                let idx = v as usize;
                if idx >= n || seen[idx] {
                    return false;
                }
                seen[idx] = true;
                total += 1;
            }
        }
        total == n && seen.iter().all(|&s| s)
    }
}

/// Termination state codes (spec.md §4.H "Result state codes"); developer
/// diagnostics only, not part of the production output contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    /// Root heuristic/estimate gap already below threshold.
    HeuristicGapClosed = 0,
    /// Root LP relaxation was already integer.
    RootIntegerLp = 1,
    /// Root LP/heuristic gap already below threshold.
    RootLpGapClosed = 2,
    /// Wall clock exceeded mid-search; best known solution was integer.
    TimeoutIntegerIncumbent = 3,
    /// Wall clock exceeded mid-search; best known incumbent is not integer-proven.
    TimeoutFractionalIncumbent = 4,
    /// Wall clock exceeded mid-search; no integer incumbent yet.
    TimeoutNoIntegerIncumbent = 5,
    /// Search tree exhausted or gap closed; best known solution was integer.
    ExhaustedIntegerIncumbent = 6,
    /// Search tree exhausted or gap closed; best known incumbent not integer-proven.
    ExhaustedFractionalIncumbent = 7,
    /// Search tree exhausted or gap closed; no integer incumbent found.
    ExhaustedNoIntegerIncumbent = 8,
}

impl ResultState {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Timing breakdown returned by `troika` (spec.md §6).
#[derive(Debug, Clone, Copy, Default)]
pub struct Timings {
    pub preprocessing_time: f64,
    pub formulation_time: f64,
    pub solve_time: f64,
}

/// The result of one `troika` invocation.
///
/// Both output shapes from spec.md §6 are views onto this one struct:
/// production mode reads `lower_bound`, `gap()`, `partition`, and the
/// summed modeling/solve times; develop mode additionally reads
/// `state`/`upper_bound` and the full timing breakdown.
#[derive(Debug, Clone)]
pub struct TroikaOutput {
    pub state: ResultState,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub partition: Partition,
    pub timings: Timings,
}

impl TroikaOutput {
    /// Relative optimality gap; `0.0` when `upper_bound == 0.0` (matches the
    /// original implementation's guard against division by zero).
    pub fn gap(&self) -> f64 {
        if self.upper_bound == 0.0 {
            0.0
        } else {
            (self.upper_bound - self.lower_bound) / self.upper_bound
        }
    }

    /// Production-mode tuple: `(lower_bound, gap, partition, modeling_time, solve_time)`.
    pub fn production_tuple(&self) -> (f64, f64, &Partition, f64, f64) {
        (
            self.lower_bound,
            self.gap(),
            &self.partition,
            self.timings.preprocessing_time + self.timings.formulation_time,
            self.timings.solve_time,
        )
    }

    /// Develop-mode tuple: `(state_code, lower_bound, upper_bound, partition, preprocessing_time, formulation_time, solve_time)`.
    pub fn develop_tuple(&self) -> (u8, f64, f64, &Partition, f64, f64, f64) {
        (
            self.state.code(),
            self.lower_bound,
            self.upper_bound,
            &self.partition,
            self.timings.preprocessing_time,
            self.timings.formulation_time,
            self.timings.solve_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_sorts_clusters_and_their_contents() {
        let p = Partition(vec![vec![3, 1], vec![0]]).canonicalize();
        assert_eq!(p.0, vec![vec![0], vec![1, 3]]);
    }

    #[test]
    fn valid_cover_detects_missing_and_duplicate_vertices() {
        assert!(Partition(vec![vec![0, 1], vec![2]]).is_valid_cover(3));
        assert!(!Partition(vec![vec![0, 1]]).is_valid_cover(3));
        assert!(!Partition(vec![vec![0, 1], vec![1, 2]]).is_valid_cover(3));
    }

    #[test]
    fn gap_is_zero_when_upper_bound_is_zero() {
        let out = TroikaOutput {
            state: ResultState::ExhaustedNoIntegerIncumbent,
            lower_bound: 0.0,
            upper_bound: 0.0,
            partition: Partition(vec![]),
            timings: Timings::default(),
        };
        assert_eq!(out.gap(), 0.0);
    }
}
