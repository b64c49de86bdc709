//! Run configuration for the Troika solver.

/// Tunables for one `troika` invocation (spec.md §6 entry point parameters).
#[derive(Debug, Clone)]
pub struct TroikaOptions {
    /// Relative optimality gap target, e.g. `1e-3`.
    pub global_threshold: f64,
    /// Wall-clock budget in seconds (soft: checked between tree levels).
    pub time_allowed: f64,
    /// Opaque LP method selector, passed through to the underlying solver
    /// (mirrors Gurobi's `Method` parameter in the original implementation;
    /// `good_lp`'s HiGHS backend ignores the exact value but the field is
    /// kept so callers can carry method-selection intent through).
    pub lp_method: i32,
    /// When true, `troika` returns the richer develop-mode result (state
    /// code, both bounds, and timing breakdown) instead of the production
    /// tuple shape.
    pub develop_mode: bool,
    /// Cap on LP-solver internal threads: `min(64, available_parallelism)`
    /// unless overridden.
    pub threads: usize,
    /// Timeout for the first speculative `start_separate=true` heuristic
    /// probe (spec.md §4.D), in seconds.
    pub heuristic_probe_timeout: f64,
    /// Timeout for subsequent heuristic calls once `start_separate=true`
    /// has been cached, in seconds.
    pub heuristic_cached_timeout: f64,
}

impl TroikaOptions {
    fn default_threads() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(64)
    }
}

impl Default for TroikaOptions {
    fn default() -> Self {
        Self {
            global_threshold: 1e-3,
            time_allowed: 600.0,
            lp_method: 4,
            develop_mode: false,
            threads: Self::default_threads(),
            heuristic_probe_timeout: 3.0,
            heuristic_cached_timeout: 600.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threads_capped_at_64() {
        assert!(TroikaOptions::default().threads <= 64);
    }
}
