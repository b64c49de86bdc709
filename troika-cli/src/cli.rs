use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "troika",
    about = "Exact branch-and-bound solver for the weighted clique partitioning problem",
    version,
    after_help = "\
Input: an edge-list file (`u v weight` per line, 0-indexed) or a JSON file
`{\"n\": <count>, \"edges\": [[u, v, weight], ...]}`. Use - to read from stdin.

Examples:
  troika graph.edges
  troika graph.json --threshold 1e-4 --time-limit 60
  troika graph.edges -o solution.json
  troika graph.edges --develop        # print solver state and both bounds

Output: the partition and its objective value as human text, or as JSON
when -o is given."
)]
pub struct Cli {
    /// Graph file (edge-list or JSON). Use - for stdin.
    pub input: PathBuf,

    /// Output file path (implies JSON output).
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Relative optimality gap target.
    #[arg(long, default_value = "0.001")]
    pub threshold: f64,

    /// Wall-clock budget in seconds.
    #[arg(long = "time-limit", default_value = "600.0")]
    pub time_limit: f64,

    /// Opaque LP method selector passed through to the underlying solver.
    #[arg(long = "lp-method", default_value = "4")]
    pub lp_method: i32,

    /// Cap on LP-solver internal threads.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Print the solver state code and both bounds instead of the
    /// production-mode summary.
    #[arg(long)]
    pub develop: bool,

    /// Suppress informational messages on stderr.
    #[arg(long, short)]
    pub quiet: bool,
}
