use crate::output::{fmt_dim, fmt_section, OutputConfig};
use anyhow::Result;
use std::path::Path;
use troika::config::TroikaOptions;

#[allow(clippy::too_many_arguments)]
pub fn solve(
    input: &Path,
    threshold: f64,
    time_limit: f64,
    lp_method: i32,
    threads: Option<usize>,
    develop: bool,
    out: &OutputConfig,
) -> Result<()> {
    let graph = crate::graphio::load(input)?;

    let mut opts = TroikaOptions {
        global_threshold: threshold,
        time_allowed: time_limit,
        lp_method,
        develop_mode: develop,
        ..TroikaOptions::default()
    };
    if let Some(t) = threads {
        opts.threads = t;
    }

    let result = troika::troika(graph, &opts);

    let clusters: Vec<&Vec<u32>> = result.partition.clusters().iter().collect();
    let mut human = format!(
        "{}\n  objective (lower bound): {}\n  clusters:                {}\n",
        fmt_section("Troika solve"),
        result.lower_bound,
        clusters.len(),
    );
    for (idx, cluster) in clusters.iter().enumerate() {
        human.push_str(&format!("    {idx}: {cluster:?}\n"));
    }
    if develop {
        human.push_str(&format!(
            "  {}\n    state:           {}\n    upper bound:     {}\n    gap:             {:.6}\n    preprocessing:   {:.3}s\n    formulation:     {:.3}s\n    solve:           {:.3}s\n",
            fmt_dim("develop"),
            result.state.code(),
            result.upper_bound,
            result.gap(),
            result.timings.preprocessing_time,
            result.timings.formulation_time,
            result.timings.solve_time,
        ));
    }

    let mut json = serde_json::json!({
        "lower_bound": result.lower_bound,
        "gap": result.gap(),
        "partition": result.partition.clusters(),
        "modeling_time": result.timings.preprocessing_time + result.timings.formulation_time,
        "solve_time": result.timings.solve_time,
    });
    if develop {
        json["state"] = serde_json::json!(result.state.code());
        json["upper_bound"] = serde_json::json!(result.upper_bound);
        json["preprocessing_time"] = serde_json::json!(result.timings.preprocessing_time);
        json["formulation_time"] = serde_json::json!(result.timings.formulation_time);
    }

    out.emit(human.trim_end(), &json)?;
    if out.output.is_none() && crate::output::stderr_is_tty() {
        eprintln!("\nHint: use -o to save the full solution as JSON.");
    }
    Ok(())
}
