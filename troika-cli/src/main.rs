mod cli;
mod commands;
mod graphio;
mod output;

use clap::Parser;
use cli::Cli;
use output::OutputConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let out = OutputConfig {
        output: cli.output,
    };

    commands::solve::solve(
        &cli.input,
        cli.threshold,
        cli.time_limit,
        cli.lp_method,
        cli.threads,
        cli.develop,
        &out,
    )
}
