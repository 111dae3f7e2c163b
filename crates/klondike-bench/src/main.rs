use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser};

use klondike_bench::config::BenchmarkConfig;
use klondike_bench::logging::init_logging;
use klondike_bench::runner::{BenchRunner, RunSummary};

/// Plays seeded Klondike deals with every configured strategy and reports
/// win counts, foundation progress and per-move latency.
#[derive(Debug, Parser)]
#[command(name = "klondike-bench", version, about = "Klondike autoplay strategy benchmark")]
struct Cli {
    /// YAML file describing deals, agents, limits and outputs.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    #[command(flatten)]
    overrides: Overrides,

    /// Check the configuration and agent parameters, then stop before dealing.
    #[arg(long)]
    validate_only: bool,
}

/// Command-line values that win over the YAML file.
#[derive(Debug, Default, Args)]
struct Overrides {
    /// Label for this run; fills `{run_id}` in output paths.
    #[arg(long, value_name = "ID")]
    run_id: Option<String>,

    /// Number of deals each agent plays.
    #[arg(long, value_name = "N")]
    games: Option<usize>,

    /// Seed for the deal sequence; every agent sees the same deals.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Moves after which an unfinished game is recorded as `move_limit`.
    #[arg(long, value_name = "N")]
    max_moves: Option<usize>,

    /// Log every scored tree node (sets KLD_DEBUG_LOGS=1).
    #[arg(long)]
    log_search_details: bool,
}

impl Overrides {
    fn apply(self, config: &mut BenchmarkConfig) {
        if let Some(run_id) = self.run_id {
            config.run_id = run_id;
        }
        if let Some(games) = self.games {
            config.deals.games = games;
        }
        if self.seed.is_some() {
            config.deals.seed = self.seed;
        }
        if let Some(max_moves) = self.max_moves {
            config.limits.max_moves = max_moves;
        }
        config.logging.search_details |= self.log_search_details;
    }
}

fn main() -> anyhow::Result<()> {
    let Cli {
        config: config_path,
        overrides,
        validate_only,
    } = Cli::parse();

    let mut config = BenchmarkConfig::from_path(&config_path)?;
    overrides.apply(&mut config);
    config.validate()?;

    let outputs = config.resolved_outputs();
    let runner = BenchRunner::new(config.clone(), outputs.clone())?;
    println!(
        "Run '{}': {} agent(s) x {} deal(s), move limit {}",
        config.run_id,
        config.agents.len(),
        config.deals.games,
        config.limits.max_moves
    );

    if validate_only {
        println!("Validation-only mode: configuration accepted, no deals played.");
        return Ok(());
    }

    let _telemetry = init_logging(&config.logging, &outputs, &config.run_id)
        .context("setting up structured logging")?;
    let summary = runner.run()?;
    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    println!(
        "Played {} deal(s) with {} agent(s); {} row(s) in {}",
        summary.games_played,
        summary.agents,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    for (agent, wins) in &summary.wins {
        let rate = if summary.games_played == 0 {
            0.0
        } else {
            100.0 * *wins as f64 / summary.games_played as f64
        };
        println!("  {agent:<16} {wins:>5} won ({rate:.1}%)");
    }
    println!("Markdown summary: {}", summary.summary_path.display());
    if let Some(path) = &summary.telemetry_path {
        println!("Telemetry: {}", path.display());
    }
}
