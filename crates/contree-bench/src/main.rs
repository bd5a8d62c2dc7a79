use std::path::PathBuf;

use clap::Parser;

use contree_bench::config::{BenchmarkConfig, ResolvedOutputs};
use contree_bench::logging::init_logging;
use contree_bench::tournament::TournamentRunner;

/// Self-play harness for contrée bots.
#[derive(Debug, Parser)]
#[command(
    name = "contree-bench",
    author,
    version,
    about = "Deterministic contrée self-play harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for game seeds.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the score that ends a game.
    #[arg(long, value_name = "POINTS")]
    target_score: Option<u32>,

    /// Exit after validating the configuration (no game is played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    if let Some(target_score) = cli.target_score {
        config.games.target_score = target_score;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let target = config.games.target_score;

    println!(
        "Loaded configuration '{run_id}' with {} agents ({games} game{} to {target})",
        config.agents.len(),
        if games == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: no game played.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Self-play complete for '{run_id}': {} games, {} rounds → {} rows at {}",
        summary.games_played,
        summary.rounds_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Trace log: {}", guard.trace_path.display());
    }

    Ok(())
}
