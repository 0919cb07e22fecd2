use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use goal_tally::config::{KickoffClock, RunConfig};
use goal_tally::pipeline;

/// Turns per-round event dumps into per-league goal statistics.
#[derive(Debug, Parser)]
#[command(name = "goal_tally", version)]
struct Cli {
    /// Directory holding round_<n>.json files; outputs land in <root>/csv.
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Highest round index to look for.
    #[arg(long)]
    max_round: Option<u32>,

    /// Combined goals at or above which a match counts as high-scoring.
    #[arg(long)]
    threshold: Option<i64>,

    /// Render kickoff dates in UTC instead of local time.
    #[arg(long)]
    utc: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut cfg = RunConfig::from_env();
    if let Some(root) = cli.data_root {
        cfg.data_root = root;
    }
    if let Some(max_round) = cli.max_round {
        cfg.max_round = max_round.max(1);
    }
    if let Some(threshold) = cli.threshold {
        cfg.threshold = threshold;
    }
    if cli.utc {
        cfg.clock = KickoffClock::Utc;
    }

    let summary = pipeline::run(&cfg)?;

    println!("Goal stats complete");
    println!("Data root: {}", summary.data_root.display());
    println!(
        "Rounds: {} extracted, {} found, {} checked",
        summary.rounds_extracted, summary.rounds_found, summary.rounds_total
    );
    println!("Rows written: {}", summary.rows_written);
    for league in &summary.leagues {
        println!(
            "{}: rounds={} rows={} teams={} -> {}",
            league.league,
            league.rounds_merged,
            league.rows_merged,
            league.teams_ranked,
            league.stats_path.display()
        );
    }
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }

    Ok(())
}
