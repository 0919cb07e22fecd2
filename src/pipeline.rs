use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::dataset;
use crate::layout::DataLayout;
use crate::round_file;
use crate::team_stats;

/// What happened to a single round index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Missing,
    NoEvents,
    Malformed(String),
    /// The input parsed but its round CSV could not be written.
    WriteFailed(String),
    Extracted {
        league: String,
        path: PathBuf,
        rows: usize,
        postponed: usize,
    },
}

#[derive(Debug, Clone)]
pub struct LeagueSummary {
    pub league: String,
    pub rounds_merged: usize,
    pub rows_merged: usize,
    pub teams_ranked: usize,
    pub dataset_path: PathBuf,
    pub stats_path: PathBuf,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub data_root: PathBuf,
    pub rounds_total: u32,
    pub rounds_found: usize,
    pub rounds_extracted: usize,
    pub rows_written: usize,
    pub leagues: Vec<LeagueSummary>,
    pub errors: Vec<String>,
}

/// Extracts one round file into its league's round CSV.
pub fn process_round(layout: &DataLayout, round: u32, cfg: &RunConfig) -> RoundOutcome {
    let json_path = layout.round_json(round);
    if !json_path.is_file() {
        return RoundOutcome::Missing;
    }

    let dump = match round_file::read_round_json(&json_path) {
        Ok(dump) => dump,
        Err(err) => return RoundOutcome::Malformed(format!("{err:#}")),
    };
    if dump.events.is_empty() {
        return RoundOutcome::NoEvents;
    }
    let league = match round_file::round_league(&dump) {
        Ok(league) => league,
        Err(err) => return RoundOutcome::Malformed(format!("{err:#}")),
    };

    let records = round_file::extract_matches(&dump, cfg.clock);
    let path = layout.round_csv(&league, round);
    if let Err(err) = round_file::write_round_csv(&path, &records) {
        return RoundOutcome::WriteFailed(format!("{err:#}"));
    }

    RoundOutcome::Extracted {
        league,
        path,
        rows: records.len(),
        postponed: dump.events.len() - records.len(),
    }
}

/// Merges and aggregates one league from whatever round files it has on disk.
pub fn rebuild_league(layout: &DataLayout, league: &str, threshold: i64) -> Result<LeagueSummary> {
    let merge = dataset::merge_league(layout, league)?;
    let stats = team_stats::aggregate_league(layout, league, threshold)?;
    Ok(LeagueSummary {
        league: league.to_string(),
        rounds_merged: merge.rounds_merged,
        rows_merged: merge.rows,
        teams_ranked: stats.len(),
        dataset_path: merge.dataset_path,
        stats_path: layout.stats_csv(league),
        errors: merge.errors,
    })
}

pub fn run(cfg: &RunConfig) -> Result<RunSummary> {
    if !cfg.data_root.is_dir() {
        return Err(anyhow!(
            "data root {} is not a directory",
            cfg.data_root.display()
        ));
    }
    let layout = DataLayout::new(&cfg.data_root);

    let mut rounds_found = 0usize;
    let mut rounds_extracted = 0usize;
    let mut rows_written = 0usize;
    let mut leagues: Vec<String> = Vec::new();
    let mut errors = Vec::new();

    for round in 1..=cfg.max_round {
        match process_round(&layout, round, cfg) {
            RoundOutcome::Missing => continue,
            RoundOutcome::NoEvents => {
                rounds_found += 1;
                warn!(round, "no events found, skipping round");
            }
            RoundOutcome::Malformed(reason) => {
                rounds_found += 1;
                warn!(round, error = %reason, "skipping malformed round");
                errors.push(format!("round {round}: {reason}"));
            }
            RoundOutcome::WriteFailed(reason) => {
                rounds_found += 1;
                warn!(round, error = %reason, "round csv write failed");
                errors.push(format!("round {round}: write failed: {reason}"));
            }
            RoundOutcome::Extracted {
                league,
                path,
                rows,
                postponed,
            } => {
                rounds_found += 1;
                rounds_extracted += 1;
                rows_written += rows;
                debug!(round, league = %league, path = %path.display(), rows, postponed, "round extracted");
                if !leagues.contains(&league) {
                    leagues.push(league);
                }
            }
        }
    }

    let mut league_summaries = Vec::with_capacity(leagues.len());
    for league in &leagues {
        match rebuild_league(&layout, league, cfg.threshold) {
            Ok(summary) => {
                info!(
                    league = %league,
                    rounds = summary.rounds_merged,
                    rows = summary.rows_merged,
                    teams = summary.teams_ranked,
                    "league stats written"
                );
                errors.extend(summary.errors.iter().cloned());
                league_summaries.push(summary);
            }
            Err(err) => {
                warn!(league = %league, error = %format!("{err:#}"), "league rebuild failed");
                errors.push(format!("{league}: {err:#}"));
            }
        }
    }

    Ok(RunSummary {
        data_root: cfg.data_root.clone(),
        rounds_total: cfg.max_round,
        rounds_found,
        rounds_extracted,
        rows_written,
        leagues: league_summaries,
        errors,
    })
}
