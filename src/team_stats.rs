use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::dataset::{self, MergedRow};
use crate::layout::DataLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStat {
    pub team_name: String,
    pub high_scoring_matches: u32,
    pub goals_scored: i64,
    pub goals_conceded: i64,
}

#[derive(Debug, Clone, Copy, Default)]
struct GoalTotals {
    scored: i64,
    conceded: i64,
}

// A row whose three score fields all survived coercion.
struct ScoredRow<'a> {
    home: &'a str,
    away: &'a str,
    home_goals: i64,
    away_goals: i64,
    total_goals: i64,
}

fn scored_rows(rows: &[MergedRow]) -> impl Iterator<Item = ScoredRow<'_>> {
    rows.iter().filter_map(|r| {
        Some(ScoredRow {
            home: &r.home_team,
            away: &r.away_team,
            home_goals: r.home_goals?,
            away_goals: r.away_goals?,
            total_goals: r.total_goals?,
        })
    })
}

/// Per-team high-scoring counts and goal totals, most high-scoring matches
/// first. Teams without a match at or above `threshold` are left out.
pub fn compute_team_stats(rows: &[MergedRow], threshold: i64) -> Vec<TeamStat> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let mut goals: HashMap<&str, GoalTotals> = HashMap::new();

    for row in scored_rows(rows) {
        if row.total_goals >= threshold {
            for team in [row.home, row.away] {
                let count = counts.entry(team).or_insert_with(|| {
                    order.push(team);
                    0
                });
                *count += 1;
            }
        }

        // Saturate: dataset cells can hold any i64.
        let home = goals.entry(row.home).or_default();
        home.scored = home.scored.saturating_add(row.home_goals);
        home.conceded = home.conceded.saturating_add(row.away_goals);
        let away = goals.entry(row.away).or_default();
        away.scored = away.scored.saturating_add(row.away_goals);
        away.conceded = away.conceded.saturating_add(row.home_goals);
    }

    let mut out: Vec<TeamStat> = order
        .into_iter()
        .map(|team| {
            let totals = goals.get(team).copied().unwrap_or_default();
            TeamStat {
                team_name: team.to_string(),
                high_scoring_matches: counts.get(team).copied().unwrap_or(0),
                goals_scored: totals.scored,
                goals_conceded: totals.conceded,
            }
        })
        .collect();

    // Stable: ties stay in first-encounter order.
    out.sort_by(|a, b| b.high_scoring_matches.cmp(&a.high_scoring_matches));
    out
}

pub fn stats_headers(threshold: i64) -> [String; 4] {
    [
        "Team".to_string(),
        format!("Matches Total Goals >= {threshold}"),
        "Goals Scored".to_string(),
        "Goals Conceded".to_string(),
    ]
}

pub fn write_team_stats(path: &Path, stats: &[TeamStat], threshold: i64) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create league dir {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create stats {}", path.display()))?;
    writer
        .write_record(stats_headers(threshold))
        .context("write stats header")?;
    for stat in stats {
        writer
            .write_record([
                stat.team_name.clone(),
                stat.high_scoring_matches.to_string(),
                stat.goals_scored.to_string(),
                stat.goals_conceded.to_string(),
            ])
            .context("write stats row")?;
    }
    writer.flush().context("flush stats")?;
    Ok(())
}

/// Recomputes the stats file of `league` from its consolidated dataset.
pub fn aggregate_league(layout: &DataLayout, league: &str, threshold: i64) -> Result<Vec<TeamStat>> {
    let rows = dataset::read_dataset(&layout.dataset_csv(league))?;
    let stats = compute_team_stats(&rows, threshold);
    write_team_stats(&layout.stats_csv(league), &stats, threshold)?;
    Ok(stats)
}
