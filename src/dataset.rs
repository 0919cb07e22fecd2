use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::layout::{DataLayout, league_safe_name};

pub const DATASET_HEADERS: [&str; 5] = [
    "Home Team",
    "Away Team",
    "Home Goals",
    "Away Goals",
    "Total Goals",
];

/// A match reduced to teams and scores, plus the derived total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    pub home_team: String,
    pub away_team: String,
    pub home_goals: Option<i64>,
    pub away_goals: Option<i64>,
    pub total_goals: Option<i64>,
}

impl MergedRow {
    pub fn new(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        home_goals: Option<i64>,
        away_goals: Option<i64>,
    ) -> Self {
        let total_goals = match (home_goals, away_goals) {
            (Some(h), Some(a)) => h.checked_add(a),
            _ => None,
        };
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_goals,
            away_goals,
            total_goals,
        }
    }

    fn to_row(&self) -> [String; 5] {
        [
            self.home_team.clone(),
            self.away_team.clone(),
            goals_cell(self.home_goals),
            goals_cell(self.away_goals),
            goals_cell(self.total_goals),
        ]
    }
}

fn goals_cell(goals: Option<i64>) -> String {
    goals.map(|g| g.to_string()).unwrap_or_default()
}

/// Numeric coercion for a score cell. Integers and integral floats parse;
/// anything else is unknown.
pub fn parse_goals(cell: &str) -> Option<i64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    let f = trimmed.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

// Only the columns the merge keeps; the rest of a round file is ignored.
#[derive(Debug, Deserialize)]
struct RoundRow {
    #[serde(rename = "Home Team")]
    home_team: String,
    #[serde(rename = "Away Team")]
    away_team: String,
    #[serde(rename = "Home Goals", default)]
    home_goals: String,
    #[serde(rename = "Away Goals", default)]
    away_goals: String,
}

#[derive(Debug, Deserialize)]
struct DatasetRow {
    #[serde(rename = "Home Team")]
    home_team: String,
    #[serde(rename = "Away Team")]
    away_team: String,
    #[serde(rename = "Home Goals", default)]
    home_goals: String,
    #[serde(rename = "Away Goals", default)]
    away_goals: String,
    #[serde(rename = "Total Goals", default)]
    total_goals: String,
}

/// Round files of a league in round order.
pub fn discover_round_files(league_dir: &Path, league_safe: &str) -> Result<Vec<(u32, PathBuf)>> {
    let prefix = format!("{league_safe}_round_");
    let dir = league_dir
        .to_str()
        .ok_or_else(|| anyhow!("non-utf8 league dir {}", league_dir.display()))?;
    let pattern = Path::new(&glob::Pattern::escape(dir))
        .join(format!("{}*.csv", glob::Pattern::escape(&prefix)));

    let mut out = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy()).context("invalid round file pattern")? {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!(error = %err, "unreadable round file entry");
                continue;
            }
        };
        let Some(round) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_prefix(&prefix))
            .and_then(|s| s.parse::<u32>().ok())
        else {
            continue;
        };
        out.push((round, path));
    }
    out.sort_by_key(|(round, _)| *round);
    Ok(out)
}

pub fn read_round_rows(path: &Path) -> Result<Vec<MergedRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open round csv {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<RoundRow>() {
        let record = record.with_context(|| format!("bad row in {}", path.display()))?;
        rows.push(MergedRow::new(
            record.home_team,
            record.away_team,
            parse_goals(&record.home_goals),
            parse_goals(&record.away_goals),
        ));
    }
    Ok(rows)
}

pub fn merge_rows<I>(row_sets: I) -> Vec<MergedRow>
where
    I: IntoIterator<Item = Vec<MergedRow>>,
{
    row_sets.into_iter().flatten().collect()
}

pub fn write_dataset(path: &Path, rows: &[MergedRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create league dir {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create dataset {}", path.display()))?;
    writer
        .write_record(DATASET_HEADERS)
        .context("write dataset header")?;
    for row in rows {
        writer.write_record(row.to_row()).context("write dataset row")?;
    }
    writer.flush().context("flush dataset")?;
    Ok(())
}

/// Reads a consolidated dataset. Score cells are coerced the same way as on
/// merge; a stored total is re-read as-is rather than recomputed.
pub fn read_dataset(path: &Path) -> Result<Vec<MergedRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open dataset {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<DatasetRow>() {
        let record = record.with_context(|| format!("bad row in {}", path.display()))?;
        rows.push(MergedRow {
            home_team: record.home_team,
            away_team: record.away_team,
            home_goals: parse_goals(&record.home_goals),
            away_goals: parse_goals(&record.away_goals),
            total_goals: parse_goals(&record.total_goals),
        });
    }
    Ok(rows)
}

#[derive(Debug, Clone)]
pub struct MergeReport {
    pub league: String,
    pub dataset_path: PathBuf,
    pub rounds_merged: usize,
    pub rows: usize,
    pub errors: Vec<String>,
}

/// Concatenates every round file of `league` into its consolidated dataset.
pub fn merge_league(layout: &DataLayout, league: &str) -> Result<MergeReport> {
    let league_dir = layout.league_dir(league);
    let files = discover_round_files(&league_dir, &league_safe_name(league))?;

    let mut errors = Vec::new();
    let mut row_sets = Vec::with_capacity(files.len());
    for (round, path) in &files {
        match read_round_rows(path) {
            Ok(rows) => {
                debug!(league, round, rows = rows.len(), "round rows loaded");
                row_sets.push(rows);
            }
            Err(err) => {
                warn!(league, round, error = %format!("{err:#}"), "skipping unreadable round file");
                errors.push(format!("{league} round {round}: {err:#}"));
            }
        }
    }
    let rounds_merged = row_sets.len();
    let rows = merge_rows(row_sets);

    let dataset_path = layout.dataset_csv(league);
    write_dataset(&dataset_path, &rows)?;

    Ok(MergeReport {
        league: league.to_string(),
        dataset_path,
        rounds_merged,
        rows: rows.len(),
        errors,
    })
}
