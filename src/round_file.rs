use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use crate::config::KickoffClock;

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_SCORE: &str = "-";
pub const POSTPONED_STATUS: &str = "Postponed";

pub const ROUND_HEADERS: [&str; 7] = [
    "Date",
    "Time",
    "Home Team",
    "Away Team",
    "Home Goals",
    "Away Goals",
    "Status",
];

/// Raw contents of one `round_<n>.json` dump.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoundDump {
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub tournament: Option<RawTournament>,
    #[serde(default)]
    pub home_team: Option<RawTeam>,
    #[serde(default)]
    pub away_team: Option<RawTeam>,
    #[serde(default)]
    pub home_score: Option<RawScore>,
    #[serde(default)]
    pub away_score: Option<RawScore>,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(default)]
    pub start_timestamp: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTournament {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeam {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawScore {
    // Providers occasionally send strings or null here.
    pub current: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStatus {
    pub description: Option<String>,
}

/// One flattened match row of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub date: String,
    pub time: String,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: Option<i64>,
    pub away_goals: Option<i64>,
    pub status: String,
}

impl MatchRecord {
    fn to_row(&self) -> [String; 7] {
        [
            self.date.clone(),
            self.time.clone(),
            self.home_team.clone(),
            self.away_team.clone(),
            score_cell(self.home_goals),
            score_cell(self.away_goals),
            self.status.clone(),
        ]
    }
}

fn score_cell(goals: Option<i64>) -> String {
    goals
        .map(|g| g.to_string())
        .unwrap_or_else(|| UNKNOWN_SCORE.to_string())
}

pub fn read_round_json(path: &Path) -> Result<RoundDump> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read round {}", path.display()))?;
    parse_round_json(&raw)
}

pub fn parse_round_json(raw: &str) -> Result<RoundDump> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(RoundDump::default());
    }
    serde_json::from_str(trimmed).context("invalid round json")
}

/// League a round belongs to, taken from its first event.
pub fn round_league(dump: &RoundDump) -> Result<String> {
    let first = dump
        .events
        .first()
        .ok_or_else(|| anyhow!("round has no events"))?;
    first
        .tournament
        .as_ref()
        .and_then(|t| t.name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("first event has no tournament name"))
}

pub fn extract_matches(dump: &RoundDump, clock: KickoffClock) -> Vec<MatchRecord> {
    dump.events
        .iter()
        .filter_map(|event| extract_match(event, clock))
        .collect()
}

fn extract_match(event: &RawEvent, clock: KickoffClock) -> Option<MatchRecord> {
    let status = event
        .status
        .as_ref()
        .and_then(|s| s.description.clone())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());
    if status == POSTPONED_STATUS {
        return None;
    }

    let (date, time) = clock.format(kickoff_timestamp(event.start_timestamp.as_ref()));
    Some(MatchRecord {
        date,
        time,
        home_team: team_name(event.home_team.as_ref()),
        away_team: team_name(event.away_team.as_ref()),
        home_goals: current_score(event.home_score.as_ref()),
        away_goals: current_score(event.away_score.as_ref()),
        status,
    })
}

fn team_name(team: Option<&RawTeam>) -> String {
    team.and_then(|t| t.name.clone())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

fn kickoff_timestamp(raw: Option<&Value>) -> i64 {
    let Some(Value::Number(n)) = raw else {
        return 0;
    };
    n.as_i64()
        .or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        })
        .unwrap_or(0)
}

fn current_score(score: Option<&RawScore>) -> Option<i64> {
    match score?.current.as_ref()? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Writes one round's rows, replacing any previous file at `path`.
pub fn write_round_csv(path: &Path, records: &[MatchRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create league dir {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create round csv {}", path.display()))?;
    writer
        .write_record(ROUND_HEADERS)
        .context("write round header")?;
    for record in records {
        writer.write_record(record.to_row()).context("write round row")?;
    }
    writer.flush().context("flush round csv")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND: &str = r#"{
        "events": [
            {
                "tournament": {"name": "Serie A"},
                "homeTeam": {"name": "Inter"},
                "awayTeam": {"name": "Milan"},
                "homeScore": {"current": 2},
                "awayScore": {"current": 1},
                "status": {"description": "Ended"},
                "startTimestamp": 1710013500
            },
            {
                "tournament": {"name": "Serie A"},
                "homeTeam": {"name": "Roma"},
                "awayTeam": {"name": "Lazio"},
                "homeScore": {},
                "awayScore": {},
                "status": {"description": "Postponed"},
                "startTimestamp": 1710013500
            },
            {
                "tournament": {"name": "Serie A"},
                "awayTeam": {"name": "Napoli"},
                "homeScore": {"current": "3"},
                "awayScore": {"current": null}
            }
        ]
    }"#;

    #[test]
    fn postponed_matches_are_dropped() {
        let dump = parse_round_json(ROUND).expect("fixture should parse");
        let rows = extract_matches(&dump, KickoffClock::Utc);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status != POSTPONED_STATUS));
        assert!(rows.iter().all(|r| r.home_team != "Roma"));
    }

    #[test]
    fn missing_fields_fall_back_to_unknown() {
        let dump = parse_round_json(ROUND).expect("fixture should parse");
        let rows = extract_matches(&dump, KickoffClock::Utc);
        let sparse = &rows[1];
        assert_eq!(sparse.home_team, UNKNOWN_NAME);
        assert_eq!(sparse.away_team, "Napoli");
        assert_eq!(sparse.home_goals, Some(3));
        assert_eq!(sparse.away_goals, None);
        assert_eq!(sparse.status, UNKNOWN_NAME);
        assert_eq!(sparse.date, "01/01/1970");
        assert_eq!(sparse.time, "00:00");
    }

    #[test]
    fn full_event_is_flattened() {
        let dump = parse_round_json(ROUND).expect("fixture should parse");
        let rows = extract_matches(&dump, KickoffClock::Utc);
        assert_eq!(
            rows[0],
            MatchRecord {
                date: "09/03/2024".to_string(),
                time: "19:45".to_string(),
                home_team: "Inter".to_string(),
                away_team: "Milan".to_string(),
                home_goals: Some(2),
                away_goals: Some(1),
                status: "Ended".to_string(),
            }
        );
        assert_eq!(round_league(&dump).unwrap(), "Serie A");
    }

    #[test]
    fn float_and_odd_timestamps_do_not_reject_the_round() {
        let raw = r#"{"events": [
            {"tournament": {"name": "Serie A"}, "homeTeam": {"name": "Inter"},
             "awayTeam": {"name": "Milan"}, "homeScore": {"current": 1},
             "awayScore": {"current": 0}, "status": {"description": "Ended"},
             "startTimestamp": 1710013500.0},
            {"tournament": {"name": "Serie A"}, "homeTeam": {"name": "Roma"},
             "awayTeam": {"name": "Lazio"}, "status": {"description": "Ended"},
             "startTimestamp": "soon"}
        ]}"#;
        let dump = parse_round_json(raw).expect("float timestamp should parse");
        let rows = extract_matches(&dump, KickoffClock::Utc);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "09/03/2024");
        assert_eq!(rows[0].time, "19:45");
        assert_eq!(rows[1].date, "01/01/1970");
        assert_eq!(rows[1].time, "00:00");
    }

    #[test]
    fn null_and_missing_events_are_empty() {
        assert!(parse_round_json("null").unwrap().events.is_empty());
        assert!(parse_round_json("{}").unwrap().events.is_empty());
        assert!(round_league(&RoundDump::default()).is_err());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_round_json("{\"events\": [").is_err());
        assert!(parse_round_json("{\"events\": 5}").is_err());
    }

    #[test]
    fn unknown_scores_are_written_as_dash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("round.csv");
        let dump = parse_round_json(ROUND).unwrap();
        write_round_csv(&path, &extract_matches(&dump, KickoffClock::Utc)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Date,Time,Home Team,Away Team,Home Goals,Away Goals,Status")
        );
        assert_eq!(
            lines.next(),
            Some("09/03/2024,19:45,Inter,Milan,2,1,Ended")
        );
        assert_eq!(
            lines.next(),
            Some("01/01/1970,00:00,Unknown,Napoli,3,-,Unknown")
        );
    }
}
