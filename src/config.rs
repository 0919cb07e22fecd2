use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};

pub const DEFAULT_MAX_ROUND: u32 = 38;
pub const DEFAULT_HIGH_SCORING_THRESHOLD: i64 = 3;

/// Which clock kickoff timestamps are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KickoffClock {
    #[default]
    Local,
    Utc,
}

impl KickoffClock {
    /// Splits a unix timestamp into `dd/mm/YYYY` and `HH:MM`. Out-of-range
    /// timestamps fall back to the epoch.
    pub fn format(self, timestamp: i64) -> (String, String) {
        let utc = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_default();
        match self {
            KickoffClock::Utc => (
                utc.format("%d/%m/%Y").to_string(),
                utc.format("%H:%M").to_string(),
            ),
            KickoffClock::Local => {
                let local = utc.with_timezone(&Local);
                (
                    local.format("%d/%m/%Y").to_string(),
                    local.format("%H:%M").to_string(),
                )
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_root: PathBuf,
    pub max_round: u32,
    pub threshold: i64,
    pub clock: KickoffClock,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            max_round: DEFAULT_MAX_ROUND,
            threshold: DEFAULT_HIGH_SCORING_THRESHOLD,
            clock: KickoffClock::Local,
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Self {
        let data_root = env::var("GOAL_TALLY_DATA_ROOT")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let max_round = env::var("GOAL_TALLY_MAX_ROUND")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_ROUND)
            .clamp(1, 500);
        let threshold = env::var("GOAL_TALLY_THRESHOLD")
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_HIGH_SCORING_THRESHOLD);
        let clock = if env_bool("GOAL_TALLY_UTC", false) {
            KickoffClock::Utc
        } else {
            KickoffClock::Local
        };

        Self {
            data_root,
            max_round,
            threshold,
            clock,
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}
