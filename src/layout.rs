use std::path::{Path, PathBuf};

const CSV_DIR: &str = "csv";
const STATS_FILE: &str = "Goal_Stats.csv";

/// Directory-safe form of a league name: spaces become underscores.
pub fn league_safe_name(league: &str) -> String {
    league.replace(' ', "_")
}

/// Resolves every input and output path from one data root.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn round_json(&self, round: u32) -> PathBuf {
        self.root.join(format!("round_{round}.json"))
    }

    pub fn league_dir(&self, league: &str) -> PathBuf {
        self.root.join(CSV_DIR).join(league_safe_name(league))
    }

    pub fn round_csv(&self, league: &str, round: u32) -> PathBuf {
        let safe = league_safe_name(league);
        self.league_dir(league)
            .join(format!("{safe}_round_{round}.csv"))
    }

    pub fn dataset_csv(&self, league: &str) -> PathBuf {
        let safe = league_safe_name(league);
        self.league_dir(league).join(format!("{safe}.csv"))
    }

    pub fn stats_csv(&self, league: &str) -> PathBuf {
        self.league_dir(league).join(STATS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_paths_use_safe_name() {
        let layout = DataLayout::new("/data");
        assert_eq!(league_safe_name("Serie A"), "Serie_A");
        assert_eq!(
            layout.round_csv("Serie A", 7),
            PathBuf::from("/data/csv/Serie_A/Serie_A_round_7.csv")
        );
        assert_eq!(
            layout.dataset_csv("Serie A"),
            PathBuf::from("/data/csv/Serie_A/Serie_A.csv")
        );
        assert_eq!(
            layout.stats_csv("Serie A"),
            PathBuf::from("/data/csv/Serie_A/Goal_Stats.csv")
        );
        assert_eq!(layout.round_json(12), PathBuf::from("/data/round_12.json"));
    }
}
