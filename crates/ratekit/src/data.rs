use crate::goal::GoalProgress;
use crate::rating::Rating;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::path::Path;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

pub const DEFAULT_GOAL: Rating = Rating::new(1200);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ContestType {
    #[strum(to_string = "algorithm", serialize = "algo", serialize = "abc")]
    Algorithm,
    #[strum(to_string = "heuristic", serialize = "heur", serialize = "ahc")]
    Heuristic,
}

impl ContestType {
    /// Heuristic contests are recognised by their id.
    pub fn of(contest_id: &ContestId) -> Self {
        let id = contest_id.to_lowercase();
        if id.contains("ahc") || id.contains("marathon") {
            Self::Heuristic
        } else {
            Self::Algorithm
        }
    }
}

/// Which figure of a contest type a card shows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    #[default]
    #[strum(to_string = "current", serialize = "rating")]
    Current,
    #[strum(to_string = "highest", serialize = "max")]
    Highest,
    #[strum(to_string = "performance", serialize = "perf")]
    Performance,
}

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct Username(String);

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct ContestId(String);

crate::impl_string_newtype!(Username, ContestId);

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read rating data: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed rating data: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_rank() -> String {
    "-".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestStats {
    pub current: Rating,
    pub highest: Rating,
    #[serde(default)]
    pub highest_performance: Rating,
    #[serde(default)]
    pub contests: u32,
    #[serde(default = "default_rank")]
    pub rank: String,
    #[serde(default)]
    pub remaining: u32,
    #[serde(default)]
    pub achieved: bool,
}

impl ContestStats {
    pub fn stat(&self, stat: Stat) -> Rating {
        match stat {
            Stat::Current => self.current,
            Stat::Highest => self.highest,
            Stat::Performance => self.highest_performance,
        }
    }

    pub fn progress(&self, goal: Rating) -> GoalProgress {
        GoalProgress::new(self.current, goal)
    }

    fn with_goal(mut self, goal: Rating) -> Self {
        let progress = self.progress(goal);
        self.remaining = progress.remaining;
        self.achieved = progress.achieved;
        self
    }
}

/// Where the displayed numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum DataSource {
    #[strum(to_string = "latest data")]
    File,
    #[strum(to_string = "local fallback")]
    Fallback,
}

/// Contents of `atcoder-rating.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingData {
    pub username: Username,
    #[serde(default = "default_goal")]
    pub goal: Rating,
    #[serde(default)]
    pub last_updated: Option<String>,
    pub algorithm: ContestStats,
    pub heuristic: ContestStats,
}

fn default_goal() -> Rating {
    DEFAULT_GOAL
}

impl RatingData {
    pub fn stats(&self, contest: ContestType) -> &ContestStats {
        match contest {
            ContestType::Algorithm => &self.algorithm,
            ContestType::Heuristic => &self.heuristic,
        }
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = fs_err::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn load_or_fallback(path: &Path, username: Username, goal: Rating) -> (Self, DataSource) {
        match Self::load(path) {
            Ok(data) => (data, DataSource::File),
            Err(e) => {
                log::warn!("Using fallback rating data: {}", e);
                (Self::fallback(username, goal), DataSource::Fallback)
            }
        }
    }

    pub fn fallback(username: Username, goal: Rating) -> Self {
        Self {
            username,
            goal,
            last_updated: None,
            algorithm: fallback_stats(ContestType::Algorithm, 20).with_goal(goal),
            heuristic: fallback_stats(ContestType::Heuristic, 5).with_goal(goal),
        }
    }
}

fn fallback_stats(contest: ContestType, contests: u32) -> ContestStats {
    let (current, highest) = match contest {
        ContestType::Algorithm => (271, 288),
        ContestType::Heuristic => (1241, 1247),
    };
    ContestStats {
        current: Rating::new(current),
        highest: Rating::new(highest),
        highest_performance: Rating::ZERO,
        contests,
        rank: default_rank(),
        remaining: 0,
        achieved: false,
    }
}

/// One row of a contest history export, accepting both field spellings in
/// circulation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContestResult {
    #[serde(alias = "ContestScreenName", default)]
    pub contest_id: ContestId,
    #[serde(alias = "NewRating", default)]
    pub new_rating: Rating,
    #[serde(alias = "Performance", default)]
    pub performance: Rating,
    #[serde(alias = "Place", default)]
    pub place: Option<u32>,
}

/// Builds rating data from a chronological contest history.
pub fn parse_history(username: Username, goal: Rating, history: &[ContestResult]) -> RatingData {
    let summarize = |contest: ContestType, fallback_contests: u32| {
        let entries: Vec<_> = history
            .iter()
            .filter(|r| ContestType::of(&r.contest_id) == contest)
            .collect();

        let Some(latest) = entries.last() else {
            let mut stats = fallback_stats(contest, fallback_contests);
            stats.contests = 0;
            return stats.with_goal(goal);
        };

        ContestStats {
            current: latest.new_rating,
            highest: entries.iter().map(|r| r.new_rating).max().unwrap_or_default(),
            highest_performance: entries.iter().map(|r| r.performance).max().unwrap_or_default(),
            contests: entries.len() as u32,
            rank: latest.place.map_or_else(default_rank, |p| p.to_string()),
            remaining: 0,
            achieved: false,
        }
        .with_goal(goal)
    };

    RatingData {
        username,
        goal,
        last_updated: None,
        algorithm: summarize(ContestType::Algorithm, 20),
        heuristic: summarize(ContestType::Heuristic, 5),
    }
}
