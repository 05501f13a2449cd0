use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Recommendation, RunKey, SurveyAnswer};

/// Source of submitted survey answers.
pub trait SurveyAnswerSource: Send + Sync {
    /// Answers of one response in submission order; empty when none were recorded.
    fn answers(&self, key: &RunKey) -> Result<Vec<SurveyAnswer>, RepositoryError>;
}

/// Storage for recommendation runs. Every write covers exactly one run, header and
/// rows together, and must be applied atomically. A run that produced no rows is
/// still stored.
pub trait RecommendationRepository: Send + Sync {
    /// Drops every stored run for `key`, then stores `run`.
    fn replace(&self, key: &RunKey, run: StoredRun) -> Result<(), RepositoryError>;
    /// Stores `run` alongside earlier runs for `key`.
    fn append(&self, key: &RunKey, run: StoredRun) -> Result<(), RepositoryError>;
    /// The run with the highest number for `key`, or `None` before the first run.
    fn latest(&self, key: &RunKey) -> Result<Option<StoredRun>, RepositoryError>;
}

/// One completed run: its header plus the rows it produced, possibly none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRun {
    pub run: u64,
    pub computed_at: DateTime<Utc>,
    pub rows: Vec<Recommendation>,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

/// What happens to stored rows when a response is recommended again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerunPolicy {
    /// Keep only the newest run.
    #[default]
    Replace,
    /// Keep every run; readers only see the newest.
    Append,
}

impl RerunPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "replace" => Some(Self::Replace),
            "append" | "history" => Some(Self::Append),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RerunPolicy::Replace => "replace",
            RerunPolicy::Append => "append",
        }
    }
}

/// The run with the highest number in `runs`.
pub fn latest_run(runs: &[StoredRun]) -> Option<StoredRun> {
    runs.iter().max_by_key(|stored| stored.run).cloned()
}
