use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Skeleton,
    Muscle,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Skeleton, Mode::Muscle];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "skeleton" => Some(Self::Skeleton),
            "muscle" => Some(Self::Muscle),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skeleton => "skeleton",
            Self::Muscle => "muscle",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque identifier assigned by the persistence layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player's best stored outcome for one mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub mode: Mode,
    pub player_name: String,
    pub score: i64,
    pub max_score: i64,
    pub duration_ms: i64,
    pub accuracy_percent: u8,
    pub created_at: DateTime<Utc>,
}

impl ResultRecord {
    /// Overwrites the merit fields with an accepted candidate, keeping the id.
    pub fn absorb(&mut self, candidate: &CandidateResult, accepted_at: DateTime<Utc>) {
        self.score = candidate.score;
        self.max_score = candidate.max_score;
        self.duration_ms = candidate.duration_ms;
        self.accuracy_percent = candidate.accuracy_percent;
        self.created_at = accepted_at;
    }

    pub fn as_candidate(&self) -> CandidateResult {
        CandidateResult {
            mode: self.mode,
            player_name: self.player_name.clone(),
            score: self.score,
            max_score: self.max_score,
            duration_ms: self.duration_ms,
            accuracy_percent: self.accuracy_percent,
        }
    }
}

/// A submission that passed name and result validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateResult {
    pub mode: Mode,
    pub player_name: String,
    pub score: i64,
    pub max_score: i64,
    pub duration_ms: i64,
    pub accuracy_percent: u8,
}

impl CandidateResult {
    pub fn into_record(self, created_at: DateTime<Utc>) -> ResultRecord {
        ResultRecord {
            id: None,
            mode: self.mode,
            player_name: self.player_name,
            score: self.score,
            max_score: self.max_score,
            duration_ms: self.duration_ms,
            accuracy_percent: self.accuracy_percent,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmitResult {
    #[serde(rename = "saved")]
    pub accepted: bool,
    #[serde(rename = "entry")]
    pub record: Option<ResultRecord>,
    pub entries: Vec<ResultRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<ResultRecord>,
}
