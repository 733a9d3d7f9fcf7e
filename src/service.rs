use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::RemovalGrant;
use crate::constants::{DEFAULT_TOP_LIMIT, MAX_FETCH_ROWS};
use crate::error::{GatewayError, LeaderboardError};
use crate::gateway::PersistenceGateway;
use crate::names::{normalize_name, NameValidator};
use crate::ranking::{is_better, top_n};
use crate::result_validation::ResultValidator;
use crate::types::{CandidateResult, Mode, RecordId, ResultRecord, SubmitResult};

/// Raw result submission as received from a client.
///
/// Number fields stay untyped so integer parsing can report `not-integer`
/// separately from range failures.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub max_score: Value,
    #[serde(default)]
    pub duration_ms: Value,
}

impl Submission {
    pub fn new(mode: &str, player_name: &str, score: i64, max_score: i64, duration_ms: i64) -> Self {
        Self {
            mode: Some(mode.to_string()),
            player_name: Some(player_name.to_string()),
            score: Value::from(score),
            max_score: Value::from(max_score),
            duration_ms: Value::from(duration_ms),
        }
    }
}

pub fn parse_mode(raw: &str) -> Result<Mode, LeaderboardError> {
    Mode::parse(raw).ok_or_else(|| LeaderboardError::InvalidMode {
        value: raw.to_string(),
    })
}

#[derive(Clone)]
pub struct LeaderboardService {
    gateway: Arc<dyn PersistenceGateway>,
    names: NameValidator,
    fetch_limit: usize,
}

impl LeaderboardService {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, names: NameValidator) -> Self {
        Self {
            gateway,
            names,
            fetch_limit: MAX_FETCH_ROWS,
        }
    }

    pub fn name_validator(&self) -> &NameValidator {
        &self.names
    }

    pub async fn list_top(
        &self,
        mode: &str,
        limit: usize,
    ) -> Result<Vec<ResultRecord>, LeaderboardError> {
        let mode = parse_mode(mode)?;
        self.ranked(mode, limit).await
    }

    async fn ranked(&self, mode: Mode, limit: usize) -> Result<Vec<ResultRecord>, LeaderboardError> {
        let rows = self
            .gateway
            .list_by_mode(mode, self.fetch_limit)
            .await
            .map_err(|error| persistence_failure("list", mode, error))?;
        Ok(top_n(rows, limit))
    }

    pub async fn submit(&self, submission: &Submission) -> Result<SubmitResult, LeaderboardError> {
        self.submit_at(submission, Utc::now()).await
    }

    /// Validates, merges with the stored best result, and returns the
    /// refreshed top list. A rejected candidate leaves the store untouched.
    pub async fn submit_at(
        &self,
        submission: &Submission,
        now: DateTime<Utc>,
    ) -> Result<SubmitResult, LeaderboardError> {
        let mode = parse_mode(submission.mode.as_deref().unwrap_or_default())?;
        let player_name = normalize_name(submission.player_name.as_deref());
        self.names.validate(&player_name)?;
        let validated = ResultValidator::validate_raw(
            &submission.score,
            &submission.max_score,
            &submission.duration_ms,
        )?;

        let candidate = CandidateResult {
            mode,
            player_name,
            score: validated.score,
            max_score: validated.max_score,
            duration_ms: validated.duration_ms,
            accuracy_percent: validated.accuracy_percent,
        };
        let (accepted, record) = self.merge_best(candidate, now).await?;
        let entries = self.ranked(mode, DEFAULT_TOP_LIMIT).await?;

        Ok(SubmitResult {
            accepted,
            record,
            entries,
        })
    }

    /// Read, decide, write. A uniqueness conflict on insert means another
    /// submission created the pair first; re-read and decide once more.
    async fn merge_best(
        &self,
        candidate: CandidateResult,
        now: DateTime<Utc>,
    ) -> Result<(bool, Option<ResultRecord>), LeaderboardError> {
        let mode = candidate.mode;
        let mut retried = false;
        loop {
            let existing = self
                .gateway
                .find_by_mode_and_name(mode, &candidate.player_name)
                .await
                .map_err(|error| persistence_failure("find", mode, error))?;

            if !is_better(&candidate, existing.as_ref()) {
                tracing::debug!(
                    mode = %mode,
                    player_name = %candidate.player_name,
                    score = candidate.score,
                    duration_ms = candidate.duration_ms,
                    "submission does not beat stored result"
                );
                return Ok((false, existing));
            }

            if let Some(mut current) = existing {
                let id = current.id.clone().ok_or_else(|| LeaderboardError::Persistence {
                    message: format!("stored record for {:?} has no id", current.player_name),
                })?;
                current.absorb(&candidate, now);
                let updated = self
                    .gateway
                    .update(&id, current)
                    .await
                    .map_err(|error| persistence_failure("update", mode, error))?;
                tracing::info!(
                    mode = %mode,
                    player_name = %updated.player_name,
                    id = %id,
                    score = updated.score,
                    duration_ms = updated.duration_ms,
                    "best result updated"
                );
                return Ok((true, Some(updated)));
            }

            match self.gateway.insert(candidate.clone().into_record(now)).await {
                Ok(created) => {
                    tracing::info!(
                        mode = %mode,
                        player_name = %created.player_name,
                        score = created.score,
                        duration_ms = created.duration_ms,
                        "best result created"
                    );
                    return Ok((true, Some(created)));
                }
                Err(GatewayError::Conflict { .. }) if !retried => {
                    tracing::debug!(
                        mode = %mode,
                        player_name = %candidate.player_name,
                        "concurrent insert detected, re-evaluating"
                    );
                    retried = true;
                }
                Err(error) => return Err(persistence_failure("insert", mode, error)),
            }
        }
    }

    /// Deletes a record by id. The grant proves the caller already passed
    /// the admin gate. A supplied mode must be valid but does not scope the
    /// delete.
    pub async fn remove(
        &self,
        _grant: RemovalGrant,
        mode: Option<&str>,
        id: &str,
    ) -> Result<(), LeaderboardError> {
        if let Some(mode) = mode {
            parse_mode(mode)?;
        }
        let id = id.trim();
        if id.is_empty() {
            return Err(LeaderboardError::MissingId);
        }
        let id = RecordId::new(id);
        self.gateway.delete(&id).await.map_err(|error| {
            tracing::error!(id = %id, %error, "failed to delete record");
            LeaderboardError::from(error)
        })?;
        tracing::info!(id = %id, "record removed");
        Ok(())
    }
}

fn persistence_failure(operation: &str, mode: Mode, error: GatewayError) -> LeaderboardError {
    tracing::error!(operation, mode = %mode, %error, "persistence gateway failed");
    error.into()
}
