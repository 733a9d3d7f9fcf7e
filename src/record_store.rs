use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::constants::STORE_FILE_VERSION;
use crate::error::GatewayError;
use crate::gateway::PersistenceGateway;
use crate::names::{normalize_name, NameValidator};
use crate::ranking::{is_better, sort_ranked};
use crate::result_validation::accuracy_percent;
use crate::types::{Mode, RecordId, ResultRecord};

#[derive(Serialize)]
struct RecordStoreFile<'a> {
    version: u8,
    records: &'a [ResultRecord],
}

#[derive(Deserialize)]
struct RecordStoreFileRaw {
    version: u8,
    records: Vec<serde_json::Value>,
}

/// JSON-file backed gateway. Without a path it keeps records in memory only.
pub struct RecordStore {
    file_path: Option<PathBuf>,
    records: Mutex<Vec<ResultRecord>>,
}

impl RecordStore {
    /// Loads `file_path`, re-applying the name rules so stored rows share
    /// the normalized (mode, name) key that lookups use.
    pub fn new(file_path: PathBuf, names: &NameValidator) -> Self {
        let records = load_records(&file_path, names);
        tracing::info!(
            path = %file_path.display(),
            count = records.len(),
            "record store loaded"
        );
        Self {
            file_path: Some(file_path),
            records: Mutex::new(records),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            file_path: None,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Applies `change` to a copy and only commits it once persisted.
    async fn write_with<T>(
        &self,
        change: impl FnOnce(&mut Vec<ResultRecord>) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut guard = self.records.lock().await;
        let mut next = guard.clone();
        let output = change(&mut next)?;
        if let Some(path) = &self.file_path {
            save_records(path, &next)?;
        }
        *guard = next;
        Ok(output)
    }
}

#[async_trait]
impl PersistenceGateway for RecordStore {
    async fn list_by_mode(
        &self,
        mode: Mode,
        limit: usize,
    ) -> Result<Vec<ResultRecord>, GatewayError> {
        let guard = self.records.lock().await;
        let mut rows: Vec<ResultRecord> = guard
            .iter()
            .filter(|record| record.mode == mode)
            .cloned()
            .collect();
        sort_ranked(&mut rows);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn find_by_mode_and_name(
        &self,
        mode: Mode,
        player_name: &str,
    ) -> Result<Option<ResultRecord>, GatewayError> {
        let guard = self.records.lock().await;
        Ok(guard
            .iter()
            .find(|record| record.mode == mode && record.player_name == player_name)
            .cloned())
    }

    async fn insert(&self, record: ResultRecord) -> Result<ResultRecord, GatewayError> {
        self.write_with(|records| {
            let taken = records
                .iter()
                .any(|row| row.mode == record.mode && row.player_name == record.player_name);
            if taken {
                return Err(GatewayError::Conflict {
                    mode: record.mode,
                    player_name: record.player_name.clone(),
                });
            }
            let mut stored = record;
            stored.id = Some(make_unique_id(records));
            records.push(stored.clone());
            Ok(stored)
        })
        .await
    }

    async fn update(
        &self,
        id: &RecordId,
        record: ResultRecord,
    ) -> Result<ResultRecord, GatewayError> {
        self.write_with(|records| {
            let row = records
                .iter_mut()
                .find(|row| row.id.as_ref() == Some(id))
                .ok_or_else(|| GatewayError::NotFound { id: id.clone() })?;
            row.score = record.score;
            row.max_score = record.max_score;
            row.duration_ms = record.duration_ms;
            row.accuracy_percent = record.accuracy_percent;
            row.created_at = record.created_at;
            Ok(row.clone())
        })
        .await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), GatewayError> {
        self.write_with(|records| {
            let before = records.len();
            records.retain(|row| row.id.as_ref() != Some(id));
            if records.len() == before {
                return Err(GatewayError::NotFound { id: id.clone() });
            }
            Ok(())
        })
        .await
    }
}

fn make_id() -> RecordId {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    RecordId::new(format!("lb_{suffix}"))
}

fn make_unique_id(records: &[ResultRecord]) -> RecordId {
    loop {
        let id = make_id();
        if records.iter().all(|row| row.id.as_ref() != Some(&id)) {
            return id;
        }
    }
}

fn save_records(path: &Path, records: &[ResultRecord]) -> Result<(), GatewayError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let payload = RecordStoreFile {
        version: STORE_FILE_VERSION,
        records,
    };
    let text = serde_json::to_string_pretty(&payload)?;
    let staging = staging_path(path);
    fs::write(&staging, text)
        .and_then(|()| fs::rename(&staging, path))
        .map_err(|error| {
            tracing::error!(path = %path.display(), %error, "failed to write record store");
            let _ = fs::remove_file(&staging);
            GatewayError::from(error)
        })
}

/// Sibling file the new contents are written to before replacing `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn load_records(path: &Path, names: &NameValidator) -> Vec<ResultRecord> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), %error, "failed to read record store");
            }
            return Vec::new();
        }
    };
    let parsed = match serde_json::from_str::<RecordStoreFileRaw>(&text) {
        Ok(value) if value.version == STORE_FILE_VERSION => value,
        Ok(value) => {
            tracing::warn!(
                path = %path.display(),
                version = value.version,
                "unsupported record store version"
            );
            return Vec::new();
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to parse record store");
            return Vec::new();
        }
    };

    let mut sanitized: Vec<ResultRecord> = Vec::new();
    for (index, raw_value) in parsed.records.into_iter().enumerate() {
        let value: ResultRecord = match serde_json::from_value(raw_value) {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!(path = %path.display(), index, %error, "skipping unreadable record");
                continue;
            }
        };
        let Some(mut record) = sanitize_stored_record(value, names) else {
            tracing::warn!(path = %path.display(), index, "dropping record with invalid values");
            continue;
        };

        let duplicate = sanitized.iter_mut().find(|current| {
            current.mode == record.mode && current.player_name == record.player_name
        });
        match duplicate {
            Some(current) => {
                if keeps_over(&record, current) {
                    record.id = current.id.take().or(record.id);
                    *current = record;
                }
            }
            None => sanitized.push(record),
        }
    }

    for index in 0..sanitized.len() {
        let id_taken = sanitized[index].id.as_ref().is_some_and(|id| {
            sanitized
                .iter()
                .take(index)
                .any(|other| other.id.as_ref() == Some(id))
        });
        if sanitized[index].id.is_none() || id_taken {
            let id = make_unique_id(&sanitized);
            sanitized[index].id = Some(id);
        }
    }

    sanitized
}

/// True when `incoming` should replace `current` for the same (mode, name).
fn keeps_over(incoming: &ResultRecord, current: &ResultRecord) -> bool {
    if is_better(&incoming.as_candidate(), Some(current)) {
        return true;
    }
    let equal = !is_better(&current.as_candidate(), Some(incoming));
    equal && incoming.created_at < current.created_at
}

fn sanitize_stored_record(value: ResultRecord, names: &NameValidator) -> Option<ResultRecord> {
    let player_name = normalize_name(Some(&value.player_name));
    if names.validate(&player_name).is_err() {
        return None;
    }
    if value.max_score <= 0 || value.score < 0 || value.score > value.max_score {
        return None;
    }
    if value.duration_ms < 0 {
        return None;
    }
    Some(ResultRecord {
        player_name,
        accuracy_percent: accuracy_percent(value.score, value.max_score),
        ..value
    })
}
