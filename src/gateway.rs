use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{Mode, RecordId, ResultRecord};

/// Storage backend for leaderboard records.
///
/// Implementations enforce at most one record per (mode, player_name) and
/// serialize operations touching the same pair.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Records for `mode` ordered by score desc, duration asc, created_at asc,
    /// capped at `limit` rows.
    async fn list_by_mode(&self, mode: Mode, limit: usize)
        -> Result<Vec<ResultRecord>, GatewayError>;

    async fn find_by_mode_and_name(
        &self,
        mode: Mode,
        player_name: &str,
    ) -> Result<Option<ResultRecord>, GatewayError>;

    /// Assigns an id. Fails with `Conflict` if the pair already exists.
    async fn insert(&self, record: ResultRecord) -> Result<ResultRecord, GatewayError>;

    async fn update(&self, id: &RecordId, record: ResultRecord)
        -> Result<ResultRecord, GatewayError>;

    async fn delete(&self, id: &RecordId) -> Result<(), GatewayError>;
}
