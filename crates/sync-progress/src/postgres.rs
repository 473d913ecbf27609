//! PostgreSQL progress storage implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use crate::state::{ProgressUpdate, SyncJobState};
use crate::store::ProgressStore;

/// Table holding one row per session token.
pub const PROGRESS_TABLE: &str = "fast_load_sync_job_state";

const COLUMNS: &str = "id, session_token, is_running, started_at, current_table, \
                       current_chunk, current_record_count, total_record_count";

/// PostgreSQL implementation of ProgressStore trait.
///
/// Stores progress in [`PROGRESS_TABLE`], created by [`ensure_table`] if
/// missing.
///
/// [`ensure_table`]: PostgresProgressStore::ensure_table
#[derive(Clone)]
pub struct PostgresProgressStore {
    pool: Pool,
}

impl PostgresProgressStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create the progress table if it does not exist.
    pub async fn ensure_table(&self) -> Result<()> {
        let client = self.pool.get().await.context("Failed to get connection")?;
        client
            .batch_execute(&format!(
                "CREATE TABLE IF NOT EXISTS {PROGRESS_TABLE} (
                    id BIGSERIAL PRIMARY KEY,
                    session_token TEXT NOT NULL UNIQUE,
                    is_running BOOLEAN NOT NULL DEFAULT FALSE,
                    started_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    current_table TEXT NOT NULL DEFAULT '',
                    current_chunk BIGINT NOT NULL DEFAULT 0,
                    current_record_count BIGINT NOT NULL DEFAULT 0,
                    total_record_count BIGINT NOT NULL DEFAULT 0
                )"
            ))
            .await
            .with_context(|| format!("Failed to create {PROGRESS_TABLE}"))?;
        tracing::info!("Progress table {PROGRESS_TABLE} is ready");
        Ok(())
    }
}

fn state_from_row(row: &Row) -> SyncJobState {
    SyncJobState {
        id: row.get("id"),
        session_token: row.get("session_token"),
        is_running: row.get("is_running"),
        started_at: row.get("started_at"),
        current_table: row.get("current_table"),
        current_chunk: row.get("current_chunk"),
        current_record_count: row.get("current_record_count"),
        total_record_count: row.get("total_record_count"),
    }
}

#[async_trait]
impl ProgressStore for PostgresProgressStore {
    async fn reset(
        &self,
        session_token: &str,
        total_record_count: i64,
        started_at: DateTime<Utc>,
    ) -> Result<SyncJobState> {
        let client = self.pool.get().await.context("Failed to get connection")?;
        let query = format!(
            "INSERT INTO {PROGRESS_TABLE}
                (session_token, is_running, started_at, current_table,
                 current_chunk, current_record_count, total_record_count)
             VALUES ($1, TRUE, $2, '', 0, 0, $3)
             ON CONFLICT (session_token) DO UPDATE SET
                is_running = TRUE,
                started_at = EXCLUDED.started_at,
                current_table = '',
                current_chunk = 0,
                current_record_count = 0,
                total_record_count = EXCLUDED.total_record_count
             RETURNING {COLUMNS}"
        );
        let row = client
            .query_one(&query, &[&session_token, &started_at, &total_record_count])
            .await
            .context("Failed to initialize progress record")?;
        Ok(state_from_row(&row))
    }

    async fn load(&self, session_token: &str) -> Result<Option<SyncJobState>> {
        let client = self.pool.get().await.context("Failed to get connection")?;
        let query = format!("SELECT {COLUMNS} FROM {PROGRESS_TABLE} WHERE session_token = $1");
        let row = client
            .query_opt(&query, &[&session_token])
            .await
            .context("Failed to read progress record")?;
        Ok(row.as_ref().map(state_from_row))
    }

    async fn apply(&self, session_token: &str, update: &ProgressUpdate) -> Result<Option<i64>> {
        let update = update.normalized();
        let client = self.pool.get().await.context("Failed to get connection")?;
        let query = format!(
            "UPDATE {PROGRESS_TABLE} SET
                current_table = COALESCE($2::TEXT, current_table),
                current_chunk = COALESCE($3::BIGINT, current_chunk),
                current_record_count = current_record_count + COALESCE($4::BIGINT, 0),
                total_record_count = COALESCE($5::BIGINT, total_record_count),
                is_running = COALESCE($6::BOOLEAN, is_running)
             WHERE session_token = $1
             RETURNING id"
        );
        let row = client
            .query_opt(
                &query,
                &[
                    &session_token,
                    &update.table_name,
                    &update.chunk,
                    &update.additional_records,
                    &update.total_records,
                    &update.is_running,
                ],
            )
            .await
            .context("Failed to update progress record")?;
        Ok(row.map(|r| r.get(0)))
    }
}
