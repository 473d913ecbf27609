//! The progress record and partial updates to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress of one sync session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncJobState {
    /// Row id in the backing store.
    pub id: i64,
    pub session_token: String,
    pub is_running: bool,
    pub started_at: DateTime<Utc>,
    pub current_table: String,
    pub current_chunk: i64,
    pub current_record_count: i64,
    pub total_record_count: i64,
}

impl SyncJobState {
    /// A freshly initialized record.
    pub fn started(
        id: i64,
        session_token: impl Into<String>,
        total_record_count: i64,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_token: session_token.into(),
            is_running: true,
            started_at,
            current_table: String::new(),
            current_chunk: 0,
            current_record_count: 0,
            total_record_count,
        }
    }
}

/// A partial change to a [`SyncJobState`].
///
/// Empty strings and zero numbers mean "leave alone". `additional_records` is
/// added to the current count, never assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub table_name: Option<String>,
    pub chunk: Option<i64>,
    pub additional_records: Option<i64>,
    pub total_records: Option<i64>,
    pub is_running: Option<bool>,
}

impl ProgressUpdate {
    /// The per-chunk report of the ingestor.
    pub fn records(table_name: impl Into<String>, chunk: i64, additional_records: i64) -> Self {
        Self {
            table_name: Some(table_name.into()),
            chunk: Some(chunk),
            additional_records: Some(additional_records),
            ..Self::default()
        }
    }

    pub fn finished() -> Self {
        Self {
            is_running: Some(false),
            ..Self::default()
        }
    }

    /// Drop empty and zero fields.
    pub fn normalized(&self) -> Self {
        Self {
            table_name: self.table_name.clone().filter(|t| !t.is_empty()),
            chunk: self.chunk.filter(|c| *c != 0),
            additional_records: self.additional_records.filter(|n| *n != 0),
            total_records: self.total_records.filter(|n| *n != 0),
            is_running: self.is_running,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized() == Self::default()
    }

    /// Apply to an in-memory state.
    pub fn apply_to(&self, state: &mut SyncJobState) {
        let update = self.normalized();
        if let Some(table_name) = update.table_name {
            state.current_table = table_name;
        }
        if let Some(chunk) = update.chunk {
            state.current_chunk = chunk;
        }
        if let Some(additional) = update.additional_records {
            state.current_record_count += additional;
        }
        if let Some(total) = update.total_records {
            state.total_record_count = total;
        }
        if let Some(is_running) = update.is_running {
            state.is_running = is_running;
        }
    }
}
