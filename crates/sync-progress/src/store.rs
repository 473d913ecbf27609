//! Progress storage trait
//!
//! This module defines the ProgressStore trait for backend-agnostic progress
//! storage operations.

use crate::state::{ProgressUpdate, SyncJobState};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for progress storage operations.
///
/// There is at most one record per session token.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Create the record for `session_token`, or reset an existing one to a
    /// running state with zero progress.
    async fn reset(
        &self,
        session_token: &str,
        total_record_count: i64,
        started_at: DateTime<Utc>,
    ) -> Result<SyncJobState>;

    /// Read the record. Returns None if it doesn't exist.
    async fn load(&self, session_token: &str) -> Result<Option<SyncJobState>>;

    /// Apply a partial update atomically and return the row id, or None if no
    /// record exists for the token.
    async fn apply(&self, session_token: &str, update: &ProgressUpdate) -> Result<Option<i64>>;
}
