use super::Extractor;
use chrono::Utc;
use std::sync::Arc;
use sync_progress::{ProgressStore, ProgressUpdate, SyncJobState};

/// Per-session progress records, persisted through a [`ProgressStore`].
pub struct Tracker {
    extractor: Arc<Extractor>,
    store: Arc<dyn ProgressStore>,
}

impl Tracker {
    pub fn new(extractor: Arc<Extractor>, store: Arc<dyn ProgressStore>) -> Self {
        Self { extractor, store }
    }

    /// Count the master's rows and (re)create the record for the session.
    pub async fn initialize(&self, session_token: &str) -> anyhow::Result<SyncJobState> {
        let total = self.extractor.total_row_count().await?;
        let state = self.store.reset(session_token, total, Utc::now()).await?;
        tracing::info!(
            "Initialized progress for session {} with {} records to sync",
            session_token,
            total
        );
        Ok(state)
    }

    pub async fn retrieve(&self, session_token: &str) -> anyhow::Result<Option<SyncJobState>> {
        self.store.load(session_token).await
    }

    /// Apply a partial update; returns the row id, or None when the session
    /// was never initialized.
    pub async fn update(
        &self,
        session_token: &str,
        update: &ProgressUpdate,
    ) -> anyhow::Result<Option<i64>> {
        self.store.apply(session_token, update).await
    }
}
