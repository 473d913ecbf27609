//! In-memory progress storage implementation.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::state::{ProgressUpdate, SyncJobState};
use crate::store::ProgressStore;

#[derive(Default)]
struct Inner {
    next_id: i64,
    states: HashMap<String, SyncJobState>,
}

/// Process-local implementation of ProgressStore trait.
///
/// Every operation takes one lock, so updates for a token are serialized.
#[derive(Default)]
pub struct MemoryProgressStore {
    inner: Mutex<Inner>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn reset(
        &self,
        session_token: &str,
        total_record_count: i64,
        started_at: DateTime<Utc>,
    ) -> Result<SyncJobState> {
        let mut inner = self.inner.lock().await;
        let id = match inner.states.get(session_token) {
            Some(existing) => existing.id,
            None => {
                inner.next_id += 1;
                inner.next_id
            }
        };

        let state = SyncJobState::started(id, session_token, total_record_count, started_at);
        inner
            .states
            .insert(session_token.to_string(), state.clone());
        Ok(state)
    }

    async fn load(&self, session_token: &str) -> Result<Option<SyncJobState>> {
        Ok(self.inner.lock().await.states.get(session_token).cloned())
    }

    async fn apply(&self, session_token: &str, update: &ProgressUpdate) -> Result<Option<i64>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.states.get_mut(session_token).map(|state| {
            update.apply_to(state);
            state.id
        }))
    }
}
