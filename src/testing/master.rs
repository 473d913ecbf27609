use crate::ingest::MasterApi;
use crate::master::{answer_progress, answer_progress_update, AppState, Extractor, Tracker};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sync_core::{
    ChunkResponse, ProgressQuery, ProgressResponse, ProgressUpdateQuery, ProgressUpdateResponse,
    SyncError, TableRegistry, TableSource,
};
use sync_progress::{MemoryProgressStore, SyncJobState};

/// A master running in the same process, answering exactly like the HTTP
/// routes would.
///
/// Chunk requests can be made to time out a given number of times.
pub struct InProcessMaster {
    state: AppState,
    fetch_calls: AtomicUsize,
    failing_fetches: AtomicUsize,
}

impl InProcessMaster {
    pub fn new(source: Arc<dyn TableSource>) -> Self {
        let extractor = Arc::new(Extractor::new(source, TableRegistry::default()));
        let tracker = Arc::new(Tracker::new(
            extractor.clone(),
            Arc::new(MemoryProgressStore::new()),
        ));
        Self {
            state: AppState::new(extractor, tracker),
            fetch_calls: AtomicUsize::new(0),
            failing_fetches: AtomicUsize::new(0),
        }
    }

    pub fn app_state(&self) -> AppState {
        self.state.clone()
    }

    /// Time out the next `count` chunk requests.
    pub fn fail_next_fetches(&self, count: usize) {
        self.failing_fetches.store(count, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub async fn progress_state(&self, session_token: &str) -> Option<SyncJobState> {
        self.state
            .tracker
            .retrieve(session_token)
            .await
            .ok()
            .flatten()
    }
}

#[async_trait]
impl MasterApi for InProcessMaster {
    async fn row_count(&self) -> Result<i64, SyncError> {
        // Over HTTP a failed count is a 500, which the client sees as transient.
        self.state
            .extractor
            .total_row_count()
            .await
            .map_err(|e| SyncError::transient(e.message()))
    }

    async fn fetch_chunk(
        &self,
        table_name: &str,
        start: i64,
        end: i64,
    ) -> Result<ChunkResponse, SyncError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let timed_out = self
            .failing_fetches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if timed_out {
            return Err(SyncError::transient(format!(
                "GET /sync/chunk?table_name={table_name}&start={start}&end={end} timed out"
            )));
        }
        Ok(self.state.extractor.get_chunk(table_name, start, end).await)
    }

    async fn progress(
        &self,
        session_token: &str,
        initialize: bool,
    ) -> Result<ProgressResponse, SyncError> {
        let query = ProgressQuery {
            initialize,
            session_token: session_token.to_string(),
        };
        Ok(answer_progress(&self.state, &query).await)
    }

    async fn update_progress(
        &self,
        update: &ProgressUpdateQuery,
    ) -> Result<ProgressUpdateResponse, SyncError> {
        Ok(answer_progress_update(&self.state, update).await)
    }
}
