use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use sync_core::{
    ChunkRequest, ChunkResponse, ProgressQuery, ProgressResponse, ProgressUpdateQuery,
    ProgressUpdateResponse, RowCountResponse, SyncError,
};

/// The master's API as seen by the ingestor.
///
/// Every failure to obtain a well-formed answer is `Transient`; deciding
/// whether to retry is up to the caller.
#[async_trait]
pub trait MasterApi: Send + Sync {
    async fn row_count(&self) -> Result<i64, SyncError>;

    async fn fetch_chunk(
        &self,
        table_name: &str,
        start: i64,
        end: i64,
    ) -> Result<ChunkResponse, SyncError>;

    async fn progress(
        &self,
        session_token: &str,
        initialize: bool,
    ) -> Result<ProgressResponse, SyncError>;

    async fn update_progress(
        &self,
        update: &ProgressUpdateQuery,
    ) -> Result<ProgressUpdateResponse, SyncError>;
}

/// [`MasterApi`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpMasterClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpMasterClient {
    /// `request_timeout` bounds every single request, independently of any
    /// retry loop around it.
    pub fn new(base_url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<Q, T>(&self, path: &str, query: &Q) -> Result<T, SyncError>
    where
        Q: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SyncError::transient(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::transient(format!(
                "GET {url} returned HTTP {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SyncError::transient(format!("GET {url} returned a bad body: {e}")))
    }
}

#[async_trait]
impl MasterApi for HttpMasterClient {
    async fn row_count(&self) -> Result<i64, SyncError> {
        let response: RowCountResponse = self.get_json("/sync/row-count", &()).await?;
        response.count().ok_or_else(|| {
            SyncError::transient(format!("row count {:?} is not a number", response.row_count))
        })
    }

    async fn fetch_chunk(
        &self,
        table_name: &str,
        start: i64,
        end: i64,
    ) -> Result<ChunkResponse, SyncError> {
        let request = ChunkRequest {
            table_name: table_name.to_string(),
            start,
            end,
        };
        self.get_json("/sync/chunk", &request).await
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
        self.get_json("/sync/progress", &query).await
    }

    async fn update_progress(
        &self,
        update: &ProgressUpdateQuery,
    ) -> Result<ProgressUpdateResponse, SyncError> {
        self.get_json("/sync/progress/update", update).await
    }
}
