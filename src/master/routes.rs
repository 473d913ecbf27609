//! HTTP surface of the master.
//!
//! Refusals and failures are reported in-band (`success=false` plus a status
//! string) with HTTP 200; only a failed row count answers with a 500.

use super::{Extractor, Tracker};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use sync_core::protocol::STARTED_DATE_FORMAT;
use sync_core::{
    ChunkRequest, ChunkResponse, ProgressQuery, ProgressResponse, ProgressUpdateQuery,
    ProgressUpdateResponse, RowCountResponse,
};
use sync_progress::{ProgressUpdate, SyncJobState};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

pub const STATUS_ROW_INITIALIZED: &str = "ROW_INITIALIZED";
pub const STATUS_ROW_RETRIEVED: &str = "ROW_RETRIEVED";
pub const STATUS_ROW_NOT_FOUND: &str = "ROW_NOT_FOUND";
pub const STATUS_ROW_SAVED: &str = "ROW_SAVED";
pub const STATUS_ROW_NOT_SAVED: &str = "ROW_NOT_SAVED";

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
    pub tracker: Arc<Tracker>,
}

impl AppState {
    pub fn new(extractor: Arc<Extractor>, tracker: Arc<Tracker>) -> Self {
        Self { extractor, tracker }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sync/row-count", get(row_count_handler))
        .route("/sync/chunk", get(chunk_handler))
        .route("/sync/progress", get(progress_handler))
        .route("/sync/progress/update", get(progress_update_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn row_count_handler(State(state): State<AppState>) -> Response {
    match state.extractor.total_row_count().await {
        Ok(count) => Json(RowCountResponse::new(count)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "status": e.to_string() })),
        )
            .into_response(),
    }
}

async fn chunk_handler(
    State(state): State<AppState>,
    Query(request): Query<ChunkRequest>,
) -> Json<ChunkResponse> {
    Json(
        state
            .extractor
            .get_chunk(&request.table_name, request.start, request.end)
            .await,
    )
}

async fn progress_handler(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Json<ProgressResponse> {
    Json(answer_progress(&state, &query).await)
}

async fn progress_update_handler(
    State(state): State<AppState>,
    Query(query): Query<ProgressUpdateQuery>,
) -> Json<ProgressUpdateResponse> {
    Json(answer_progress_update(&state, &query).await)
}

pub(crate) async fn answer_progress(state: &AppState, query: &ProgressQuery) -> ProgressResponse {
    let token = query.session_token.trim();
    if token.is_empty() {
        return ProgressResponse::failed("session_token is required");
    }

    if query.initialize {
        match state.tracker.initialize(token).await {
            Ok(job) => progress_response(&job, STATUS_ROW_INITIALIZED),
            Err(e) => {
                error!("Initializing progress for {token} failed: {e:#}");
                ProgressResponse::failed(format!("{STATUS_ROW_NOT_SAVED}: {e:#}"))
            }
        }
    } else {
        match state.tracker.retrieve(token).await {
            Ok(Some(job)) => progress_response(&job, STATUS_ROW_RETRIEVED),
            Ok(None) => ProgressResponse::failed(STATUS_ROW_NOT_FOUND),
            Err(e) => {
                error!("Reading progress for {token} failed: {e:#}");
                ProgressResponse::failed(format!("{STATUS_ROW_NOT_FOUND}: {e:#}"))
            }
        }
    }
}

pub(crate) async fn answer_progress_update(
    state: &AppState,
    query: &ProgressUpdateQuery,
) -> ProgressUpdateResponse {
    let token = query.session_token.trim();
    if token.is_empty() {
        return ProgressUpdateResponse::failed("session_token is required");
    }

    let update = ProgressUpdate {
        table_name: query.table_name.clone(),
        chunk: query.chunk,
        additional_records: query.additional_records,
        total_records: query.total_records,
        is_running: query.is_running,
    };

    match state.tracker.update(token, &update).await {
        Ok(Some(row_id)) => ProgressUpdateResponse {
            success: true,
            status: STATUS_ROW_SAVED.to_string(),
            row_id,
        },
        Ok(None) => {
            warn!("Progress update for unknown session {token}");
            ProgressUpdateResponse::failed(format!(
                "{STATUS_ROW_NOT_SAVED}: no progress record for this session"
            ))
        }
        Err(e) => {
            error!("Saving progress for {token} failed: {e:#}");
            ProgressUpdateResponse::failed(format!("{STATUS_ROW_NOT_SAVED}: {e:#}"))
        }
    }
}

fn progress_response(job: &SyncJobState, status: &str) -> ProgressResponse {
    ProgressResponse {
        success: true,
        status: status.to_string(),
        is_running: job.is_running,
        started_date: job.started_at.format(STARTED_DATE_FORMAT).to_string(),
        table_name: job.current_table.clone(),
        chunk: job.current_chunk,
        current_record: job.current_record_count,
        total_records: job.total_record_count,
    }
}
