//! Unit tests for the sync-progress crate.

use chrono::{TimeZone, Utc};
use std::sync::Arc;

use crate::{MemoryProgressStore, ProgressStore, ProgressUpdate, SyncJobState};

fn started() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()
}

// ============================================================================
// ProgressUpdate Tests
// ============================================================================

#[test]
fn test_normalized_drops_empty_and_zero_fields() {
    let update = ProgressUpdate {
        table_name: Some(String::new()),
        chunk: Some(0),
        additional_records: Some(0),
        total_records: Some(0),
        is_running: None,
    };
    assert!(update.is_empty());
    assert_eq!(update.normalized(), ProgressUpdate::default());
}

#[test]
fn test_apply_to_adds_records() {
    let mut state = SyncJobState::started(1, "tok", 100, started());
    ProgressUpdate::records("party_party", 1, 30).apply_to(&mut state);
    ProgressUpdate::records("party_party", 2, 12).apply_to(&mut state);

    assert_eq!(state.current_table, "party_party");
    assert_eq!(state.current_chunk, 2);
    assert_eq!(state.current_record_count, 42);
    assert_eq!(state.total_record_count, 100);
    assert!(state.is_running);
}

#[test]
fn test_apply_to_ignores_empty_fields() {
    let mut state = SyncJobState::started(1, "tok", 100, started());
    ProgressUpdate::records("issue_issue", 3, 5).apply_to(&mut state);
    ProgressUpdate {
        table_name: Some(String::new()),
        chunk: Some(0),
        ..ProgressUpdate::default()
    }
    .apply_to(&mut state);

    assert_eq!(state.current_table, "issue_issue");
    assert_eq!(state.current_chunk, 3);
}

#[test]
fn test_finished_stops_running() {
    let mut state = SyncJobState::started(1, "tok", 0, started());
    ProgressUpdate::finished().apply_to(&mut state);
    assert!(!state.is_running);
}

// ============================================================================
// MemoryProgressStore Tests
// ============================================================================

#[tokio::test]
async fn test_memory_store_reset_and_load() {
    let store = MemoryProgressStore::new();
    assert!(store.load("tok").await.unwrap().is_none());

    let state = store.reset("tok", 250, started()).await.unwrap();
    assert_eq!(state.id, 1);
    assert!(state.is_running);
    assert_eq!(state.total_record_count, 250);
    assert_eq!(state.current_table, "");

    let loaded = store.load("tok").await.unwrap().unwrap();
    assert_eq!(loaded, state);
}

#[tokio::test]
async fn test_memory_store_reset_keeps_one_row_per_token() {
    let store = MemoryProgressStore::new();
    let first = store.reset("tok", 10, started()).await.unwrap();
    store
        .apply("tok", &ProgressUpdate::records("party_party", 1, 7))
        .await
        .unwrap();

    let second = store.reset("tok", 20, started()).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.current_record_count, 0);
    assert_eq!(second.total_record_count, 20);

    let other = store.reset("other", 5, started()).await.unwrap();
    assert_ne!(other.id, first.id);
}

#[tokio::test]
async fn test_memory_store_apply_unknown_token() {
    let store = MemoryProgressStore::new();
    let row_id = store
        .apply("missing", &ProgressUpdate::records("party_party", 1, 1))
        .await
        .unwrap();
    assert_eq!(row_id, None);
}

#[tokio::test]
async fn test_concurrent_updates_are_not_lost() {
    let store = Arc::new(MemoryProgressStore::new());
    store.reset("tok", 1000, started()).await.unwrap();

    let mut handles = Vec::new();
    for i in 1..=20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .apply("tok", &ProgressUpdate::records("ballot_ballotitem", i, 5))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Some(1));
    }

    let state = store.load("tok").await.unwrap().unwrap();
    assert_eq!(state.current_record_count, 100);
}
