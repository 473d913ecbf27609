use super::{MasterApi, RetryPolicy};
use crate::config::IngestSettings;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sync_core::registry::rules_for;
use sync_core::{
    clean_chunk, parse_payload, ErrorKind, IdHighWater, ProgressUpdateQuery, SyncError,
    TableRegistry, TableSink,
};
use sync_progress::ProgressUpdate;
use tracing::{debug, error, info, warn};

/// Outcome of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReport {
    pub table: String,
    pub rows_loaded: u64,
    /// Payload records seen, rejected lines included.
    pub records_seen: u64,
    pub chunks: u64,
    pub elapsed: Duration,
    /// Next value of the id sequence after the reset, when it succeeded.
    pub sequence_next: Option<i64>,
    /// Why the table was abandoned, if it was.
    pub error: Option<SyncError>,
}

impl TableReport {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            rows_loaded: 0,
            records_seen: 0,
            chunks: 0,
            elapsed: Duration::ZERO,
            sequence_next: None,
            error: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub tables: Vec<TableReport>,
    /// Row count reported by the master at the start of the run.
    pub total_records: i64,
    pub elapsed: Duration,
}

impl IngestReport {
    pub fn rows_loaded(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_loaded).sum()
    }

    pub fn failed_tables(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|t| !t.succeeded())
    }
}

/// Pulls every table of the registry from the master, one table and one
/// chunk at a time, and bulk-loads it into the sink.
///
/// Each table is truncated once, right before its first chunk is loaded.
/// Later chunks append. A table-level failure is recorded in the report and
/// the run moves on; a fatal error ends the run without marking the session
/// as finished.
pub struct Ingestor {
    master: Arc<dyn MasterApi>,
    sink: Arc<dyn TableSink>,
    settings: IngestSettings,
    registry: TableRegistry,
    retry: RetryPolicy,
    session_token: Option<String>,
}

impl Ingestor {
    pub fn new(
        master: Arc<dyn MasterApi>,
        sink: Arc<dyn TableSink>,
        settings: IngestSettings,
    ) -> Result<Self, SyncError> {
        let registry = TableRegistry::restricted_to(&settings.tables)?;
        let retry = settings.retry_policy();
        Ok(Self {
            master,
            sink,
            settings,
            registry,
            retry,
            session_token: None,
        })
    }

    /// Report progress under `session_token`. Without a token the run is not
    /// tracked.
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        let token = session_token.into();
        self.session_token = (!token.trim().is_empty()).then_some(token);
        self
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub async fn run(&self) -> Result<IngestReport, SyncError> {
        let started = Instant::now();

        self.initialize_progress().await;

        let total_records = self
            .retry
            .run("fetching the row count", || self.master.row_count())
            .await?;
        info!(
            "Syncing {} tables, {} records on the master",
            self.registry.len(),
            total_records
        );

        let mut tables = Vec::with_capacity(self.registry.len());
        for table in self.registry.list_allowed() {
            tables.push(self.sync_table(table).await?);
        }

        self.report_progress(ProgressUpdate::finished()).await;

        let report = IngestReport {
            tables,
            total_records,
            elapsed: started.elapsed(),
        };
        for table in &report.tables {
            match &table.error {
                None => info!(
                    "{}: {} rows in {} chunks, {:.3} seconds",
                    table.table,
                    table.rows_loaded,
                    table.chunks,
                    table.elapsed.as_secs_f64()
                ),
                Some(e) => warn!("{}: abandoned after {} chunks: {e}", table.table, table.chunks),
            }
        }
        info!(
            "Loaded {} rows in {:.3} seconds",
            report.rows_loaded(),
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    /// Only fatal errors escape; anything else is recorded on the report.
    async fn sync_table(&self, table: &str) -> Result<TableReport, SyncError> {
        let started = Instant::now();
        let mut report = TableReport::new(table);

        match self.load_table(table, &mut report).await {
            Ok(()) => {
                report.sequence_next = self.reset_sequence(table).await;
            }
            Err(e) if e.is_fatal() => {
                error!("Aborting the sync while loading {table}: {e}");
                return Err(e);
            }
            Err(e) => {
                error!("Skipping the rest of {table}: {e}");
                report.error = Some(e);
            }
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }

    async fn load_table(&self, table: &str, report: &mut TableReport) -> Result<(), SyncError> {
        let schema = self.sink.table_schema(table).await.map_err(|e| {
            SyncError::schema_mismatch(format!("reading the catalog of {table} failed: {e:#}"))
        })?;
        let rules = rules_for(table);
        let chunk_size = self.settings.chunk_size_for(table);
        let mut start = self.settings.first_id;
        let mut truncated = false;
        let mut ids = IdHighWater::new();

        loop {
            if report.chunks >= self.settings.max_chunks_per_table {
                return Err(SyncError::fatal(format!(
                    "{table} still returned full chunks after {} chunks of {chunk_size} rows",
                    report.chunks
                )));
            }

            let end = chunk_end(table, start, chunk_size)?;
            let what = format!("fetching {table} ids {start}..={end}");
            let response = self
                .retry
                .run(&what, || self.master.fetch_chunk(table, start, end))
                .await?;
            if !response.success {
                return Err(SyncError::new(ErrorKind::NotAllowed, response.status));
            }
            let payload = response.payload(table).ok_or_else(|| {
                SyncError::schema_mismatch(format!("the chunk response carries no {table} payload"))
            })?;

            let parsed = parse_payload(payload);
            let records = parsed.record_count() as u64;
            if parsed.rejected > 0 {
                warn!(
                    "Discarded {} malformed lines of {table} ids {start}..={end}",
                    parsed.rejected
                );
            }
            let batch = clean_chunk(&schema, rules, parsed, Utc::now(), &mut ids)?;

            if !truncated {
                self.truncate(table).await?;
                truncated = true;
            }

            if !batch.is_empty() {
                let loaded = self.sink.bulk_load(&batch).await.map_err(|e| {
                    SyncError::schema_mismatch(format!("loading {table} failed: {e:#}"))
                })?;
                report.rows_loaded += loaded;
            }
            report.chunks += 1;
            report.records_seen += records;
            debug!(
                "{table} chunk {}: {} records, {} loaded",
                report.chunks,
                records,
                batch.len()
            );

            self.report_progress(ProgressUpdate::records(
                table,
                report.chunks as i64,
                batch.len() as i64,
            ))
            .await;

            if (records as i64) < chunk_size {
                return Ok(());
            }
            start = end.checked_add(1).ok_or_else(|| id_overflow(table, end))?;
        }
    }

    async fn truncate(&self, table: &str) -> Result<(), SyncError> {
        let remaining = self.sink.truncate_table(table).await.map_err(|e| {
            SyncError::schema_mismatch(format!("truncating {table} failed: {e:#}"))
        })?;
        if remaining != 0 {
            return Err(SyncError::schema_mismatch(format!(
                "{remaining} rows remain in {table} after truncation"
            )));
        }
        Ok(())
    }

    async fn reset_sequence(&self, table: &str) -> Option<i64> {
        match self.sink.reset_sequence(table).await {
            Ok(Some(next)) => {
                debug!("Reset the {table} id sequence to {next}");
                Some(next)
            }
            Ok(None) => {
                debug!("{table} has no id sequence");
                None
            }
            Err(e) => {
                warn!("Resetting the {table} id sequence failed: {e:#}");
                None
            }
        }
    }

    async fn initialize_progress(&self) {
        let Some(token) = &self.session_token else {
            return;
        };
        match self.master.progress(token, true).await {
            Ok(response) if response.success => {
                debug!("Progress initialized: {}", response.status)
            }
            Ok(response) => warn!("Initializing progress failed: {}", response.status),
            Err(e) => warn!("Initializing progress failed: {e}"),
        }
    }

    async fn report_progress(&self, update: ProgressUpdate) {
        let Some(token) = &self.session_token else {
            return;
        };
        let query = ProgressUpdateQuery {
            session_token: token.clone(),
            table_name: update.table_name,
            additional_records: update.additional_records,
            chunk: update.chunk,
            total_records: update.total_records,
            is_running: update.is_running,
        };
        match self.master.update_progress(&query).await {
            Ok(response) if response.success => {}
            Ok(response) => warn!("Progress update was not saved: {}", response.status),
            Err(e) => warn!("Progress update failed: {e}"),
        }
    }
}

/// Last id of the chunk starting at `start`.
fn chunk_end(table: &str, start: i64, chunk_size: i64) -> Result<i64, SyncError> {
    start
        .checked_add(chunk_size - 1)
        .ok_or_else(|| id_overflow(table, start))
}

fn id_overflow(table: &str, id: i64) -> SyncError {
    SyncError::fatal(format!("{table} id range overflows past {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InProcessMaster, MemorySource, RecordingSink};
    use sync_core::{ColumnSpec, ColumnType, TableSchema};

    fn settings(tables: &[&str], chunk_size: i64) -> IngestSettings {
        IngestSettings {
            default_chunk_size: chunk_size,
            backoff_unit: Duration::from_millis(1),
            tables: tables.iter().map(|t| t.to_string()).collect(),
            ..IngestSettings::default()
        }
    }

    fn party_schema() -> TableSchema {
        TableSchema::new(
            "party_party",
            vec![
                ColumnSpec::new("id", ColumnType::Int64).not_null(),
                ColumnSpec::new("party_name", ColumnType::VarChar { length: Some(255) })
                    .not_null(),
            ],
        )
    }

    #[tokio::test]
    async fn test_exact_multiple_of_chunk_size_needs_a_trailing_empty_chunk() {
        let source = Arc::new(MemorySource::new());
        source.add_table(
            "party_party",
            &["id", "party_name"],
            &[&["1", "Green"], &["2", "Libertarian"]],
        );
        let master = Arc::new(InProcessMaster::new(source));
        let sink = Arc::new(RecordingSink::new());
        sink.add_schema(party_schema());

        let ingestor =
            Ingestor::new(master.clone(), sink.clone(), settings(&["party_party"], 2)).unwrap();
        let report = ingestor.run().await.unwrap();

        assert_eq!(master.fetch_calls(), 2);
        assert_eq!(sink.truncate_calls("party_party"), 1);
        assert_eq!(report.rows_loaded(), 2);
        assert_eq!(report.tables[0].chunks, 2);
        assert_eq!(report.tables[0].sequence_next, Some(3));
    }

    #[tokio::test]
    async fn test_missing_local_table_skips_only_that_table() {
        let source = Arc::new(MemorySource::new());
        source.add_table("party_party", &["id", "party_name"], &[&["1", "Green"]]);
        source.add_table("issue_issue", &["id"], &[&["1"]]);
        let master = Arc::new(InProcessMaster::new(source));
        let sink = Arc::new(RecordingSink::new());
        sink.add_schema(party_schema());

        let ingestor = Ingestor::new(
            master,
            sink.clone(),
            settings(&["issue_issue", "party_party"], 10),
        )
        .unwrap();
        let report = ingestor.run().await.unwrap();

        let issue = &report.tables[0];
        assert_eq!(issue.table, "issue_issue");
        assert_eq!(
            issue.error.as_ref().map(SyncError::kind),
            Some(ErrorKind::SchemaMismatch)
        );
        assert_eq!(sink.truncate_calls("issue_issue"), 0);

        let party = &report.tables[1];
        assert!(party.succeeded());
        assert_eq!(party.rows_loaded, 1);
    }

    #[tokio::test]
    async fn test_rows_left_after_truncation_abort_the_table() {
        let source = Arc::new(MemorySource::new());
        source.add_table("party_party", &["id", "party_name"], &[&["1", "Green"]]);
        let master = Arc::new(InProcessMaster::new(source));
        let sink = Arc::new(RecordingSink::new());
        sink.add_schema(party_schema());
        sink.keep_rows_after_truncate("party_party", 5);

        let ingestor =
            Ingestor::new(master, sink.clone(), settings(&["party_party"], 10)).unwrap();
        let report = ingestor.run().await.unwrap();

        let party = &report.tables[0];
        assert_eq!(
            party.error.as_ref().map(SyncError::kind),
            Some(ErrorKind::SchemaMismatch)
        );
        assert!(sink.loaded_rows("party_party").is_empty());
        assert_eq!(party.sequence_next, None);
    }

    #[tokio::test]
    async fn test_runaway_table_is_fatal() {
        let source = Arc::new(MemorySource::new());
        let rows: Vec<Vec<String>> = (1..=10)
            .map(|id| vec![id.to_string(), format!("party {id}")])
            .collect();
        let rows: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(String::as_str).collect())
            .collect();
        let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
        source.add_table("party_party", &["id", "party_name"], &rows);
        let master = Arc::new(InProcessMaster::new(source));
        let sink = Arc::new(RecordingSink::new());
        sink.add_schema(party_schema());

        let mut settings = settings(&["party_party"], 1);
        settings.max_chunks_per_table = 3;
        let ingestor = Ingestor::new(master.clone(), sink, settings).unwrap();

        let err = ingestor.run().await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(master.fetch_calls(), 3);
    }

    #[tokio::test]
    async fn test_id_range_overflow_is_fatal() {
        let source = Arc::new(MemorySource::new());
        source.add_table("party_party", &["id", "party_name"], &[&["1", "Green"]]);
        let master = Arc::new(InProcessMaster::new(source));
        let sink = Arc::new(RecordingSink::new());
        sink.add_schema(party_schema());

        let mut settings = settings(&["party_party"], 3);
        settings.first_id = i64::MAX - 1;
        let ingestor = Ingestor::new(master.clone(), sink.clone(), settings).unwrap();

        let err = ingestor.run().await.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.message().contains("overflows"));
        assert_eq!(master.fetch_calls(), 0);
        assert_eq!(sink.truncate_calls("party_party"), 0);
    }

    #[tokio::test]
    async fn test_unknown_table_in_settings_is_rejected() {
        let master = Arc::new(InProcessMaster::new(Arc::new(MemorySource::new())));
        let sink = Arc::new(RecordingSink::new());

        let err = Ingestor::new(master, sink, settings(&["voter_voter"], 10))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::NotAllowed);
    }

    #[tokio::test]
    async fn test_progress_is_reported_per_chunk_and_finished() {
        let source = Arc::new(MemorySource::new());
        source.add_table(
            "party_party",
            &["id", "party_name"],
            &[&["1", "Green"], &["2", "Libertarian"], &["3", "Peace"]],
        );
        let master = Arc::new(InProcessMaster::new(source));
        let sink = Arc::new(RecordingSink::new());
        sink.add_schema(party_schema());

        let ingestor = Ingestor::new(master.clone(), sink, settings(&["party_party"], 2))
            .unwrap()
            .with_session_token("device-1");
        ingestor.run().await.unwrap();

        let state = master.progress_state("device-1").await.unwrap();
        assert!(!state.is_running);
        assert_eq!(state.current_record_count, 3);
        assert_eq!(state.current_chunk, 2);
        assert_eq!(state.current_table, "party_party");
        assert_eq!(state.total_record_count, 3);
    }
}
