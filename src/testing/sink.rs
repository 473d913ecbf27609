use super::lock;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use sync_core::registry::PRIMARY_KEY_COLUMN;
use sync_core::{Cell, LoadBatch, TableSchema, TableSink};

#[derive(Debug, Default)]
struct SinkState {
    schemas: BTreeMap<String, TableSchema>,
    columns: BTreeMap<String, Vec<String>>,
    rows: BTreeMap<String, Vec<Vec<Cell>>>,
    truncate_calls: BTreeMap<String, usize>,
    rows_surviving_truncate: BTreeMap<String, i64>,
    load_calls: usize,
}

/// A [`TableSink`] that keeps everything it is given.
///
/// Only tables registered with [`RecordingSink::add_schema`] exist.
#[derive(Debug, Default)]
pub struct RecordingSink {
    state: Mutex<SinkState>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_schema(&self, schema: TableSchema) {
        lock(&self.state)
            .schemas
            .insert(schema.name.clone(), schema);
    }

    /// Make truncation of `table_name` report `rows` rows left behind.
    pub fn keep_rows_after_truncate(&self, table_name: &str, rows: i64) {
        lock(&self.state)
            .rows_surviving_truncate
            .insert(table_name.to_string(), rows);
    }

    pub fn truncate_calls(&self, table_name: &str) -> usize {
        lock(&self.state)
            .truncate_calls
            .get(table_name)
            .copied()
            .unwrap_or(0)
    }

    pub fn load_calls(&self) -> usize {
        lock(&self.state).load_calls
    }

    pub fn loaded_rows(&self, table_name: &str) -> Vec<Vec<Cell>> {
        lock(&self.state)
            .rows
            .get(table_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Values of one column across every loaded row of `table_name`.
    pub fn loaded_column(&self, table_name: &str, column: &str) -> Vec<Cell> {
        let state = lock(&self.state);
        let Some(index) = state
            .columns
            .get(table_name)
            .and_then(|cols| cols.iter().position(|c| c == column))
        else {
            return Vec::new();
        };
        state
            .rows
            .get(table_name)
            .map(|rows| rows.iter().filter_map(|r| r.get(index).cloned()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TableSink for RecordingSink {
    async fn table_schema(&self, table_name: &str) -> anyhow::Result<TableSchema> {
        lock(&self.state)
            .schemas
            .get(table_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("relation \"{table_name}\" does not exist"))
    }

    async fn truncate_table(&self, table_name: &str) -> anyhow::Result<i64> {
        let mut state = lock(&self.state);
        *state.truncate_calls.entry(table_name.to_string()).or_default() += 1;
        state.rows.remove(table_name);
        Ok(state
            .rows_surviving_truncate
            .get(table_name)
            .copied()
            .unwrap_or(0))
    }

    async fn bulk_load(&self, batch: &LoadBatch) -> anyhow::Result<u64> {
        let mut state = lock(&self.state);
        state.load_calls += 1;

        let columns: Vec<String> = batch.column_names().into_iter().map(String::from).collect();
        if let Some(existing) = state.columns.get(&batch.table) {
            if *existing != columns {
                anyhow::bail!("column list of {} changed between chunks", batch.table);
            }
        }
        state.columns.insert(batch.table.clone(), columns);
        state
            .rows
            .entry(batch.table.clone())
            .or_default()
            .extend(batch.rows.iter().cloned());
        Ok(batch.len() as u64)
    }

    async fn reset_sequence(&self, table_name: &str) -> anyhow::Result<Option<i64>> {
        let state = lock(&self.state);
        let has_id = state
            .schemas
            .get(table_name)
            .is_some_and(|s| s.column(PRIMARY_KEY_COLUMN).is_some());
        if !has_id {
            return Ok(None);
        }

        let index = state
            .columns
            .get(table_name)
            .and_then(|cols| cols.iter().position(|c| c == PRIMARY_KEY_COLUMN));
        let max_id = match (index, state.rows.get(table_name)) {
            (Some(index), Some(rows)) => rows
                .iter()
                .filter_map(|r| r.get(index).and_then(Cell::as_int))
                .max()
                .unwrap_or(0),
            _ => 0,
        };
        Ok(Some(max_id + 1))
    }
}
