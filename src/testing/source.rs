use super::lock;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use sync_core::payload::DELIMITER;
use sync_core::registry::PRIMARY_KEY_COLUMN;
use sync_core::TableSource;

#[derive(Debug, Default)]
struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// A [`TableSource`] over tables held in memory.
///
/// Cells are stored exactly as they go on the wire, so `\N` is NULL. A table
/// that was never added counts as empty but cannot be exported.
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: Mutex<BTreeMap<String, MemoryTable>>,
    failing_counts: Mutex<BTreeSet<String>>,
    export_calls: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&self, table_name: &str, columns: &[&str], rows: &[&[&str]]) {
        let table = MemoryTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        };
        lock(&self.tables).insert(table_name.to_string(), table);
    }

    /// Make `count_rows` fail for `table_name`.
    pub fn fail_counts_for(&self, table_name: &str) {
        lock(&self.failing_counts).insert(table_name.to_string());
    }

    pub fn export_calls(&self) -> usize {
        self.export_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableSource for MemorySource {
    async fn count_rows(&self, table_name: &str) -> anyhow::Result<i64> {
        if lock(&self.failing_counts).contains(table_name) {
            anyhow::bail!("canceling statement due to statement timeout");
        }
        let tables = lock(&self.tables);
        Ok(tables.get(table_name).map_or(0, |t| t.rows.len() as i64))
    }

    async fn export_range(
        &self,
        table_name: &str,
        start: i64,
        end: i64,
    ) -> anyhow::Result<String> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);

        let tables = lock(&self.tables);
        let table = tables
            .get(table_name)
            .ok_or_else(|| anyhow::anyhow!("relation \"{table_name}\" does not exist"))?;
        let id_index = table
            .columns
            .iter()
            .position(|c| c == PRIMARY_KEY_COLUMN)
            .ok_or_else(|| anyhow::anyhow!("{table_name} has no {PRIMARY_KEY_COLUMN} column"))?;

        let separator = DELIMITER.to_string();
        let mut rows: Vec<&Vec<String>> = table
            .rows
            .iter()
            .filter(|row| {
                row.get(id_index)
                    .and_then(|id| id.parse::<i64>().ok())
                    .is_some_and(|id| start <= id && id <= end)
            })
            .collect();
        rows.sort_by_key(|row| row.get(id_index).and_then(|id| id.parse::<i64>().ok()));

        let mut payload = table.columns.join(&separator);
        payload.push('\n');
        for row in rows {
            payload.push_str(&row.join(&separator));
            payload.push('\n');
        }
        Ok(payload)
    }
}
