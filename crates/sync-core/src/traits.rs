//! Database seams for the two sides of a sync.
//!
//! The master reads through a [`TableSource`], the client writes through a
//! [`TableSink`]. The PostgreSQL implementations live in the `postgresql`
//! crate; tests use in-memory ones.

use crate::schema::TableSchema;
use crate::values::LoadBatch;
use async_trait::async_trait;

/// Read side, against the primary database.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// `COUNT(*)` of one table.
    async fn count_rows(&self, table_name: &str) -> anyhow::Result<i64>;

    /// Rows with `start <= id <= end`, ordered by id, as a pipe-delimited
    /// payload with a header line and `\N` for NULL.
    async fn export_range(&self, table_name: &str, start: i64, end: i64)
        -> anyhow::Result<String>;
}

/// Write side, against the local database.
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Introspect the destination table.
    async fn table_schema(&self, table_name: &str) -> anyhow::Result<TableSchema>;

    /// Empty the table and return how many rows remain afterwards.
    async fn truncate_table(&self, table_name: &str) -> anyhow::Result<i64>;

    /// Append the batch and return the number of rows written.
    async fn bulk_load(&self, batch: &LoadBatch) -> anyhow::Result<u64>;

    /// Point the table's id sequence past `max(id)`. Returns the next value
    /// the sequence will hand out, or `None` when the table has no sequence.
    async fn reset_sequence(&self, table_name: &str) -> anyhow::Result<Option<i64>>;
}
