//! Load side: introspection, truncation, COPY FROM STDIN and sequence reset on
//! the local database.

use crate::{qualified_table, quote_ident};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use deadpool_postgres::Pool;
use futures::SinkExt;
use postgresql_types::encode_batch;
use sync_core::registry::PRIMARY_KEY_COLUMN;
use sync_core::{LoadBatch, TableSchema, TableSink};
use tracing::{debug, info};

/// `COPY` statement for the text format, naming `columns` explicitly.
pub fn copy_in_statement(table_name: &str, columns: &[&str]) -> String {
    let col_list: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    format!(
        "COPY {} ({}) FROM STDIN",
        qualified_table(table_name),
        col_list.join(", ")
    )
}

/// [`TableSink`] over a pool on the local database.
#[derive(Clone)]
pub struct PostgresSink {
    pool: Pool,
}

impl PostgresSink {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableSink for PostgresSink {
    async fn table_schema(&self, table_name: &str) -> Result<TableSchema> {
        let client = self.pool.get().await.context("Failed to get connection")?;
        crate::catalog::load_table_schema(&client, table_name).await
    }

    async fn truncate_table(&self, table_name: &str) -> Result<i64> {
        let client = self.pool.get().await.context("Failed to get connection")?;
        let table = qualified_table(table_name);

        client
            .batch_execute(&format!("TRUNCATE TABLE {table} CASCADE"))
            .await
            .with_context(|| format!("Failed to truncate {table_name}"))?;

        let row = client
            .query_one(&format!("SELECT COUNT(*) FROM {table}"), &[])
            .await
            .with_context(|| format!("Failed to count rows of {table_name}"))?;
        let remaining: i64 = row.get(0);

        debug!("Truncated {table_name}, {remaining} rows remain");
        Ok(remaining)
    }

    async fn bulk_load(&self, batch: &LoadBatch) -> Result<u64> {
        if batch.is_empty() || batch.columns.is_empty() {
            return Ok(0);
        }

        let client = self.pool.get().await.context("Failed to get connection")?;
        let statement = copy_in_statement(&batch.table, &batch.column_names());
        let data = Bytes::from(encode_batch(batch));

        let sink = client
            .copy_in(&statement)
            .await
            .with_context(|| format!("Failed to start COPY into {}", batch.table))?;
        tokio::pin!(sink);

        sink.send(data)
            .await
            .with_context(|| format!("Failed to send COPY data for {}", batch.table))?;
        let written = sink
            .finish()
            .await
            .with_context(|| format!("Failed to finish COPY into {}", batch.table))?;

        debug!("Copied {} rows into {}", written, batch.table);
        Ok(written)
    }

    async fn reset_sequence(&self, table_name: &str) -> Result<Option<i64>> {
        let client = self.pool.get().await.context("Failed to get connection")?;
        let table = qualified_table(table_name);

        let row = client
            .query_one(
                "SELECT pg_get_serial_sequence($1, $2)",
                &[&table, &PRIMARY_KEY_COLUMN],
            )
            .await
            .with_context(|| format!("Failed to look up id sequence of {table_name}"))?;
        let Some(sequence) = row.get::<_, Option<String>>(0) else {
            return Ok(None);
        };

        let query = format!(
            "SELECT setval($1::text::regclass, COALESCE((SELECT MAX({pk}) FROM {table}), 0) + 1, false)",
            pk = quote_ident(PRIMARY_KEY_COLUMN),
        );
        let row = client
            .query_one(&query, &[&sequence])
            .await
            .with_context(|| format!("Failed to reset sequence {sequence}"))?;
        let next: i64 = row.get(0);

        info!("Reset sequence {sequence}, next id is {next}");
        Ok(Some(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_in_statement() {
        assert_eq!(
            copy_in_statement("party_party", &["id", "party_name"]),
            "COPY public.\"party_party\" (\"id\", \"party_name\") FROM STDIN"
        );
    }
}
