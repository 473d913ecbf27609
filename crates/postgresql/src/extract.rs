//! Export side: row counts and id-range payloads from the primary database.

use crate::qualified_table;
use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use futures::StreamExt;
use sync_core::registry::PRIMARY_KEY_COLUMN;
use sync_core::TableSource;
use tracing::debug;

/// `COPY` statement that writes rows `start..=end` of a table as a
/// pipe-delimited payload with a header line and `\N` for NULL.
pub fn copy_out_query(table_name: &str, start: i64, end: i64) -> String {
    format!(
        "COPY (SELECT * FROM {table} WHERE {pk} BETWEEN {start} AND {end} ORDER BY {pk}) \
         TO STDOUT WITH (FORMAT csv, HEADER, DELIMITER '|', NULL '\\N')",
        table = qualified_table(table_name),
        pk = crate::quote_ident(PRIMARY_KEY_COLUMN),
    )
}

/// [`TableSource`] over a pool on the primary database.
#[derive(Clone)]
pub struct PostgresSource {
    pool: Pool,
}

impl PostgresSource {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableSource for PostgresSource {
    async fn count_rows(&self, table_name: &str) -> Result<i64> {
        let client = self.pool.get().await.context("Failed to get connection")?;
        let query = format!("SELECT COUNT(*) FROM {}", qualified_table(table_name));
        let row = client
            .query_one(&query, &[])
            .await
            .with_context(|| format!("Failed to count rows of {table_name}"))?;
        Ok(row.get(0))
    }

    async fn export_range(&self, table_name: &str, start: i64, end: i64) -> Result<String> {
        let client = self.pool.get().await.context("Failed to get connection")?;
        let query = copy_out_query(table_name, start, end);
        debug!("Exporting {table_name} with: {query}");

        let stream = client
            .copy_out(&query)
            .await
            .with_context(|| format!("Failed to start COPY of {table_name}"))?;
        tokio::pin!(stream);

        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.with_context(|| format!("Failed to read COPY data of {table_name}"))?;
            buf.extend_from_slice(&bytes);
        }

        String::from_utf8(buf).with_context(|| format!("COPY output of {table_name} is not UTF-8"))
    }
}
