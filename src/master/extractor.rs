use std::sync::Arc;
use std::time::Instant;
use sync_core::{ChunkResponse, SyncError, TableRegistry, TableSource};
use tracing::{error, info};

/// Read-only export of allow-listed tables from the primary database.
pub struct Extractor {
    source: Arc<dyn TableSource>,
    registry: TableRegistry,
}

impl Extractor {
    pub fn new(source: Arc<dyn TableSource>, registry: TableRegistry) -> Self {
        Self { source, registry }
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Sum of `COUNT(*)` over every allowed table. The first failure aborts
    /// the sum.
    pub async fn total_row_count(&self) -> Result<i64, SyncError> {
        let mut total = 0i64;
        for table in self.registry.list_allowed() {
            let count = self.source.count_rows(table).await.map_err(|e| {
                error!("Counting rows of {table} failed: {e:#}");
                SyncError::fatal(format!("counting rows of {table} failed: {e:#}"))
            })?;
            total += count;
        }
        Ok(total)
    }

    /// Rows `start..=end` of one table. Tables outside the registry are
    /// refused before the database is touched.
    pub async fn get_chunk(&self, table_name: &str, start: i64, end: i64) -> ChunkResponse {
        if !self.registry.is_allowed(table_name) {
            let err = SyncError::not_allowed(table_name);
            info!("Refusing chunk request: {}", err.message());
            return ChunkResponse::failed(err.message());
        }

        let started = Instant::now();
        match self.source.export_range(table_name, start, end).await {
            Ok(payload) => {
                let elapsed = started.elapsed().as_secs_f64();
                info!("Extracting the {table_name} table took {elapsed:.3} seconds");
                ChunkResponse::ok(
                    table_name,
                    payload,
                    format!("exported {table_name} ids {start}..={end} in {elapsed:.3}s"),
                )
            }
            Err(e) => {
                error!("Exporting {table_name} ids {start}..={end} failed: {e:#}");
                ChunkResponse::failed(format!("export of {table_name} failed: {e:#}"))
            }
        }
    }
}
