//! Ingest settings.
//!
//! Every field has a default, so an empty or partial TOML file is valid:
//!
//! ```toml
//! default_chunk_size = 250000
//! max_attempts = 10
//! backoff_unit = "1s"
//! request_timeout = "5s"
//! max_chunks_per_table = 1000
//! tables = ["election_election", "party_party"]
//!
//! [chunk_size_overrides]
//! ballot_ballotitem = 100000
//! ```

mod duration;

pub use duration::parse_duration;

use crate::ingest::RetryPolicy;
use anyhow::Context;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use sync_core::registry::{rules_for, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestSettings {
    /// Rows per chunk for tables without an override.
    pub default_chunk_size: i64,
    /// First id requested for every table.
    pub first_id: i64,
    /// Attempts per chunk request before the job is aborted.
    pub max_attempts: u32,
    /// Delay before retry `n` is `backoff_unit * 2^n`.
    #[serde(deserialize_with = "duration_from_str")]
    pub backoff_unit: Duration,
    /// Timeout of each HTTP request to the master.
    #[serde(deserialize_with = "duration_from_str")]
    pub request_timeout: Duration,
    /// Chunks per table before the job is aborted as a runaway loop.
    pub max_chunks_per_table: u64,
    /// Per-table chunk sizes; these win over the built-in table rules.
    pub chunk_size_overrides: BTreeMap<String, i64>,
    /// Restrict the run to these tables. Empty means every allowed table.
    pub tables: Vec<String>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            default_chunk_size: DEFAULT_CHUNK_SIZE,
            first_id: 1,
            max_attempts: 10,
            backoff_unit: Duration::from_secs(1),
            request_timeout: Duration::from_secs(5),
            max_chunks_per_table: 1000,
            chunk_size_overrides: BTreeMap::new(),
            tables: Vec::new(),
        }
    }
}

impl IngestSettings {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_chunk_size <= 0 {
            anyhow::bail!("default_chunk_size must be positive");
        }
        if let Some((table, size)) = self.chunk_size_overrides.iter().find(|(_, s)| **s <= 0) {
            anyhow::bail!("chunk size override for {table} must be positive, got {size}");
        }
        if self.first_id < 0 {
            anyhow::bail!("first_id must not be negative, got {}", self.first_id);
        }
        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be at least 1");
        }
        if self.max_chunks_per_table == 0 {
            anyhow::bail!("max_chunks_per_table must be at least 1");
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.backoff_unit)
    }

    /// Override from settings, then the table's built-in rule, then the default.
    pub fn chunk_size_for(&self, table_name: &str) -> i64 {
        self.chunk_size_overrides
            .get(table_name)
            .copied()
            .or(rules_for(table_name).chunk_size)
            .unwrap_or(self.default_chunk_size)
    }
}

fn duration_from_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}
