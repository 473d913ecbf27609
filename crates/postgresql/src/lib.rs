//! PostgreSQL access for fast-load
//!
//! This library provides the database side of both ends of a sync:
//!
//! - [`PostgresSource`] exports id ranges of a table on the primary database
//!   with `COPY ... TO STDOUT`
//! - [`PostgresSink`] introspects, truncates and bulk-loads tables on the local
//!   database with `COPY ... FROM STDIN`
//!
//! Connections come from a `deadpool-postgres` pool built by [`new_pool`] and
//! are held only for one unit of work.

mod catalog;
mod extract;
mod load;

pub use catalog::load_table_schema;
pub use extract::{copy_out_query, PostgresSource};
pub use load::{copy_in_statement, PostgresSink};

use anyhow::{Context, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use std::time::Duration;
use tokio_postgres::NoTls;
use tracing::info;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters of one PostgreSQL database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    /// Upper bound of pooled connections.
    pub max_connections: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "postgres".to_string(),
            max_connections: 8,
        }
    }
}

impl DatabaseConfig {
    /// `host:port/dbname`, safe to log.
    pub fn describe(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.dbname)
    }

    fn pg_config(&self) -> tokio_postgres::Config {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config.host(&self.host);
        pg_config.port(self.port);
        pg_config.user(&self.user);
        pg_config.dbname(&self.dbname);
        if !self.password.is_empty() {
            pg_config.password(&self.password);
        }
        pg_config.keepalives(true);
        pg_config.connect_timeout(CONNECT_TIMEOUT);
        pg_config
    }
}

/// Build a connection pool. No connection is opened until first use.
pub fn new_pool(config: &DatabaseConfig) -> Result<Pool> {
    let mgr_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(config.pg_config(), NoTls, mgr_config);
    Pool::builder(mgr)
        .max_size(config.max_connections.max(1))
        .build()
        .with_context(|| format!("Failed to build connection pool for {}", config.describe()))
}

/// Open one connection and run a trivial query.
pub async fn check_connection(pool: &Pool, config: &DatabaseConfig) -> Result<()> {
    let client = pool
        .get()
        .await
        .with_context(|| format!("Failed to connect to {}", config.describe()))?;
    client.simple_query("SELECT 1").await?;
    info!("Connected to PostgreSQL: {}", config.describe());
    Ok(())
}

/// Quote a PostgreSQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `public."table"`
pub fn qualified_table(table_name: &str) -> String {
    format!("public.{}", quote_ident(table_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("party_party"), "\"party_party\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(qualified_table("issue_issue"), "public.\"issue_issue\"");
    }

    #[test]
    fn test_describe_omits_password() {
        let config = DatabaseConfig {
            password: "hunter2".into(),
            ..DatabaseConfig::default()
        };
        assert_eq!(config.describe(), "localhost:5432/postgres");
    }
}
