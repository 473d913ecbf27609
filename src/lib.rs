//! fast-load
//!
//! Copies an allow-listed set of tables from a master server's database into a
//! client's local database, in id-range chunks over HTTP.
//!
//! # Components
//!
//! - [`master`] - The extractor and progress tracker, served over HTTP
//! - [`ingest`] - The client loop: fetch, parse, clean and bulk-load each chunk
//! - [`config`] - Ingest tuning loaded from a TOML settings file
//! - [`testing`] - In-memory database and master doubles
//!
//! Wire types, the table registry and the cleaning passes live in `sync_core`;
//! PostgreSQL access lives in `fast_load_postgresql`; progress records live in
//! `sync_progress`.
//!
//! # CLI Usage
//!
//! ```bash
//! # On the master
//! fast-load serve --bind 0.0.0.0:8000
//!
//! # On a client
//! fast-load pull --master-url http://master:8000 --session-token device-1
//!
//! # Inspect
//! fast-load row-count --master-url http://master:8000
//! fast-load status --master-url http://master:8000 --session-token device-1
//! ```

use clap::Parser;
use fast_load_postgresql::DatabaseConfig;

pub mod config;
pub mod ingest;
pub mod master;
pub mod testing;

/// The database the master exports from. Only read.
#[derive(Parser, Clone, Debug)]
pub struct ReadonlyDatabaseOpts {
    #[arg(long, default_value = "localhost", env = "DATABASE_HOST_READONLY")]
    pub readonly_host: String,

    #[arg(long, default_value = "5432", env = "DATABASE_PORT_READONLY")]
    pub readonly_port: u16,

    #[arg(long, default_value = "postgres", env = "DATABASE_USER_READONLY")]
    pub readonly_user: String,

    #[arg(
        long,
        default_value = "",
        env = "DATABASE_PASSWORD_READONLY",
        hide_env_values = true
    )]
    pub readonly_password: String,

    #[arg(long, default_value = "postgres", env = "DATABASE_NAME_READONLY")]
    pub readonly_name: String,

    /// Pooled connections to the read-only database
    #[arg(long, default_value = "8")]
    pub readonly_max_connections: usize,
}

/// A read-write database: the client's local copy, or the master's own
/// database holding progress records.
#[derive(Parser, Clone, Debug)]
pub struct DatabaseOpts {
    #[arg(long, default_value = "localhost", env = "DATABASE_HOST")]
    pub db_host: String,

    #[arg(long, default_value = "5432", env = "DATABASE_PORT")]
    pub db_port: u16,

    #[arg(long, default_value = "postgres", env = "DATABASE_USER")]
    pub db_user: String,

    #[arg(
        long,
        default_value = "",
        env = "DATABASE_PASSWORD",
        hide_env_values = true
    )]
    pub db_password: String,

    #[arg(long, default_value = "postgres", env = "DATABASE_NAME")]
    pub db_name: String,

    /// Pooled connections to the database
    #[arg(long, default_value = "4")]
    pub db_max_connections: usize,
}

// CLI type → PostgreSQL library type conversions
impl From<&ReadonlyDatabaseOpts> for DatabaseConfig {
    fn from(opts: &ReadonlyDatabaseOpts) -> Self {
        Self {
            host: opts.readonly_host.clone(),
            port: opts.readonly_port,
            user: opts.readonly_user.clone(),
            password: opts.readonly_password.clone(),
            dbname: opts.readonly_name.clone(),
            max_connections: opts.readonly_max_connections,
        }
    }
}

impl From<&DatabaseOpts> for DatabaseConfig {
    fn from(opts: &DatabaseOpts) -> Self {
        Self {
            host: opts.db_host.clone(),
            port: opts.db_port,
            user: opts.db_user.clone(),
            password: opts.db_password.clone(),
            dbname: opts.db_name.clone(),
            max_connections: opts.db_max_connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_opts_from_flags() {
        let opts = DatabaseOpts::parse_from([
            "fast-load",
            "--db-host",
            "db.local",
            "--db-port",
            "6543",
            "--db-name",
            "wevote",
        ]);
        let config = DatabaseConfig::from(&opts);
        assert_eq!(config.host, "db.local");
        assert_eq!(config.port, 6543);
        assert_eq!(config.dbname, "wevote");
        assert_eq!(config.max_connections, 4);
    }

    #[test]
    fn test_readonly_opts_from_flags() {
        let opts = ReadonlyDatabaseOpts::parse_from([
            "fast-load",
            "--readonly-host",
            "replica",
            "--readonly-user",
            "reader",
        ]);
        let config = DatabaseConfig::from(&opts);
        assert_eq!(config.host, "replica");
        assert_eq!(config.user, "reader");
        assert_eq!(config.max_connections, 8);
    }
}
