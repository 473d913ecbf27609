//! Command-line interface for fast-load
//!
//! # Usage Examples
//!
//! ## Master
//! ```bash
//! # Serve the sync API; exports read from the DATABASE_*_READONLY database,
//! # progress records are kept in the DATABASE_* database
//! fast-load serve --bind 0.0.0.0:8000
//!
//! # Keep progress in memory instead
//! fast-load serve --bind 127.0.0.1:8000 --progress-backend memory
//! ```
//!
//! ## Client
//! ```bash
//! # Pull every allowed table into the DATABASE_* database
//! fast-load pull --master-url http://master:8000 --session-token device-1
//!
//! # Pull two tables with a settings file
//! fast-load pull --master-url http://master:8000 --session-token device-1 \
//!   --settings fast-load.toml --table election_election --table party_party
//!
//! # Progress of a running pull
//! fast-load status --master-url http://master:8000 --session-token device-1
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use fast_load::config::IngestSettings;
use fast_load::ingest::{HttpMasterClient, Ingestor, MasterApi};
use fast_load::master::{serve, AppState, Extractor, Tracker};
use fast_load::{DatabaseOpts, ReadonlyDatabaseOpts};
use fast_load_postgresql::{check_connection, new_pool, DatabaseConfig, PostgresSink, PostgresSource};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use sync_core::TableRegistry;
use sync_progress::{MemoryProgressStore, PostgresProgressStore, ProgressStore};
use tracing::info;

#[derive(Parser)]
#[command(name = "fast-load")]
#[command(about = "Copy allow-listed tables from a master server into a local database")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the extractor and progress tracker over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8000", env = "FAST_LOAD_BIND")]
        bind: SocketAddr,

        /// Database the tables are exported from
        #[command(flatten)]
        readonly_opts: ReadonlyDatabaseOpts,

        /// Database holding progress records (postgres backend only)
        #[command(flatten)]
        db_opts: DatabaseOpts,

        /// Where progress records are kept
        #[arg(long, value_enum, default_value = "postgres")]
        progress_backend: ProgressBackend,
    },

    /// Pull every allowed table from the master into the local database
    Pull {
        #[arg(long, env = "FAST_LOAD_MASTER_URL")]
        master_url: String,

        /// Opaque token identifying this client's progress record
        #[arg(long, env = "FAST_LOAD_SESSION_TOKEN")]
        session_token: String,

        /// TOML file with ingest settings
        #[arg(long, value_name = "PATH")]
        settings: Option<PathBuf>,

        /// Only pull these tables (repeatable); overrides the settings file
        #[arg(long = "table", value_name = "TABLE")]
        tables: Vec<String>,

        /// Rows per chunk; overrides the settings file
        #[arg(long)]
        chunk_size: Option<i64>,

        /// Local database
        #[command(flatten)]
        db_opts: DatabaseOpts,
    },

    /// Print the master's total row count over all allowed tables
    RowCount {
        #[arg(long, env = "FAST_LOAD_MASTER_URL")]
        master_url: String,

        /// Request timeout, e.g. "5s" or "500ms"
        #[arg(long, default_value = "5s")]
        timeout: String,
    },

    /// Print the progress record of a session
    Status {
        #[arg(long, env = "FAST_LOAD_MASTER_URL")]
        master_url: String,

        #[arg(long, env = "FAST_LOAD_SESSION_TOKEN")]
        session_token: String,

        /// Request timeout, e.g. "5s" or "500ms"
        #[arg(long, default_value = "5s")]
        timeout: String,
    },

    /// List the tables eligible for sync, in load order
    Tables,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProgressBackend {
    Postgres,
    Memory,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            readonly_opts,
            db_opts,
            progress_backend,
        } => run_serve(bind, &readonly_opts, &db_opts, progress_backend).await,
        Commands::Pull {
            master_url,
            session_token,
            settings,
            tables,
            chunk_size,
            db_opts,
        } => run_pull(&master_url, &session_token, settings, tables, chunk_size, &db_opts).await,
        Commands::RowCount {
            master_url,
            timeout,
        } => {
            let client = master_client(&master_url, &timeout)?;
            let count = client
                .row_count()
                .await
                .context("Failed to fetch the row count")?;
            println!("{count}");
            Ok(())
        }
        Commands::Status {
            master_url,
            session_token,
            timeout,
        } => {
            let client = master_client(&master_url, &timeout)?;
            let progress = client
                .progress(&session_token, false)
                .await
                .context("Failed to fetch progress")?;
            println!("{}", serde_json::to_string_pretty(&progress)?);
            if !progress.success {
                anyhow::bail!("No progress for session {session_token}: {}", progress.status);
            }
            Ok(())
        }
        Commands::Tables => {
            for table in TableRegistry::default().list_allowed() {
                println!("{table}");
            }
            Ok(())
        }
    }
}

async fn run_serve(
    bind: SocketAddr,
    readonly_opts: &ReadonlyDatabaseOpts,
    db_opts: &DatabaseOpts,
    progress_backend: ProgressBackend,
) -> anyhow::Result<()> {
    let readonly_config = DatabaseConfig::from(readonly_opts);
    let readonly_pool = new_pool(&readonly_config)?;
    check_connection(&readonly_pool, &readonly_config).await?;

    let store: Arc<dyn ProgressStore> = match progress_backend {
        ProgressBackend::Postgres => {
            let config = DatabaseConfig::from(db_opts);
            let pool = new_pool(&config)?;
            check_connection(&pool, &config).await?;
            let store = PostgresProgressStore::new(pool);
            store
                .ensure_table()
                .await
                .context("Failed to create the progress table")?;
            Arc::new(store)
        }
        ProgressBackend::Memory => {
            info!("Keeping progress records in memory");
            Arc::new(MemoryProgressStore::new())
        }
    };

    let extractor = Arc::new(Extractor::new(
        Arc::new(PostgresSource::new(readonly_pool)),
        TableRegistry::default(),
    ));
    let tracker = Arc::new(Tracker::new(extractor.clone(), store));

    serve(bind, AppState::new(extractor, tracker)).await
}

async fn run_pull(
    master_url: &str,
    session_token: &str,
    settings_path: Option<PathBuf>,
    tables: Vec<String>,
    chunk_size: Option<i64>,
    db_opts: &DatabaseOpts,
) -> anyhow::Result<()> {
    let mut settings = match settings_path {
        Some(path) => IngestSettings::from_file(&path)?,
        None => IngestSettings::default(),
    };
    if !tables.is_empty() {
        settings.tables = tables;
    }
    if let Some(chunk_size) = chunk_size {
        settings.default_chunk_size = chunk_size;
    }
    settings.validate()?;

    let config = DatabaseConfig::from(db_opts);
    let pool = new_pool(&config)?;
    check_connection(&pool, &config).await?;

    let master = HttpMasterClient::new(master_url, settings.request_timeout)?;
    info!("Pulling from {}", master.base_url());

    let ingestor = Ingestor::new(Arc::new(master), Arc::new(PostgresSink::new(pool)), settings)?
        .with_session_token(session_token);
    let report = ingestor.run().await.context("Sync aborted")?;

    let failed: Vec<&str> = report.failed_tables().map(|t| t.table.as_str()).collect();
    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} tables failed: {}",
            failed.len(),
            report.tables.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

fn master_client(master_url: &str, timeout: &str) -> anyhow::Result<HttpMasterClient> {
    let timeout: Duration = fast_load::config::parse_duration(timeout)
        .with_context(|| format!("Invalid timeout: {timeout}"))?;
    HttpMasterClient::new(master_url, timeout)
}
