//! Core types for the fast-load framework.
//!
//! This crate provides the foundational types shared by the master extractor
//! and the client ingestor:
//!
//! - [`registry`] - The ordered allow-list of tables eligible for sync
//! - [`protocol`] - JSON bodies and query strings of the HTTP surface
//! - [`payload`] - Parsing of pipe-delimited chunk payloads
//! - [`clean`] - Schema-aware cleaning and type coercion of parsed rows
//! - [`ColumnType`] / [`TableSchema`] - The local column-type catalog
//! - [`Cell`] / [`LoadBatch`] - Typed values ready for bulk load
//! - [`TableSource`] / [`TableSink`] - Database seams for both sides
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── postgresql-types   (column type mapping, COPY text encoding)
//!    ├─── postgresql         (implements TableSource / TableSink)
//!    ├─── sync-progress      (SyncJobState and its stores)
//!    │
//!    └─── fast-load          (master HTTP service, client ingestor, CLI)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sync_core::payload::parse_payload;
//!
//! let chunk = parse_payload("id|name\n1|Alice\n2|Bob|extra\n");
//! assert_eq!(chunk.columns, vec!["id", "name"]);
//! assert_eq!(chunk.rows.len(), 1);
//! assert_eq!(chunk.rejected, 1);
//! ```

pub mod clean;
pub mod error;
pub mod payload;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod traits;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use clean::{clean_chunk, Cleaner, IdHighWater};
pub use error::{ErrorKind, SyncError};
pub use payload::{parse_payload, ParsedChunk};
pub use protocol::{
    ChunkRequest, ChunkResponse, ProgressQuery, ProgressResponse, ProgressUpdateQuery,
    ProgressUpdateResponse, RowCountResponse,
};
pub use registry::{TableRegistry, TableRules, ALLOWED_TABLES, DUMMY_ID_COLUMNS};
pub use schema::{ColumnSpec, TableSchema};
pub use traits::{TableSink, TableSource};
pub use types::ColumnType;
pub use values::{Cell, LoadBatch};
