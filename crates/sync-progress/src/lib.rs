//! Progress records for fast-load
//!
//! Provides the persisted per-session [`SyncJobState`] that both the master
//! and the client read and write over HTTP, and the storage backends for it.
//!
//! # Architecture
//!
//! - [`SyncJobState`] - One row per session token
//! - [`ProgressUpdate`] - A partial, additive change to a state
//! - [`ProgressStore`] - Storage-agnostic reset/load/apply
//!
//! ## Storage Backends
//!
//! - `PostgresProgressStore` - Table `fast_load_sync_job_state`; increments are
//!   applied in a single `UPDATE` so concurrent updates never lose records
//! - `MemoryProgressStore` - Process-local map for tests and single-process runs
//!
//! # Example
//!
//! ```rust
//! use sync_progress::{MemoryProgressStore, ProgressStore, ProgressUpdate};
//!
//! # tokio_test_block_on(async {
//! let store = MemoryProgressStore::new();
//! store.reset("session", 10, chrono::Utc::now()).await.unwrap();
//! store
//!     .apply("session", &ProgressUpdate::records("party_party", 1, 4))
//!     .await
//!     .unwrap();
//! let state = store.load("session").await.unwrap().unwrap();
//! assert_eq!(state.current_record_count, 4);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod memory;
mod postgres;
mod state;
pub mod store;

#[cfg(test)]
mod tests;

pub use memory::MemoryProgressStore;
pub use postgres::{PostgresProgressStore, PROGRESS_TABLE};
pub use state::{ProgressUpdate, SyncJobState};
pub use store::ProgressStore;
