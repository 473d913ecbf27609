//! Client side: pulls allow-listed tables from the master chunk by chunk and
//! bulk-loads them into the local database.

mod client;
mod retry;
mod runner;

pub use client::{HttpMasterClient, MasterApi};
pub use retry::RetryPolicy;
pub use runner::{IngestReport, Ingestor, TableReport};
