//! In-memory stand-ins for the databases and the master, used by unit and
//! integration tests to drive the extractor, tracker and ingestor without
//! PostgreSQL or a network.

mod master;
mod sink;
mod source;

pub use master::InProcessMaster;
pub use sink::RecordingSink;
pub use source::MemorySource;

use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
