//! Master side: the extractor and progress tracker behind an HTTP router.

mod extractor;
mod routes;
mod server;
mod tracker;

pub use extractor::Extractor;
pub(crate) use routes::{answer_progress, answer_progress_update};
pub use routes::{router, AppState};
pub use server::{serve, shutdown_signal};
pub use tracker::Tracker;
