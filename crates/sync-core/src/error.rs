//! Error taxonomy shared by the extractor, the tracker and the ingestor.

use std::fmt;

/// Classification of a sync failure.
///
/// Callers branch on the kind instead of matching status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Timeouts, connection resets and non-success HTTP statuses.
    /// Retried with backoff; escalated to `Fatal` once retries run out.
    Transient,
    /// The master refused the table. Aborts that table only.
    NotAllowed,
    /// The local catalog or load step disagreed with the payload.
    /// Aborts that table only.
    SchemaMismatch,
    /// Stops the whole job.
    Fatal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transient => "transient",
            ErrorKind::NotAllowed => "not_allowed",
            ErrorKind::SchemaMismatch => "schema_mismatch",
            ErrorKind::Fatal => "fatal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure with a free-text diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SyncError {
    kind: ErrorKind,
    message: String,
}

impl SyncError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    pub fn not_allowed(table_name: &str) -> Self {
        Self::new(
            ErrorKind::NotAllowed,
            format!(
                "the table_name '{table_name}' is not in the table list, therefore no table was returned"
            ),
        )
    }

    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaMismatch, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::Fatal
    }

    pub fn is_transient(&self) -> bool {
        self.kind == ErrorKind::Transient
    }
}
