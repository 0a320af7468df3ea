//! Error types for datebook operations.
//!
//! Only failures a caller can act on are errors. Lookups against an absent
//! identity are no-ops, and malformed stored values are replaced by defaults
//! where they are read, so neither shows up here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatebookError {
    /// Rejected user input (empty title, no group to file under, ...).
    /// The operation was aborted before touching any state.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Interchange error: {0}")]
    Interchange(String),

    #[error("Unknown calendar: {0}")]
    UnknownCalendar(String),
}

impl DatebookError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatebookError>;
