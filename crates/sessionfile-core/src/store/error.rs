//! Error types for session store operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during session store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to acquire the per-id lock after multiple retries.
    /// Retryable: the caller may re-run the whole invocation.
    #[error("failed to acquire lock on {path} after {retries} retries")]
    LockTimeout { path: PathBuf, retries: u32 },

    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Record file exists but does not decode to a session record
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// No record file for this id
    #[error("no session record for id {id}")]
    NotFound { id: String },

    /// A record for this id already exists (issuer collision)
    #[error("session record for id {id} already exists")]
    AlreadyExists { id: String },

    /// Id contains characters that cannot name a record file
    #[error("invalid session id: {id:?}")]
    InvalidId { id: String },
}
