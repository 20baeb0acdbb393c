//! Error types for tally-engine.

use std::path::PathBuf;

use thiserror::Error;

use tally_core::error::RegistryError;

use crate::adapters::AdapterError;

/// All errors that can arise from a reconciliation run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The target date string did not parse as `YYYY-MM-DD`.
    #[error("wrong format for check date '{input}'; expected YYYY-MM-DD")]
    InvalidDate { input: String },

    /// An error from the user registry.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An error from the hours source or notifier adapter.
    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (ledger store).
    #[error("ledger JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`EngineError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> EngineError {
    EngineError::Io {
        path: path.into(),
        source,
    }
}
