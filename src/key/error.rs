//! Key pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Errors that can occur while building, storing or loading a key.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file does not exist.
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),

    /// A token that should be a step id is not one.
    #[error("Invalid step id: '{0}'")]
    InvalidStepId(String),

    /// Persisted store is not valid JSON for a key.
    #[error("Malformed key store: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A map entry is keyed differently from the node it holds.
    #[error("Store entry '{key}' holds node '{id}'")]
    KeyMismatch { key: String, id: String },

    /// Build reported problems and strict mode was requested.
    #[error("Build rejected: {conflicts} conflict(s), {dangling} dangling reference(s)")]
    Rejected { conflicts: usize, dangling: usize },
}

impl KeyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
