//! Error types for evaluation runs

use credex_extractor::ExtractorError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an evaluation run
#[derive(Error, Debug)]
pub enum EvalError {
    /// A fixture file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File or directory that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// `expected_answers.json` is not the nested scenario/level/field map
    #[error("Failed to decode {path}: {reason}")]
    Decode {
        /// File that failed
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// Fixture set is unusable
    #[error("Fixture error: {0}")]
    Fixture(String),

    /// Fatal extractor error (configuration or definitions)
    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    /// A benchmark task panicked or was cancelled
    #[error("Benchmark task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for EvalError {
    fn from(err: tokio::task::JoinError) -> Self {
        EvalError::Task(err.to_string())
    }
}

/// Result alias for evaluation operations
pub type Result<T> = std::result::Result<T, EvalError>;
