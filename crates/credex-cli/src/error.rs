//! Error types for the CLI application.

use credex_definitions::DefinitionError;
use credex_eval::EvalError;
use credex_extractor::ExtractorError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit status for configuration and definition problems.
pub const EXIT_CONFIG: i32 = 2;

/// Exit status for every other failure.
pub const EXIT_FAILURE: i32 = 1;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Definition resources missing or inconsistent
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// Pipeline error
    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    /// Evaluation error
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        let config = match self {
            CliError::Config(_) | CliError::Definition(_) | CliError::Toml(_) => true,
            CliError::Extractor(e) => e.is_fatal(),
            CliError::Eval(EvalError::Extractor(e)) => e.is_fatal(),
            _ => false,
        };
        if config {
            EXIT_CONFIG
        } else {
            EXIT_FAILURE
        }
    }
}
