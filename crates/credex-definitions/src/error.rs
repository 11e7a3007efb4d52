//! Error types for definition loading

use std::path::PathBuf;
use thiserror::Error;

/// A required definition resource is missing, unreadable or inconsistent
///
/// Always a configuration problem: the host is expected to abort.
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// Resource file does not exist
    #[error("Definition '{id}' not found at {}", path.display())]
    NotFound {
        /// Definition id (`category_definitions` or a sub-category id)
        id: String,
        /// Path that was tried
        path: PathBuf,
    },

    /// Resource exists but could not be read
    #[error("Failed to read definition '{id}' at {}: {source}", path.display())]
    Io {
        /// Definition id
        id: String,
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Resource is not valid JSON or does not match the definition shape
    #[error("Failed to decode definition '{id}' at {}: {reason}", path.display())]
    Decode {
        /// Definition id
        id: String,
        /// Path that was decoded
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// Resource decoded but contradicts the taxonomy
    #[error("Invalid definition '{id}': {reason}")]
    Invalid {
        /// Definition id
        id: String,
        /// What is wrong
        reason: String,
    },
}

impl DefinitionError {
    /// Id of the definition the error refers to
    pub fn id(&self) -> &str {
        match self {
            DefinitionError::NotFound { id, .. }
            | DefinitionError::Io { id, .. }
            | DefinitionError::Decode { id, .. }
            | DefinitionError::Invalid { id, .. } => id,
        }
    }
}
