//! Gatekeeper error types

use thiserror::Error;

/// Errors that can occur while building a validator
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// A format pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
