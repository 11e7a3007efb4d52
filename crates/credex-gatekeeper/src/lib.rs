//! credex Gatekeeper
//!
//! Checks canonical records for plausibility after extraction.
//!
//! The Gatekeeper provides:
//! - Empty-record detection
//! - URL, email, host and port format checks
//! - Private key header recognition
//! - Confidence bounds checking
//!
//! Problems are reported as warnings attached to the extraction result; they
//! never block a record.
//!
//! # Examples
//!
//! ```
//! use credex_domain::CanonicalRecord;
//! use credex_gatekeeper::{RecordValidator, ValidationConfig, ValidationWarning};
//!
//! let validator = RecordValidator::new(ValidationConfig::default()).unwrap();
//! let result = validator.validate(&CanonicalRecord::new());
//!
//! assert_eq!(result.warnings, vec![ValidationWarning::NoDataExtracted]);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::ValidationConfig;
pub use error::GatekeeperError;
pub use validator::{RecordValidator, ValidationResult, ValidationWarning};
