//! credex Domain Layer
//!
//! This crate contains the core value types shared by every credex crate.
//! It holds no I/O and no pipeline logic: only the canonical record, the
//! two-level category taxonomy, and the trait that the generation capability
//! must implement.
//!
//! ## Key Concepts
//!
//! - **Canonical record**: the unified output every sub-category extraction
//!   converges to
//! - **Main / sub category**: a fixed 5 x 5 taxonomy used to pick an
//!   extraction schema
//! - **Output contract**: the reply format requested from the model
//! - **Generation provider**: the external text-generation service
//!
//! ## Architecture
//!
//! - Only `serde` (wire names) and `async-trait` (provider boundary)
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use category::{Language, MainCategory, SubCategory};
pub use record::{parse_port, AccountType, CanonicalField, CanonicalRecord};
pub use traits::{GenerationProvider, OutputContract};
