//! credex Definitions
//!
//! Loads the category taxonomy and per sub-category extraction schemas from
//! JSON resources, caches them for the process lifetime, and renders the
//! routing and extraction prompts.
//!
//! # Resource layout
//!
//! ```text
//! <root>/category_definitions.json
//! <root>/subcategories/<subCategoryId>.json
//! ```
//!
//! A missing or undecodable resource is a [`DefinitionError`]; hosts treat
//! it as fatal.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use credex_definitions::{DefinitionLoader, SchemaRegistry};
//! use credex_domain::SubCategory;
//!
//! # fn main() -> Result<(), credex_definitions::DefinitionError> {
//! let loader = Arc::new(DefinitionLoader::new("definitions"));
//! let registry = SchemaRegistry::new(loader);
//!
//! let (schema, rule) = registry.entry(SubCategory::WorkServer)?;
//! assert!(schema.declares("host"));
//! assert_eq!(rule.direct_mapping.get("host").map(String::as_str), Some("host"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
pub mod loader;
pub mod model;
pub mod prompt;
pub mod registry;

pub use error::DefinitionError;
pub use loader::DefinitionLoader;
pub use model::{
    CategoryDefinition, ExtractionSchema, FieldSpec, FieldType, Localized, MappingRule,
    SchemaRecord, SchemaValue, SubCategoryDefinition,
};
pub use prompt::PromptBuilder;
pub use registry::{DefinitionProblem, RegistryReport, SchemaRegistry};
