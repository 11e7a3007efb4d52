//! credex Extractor
//!
//! Turns unstructured documents into canonical account records.
//!
//! # Overview
//!
//! A document is routed through a two-stage category judgment, the schema of
//! the chosen sub-category is rendered into an extraction prompt, and the
//! model's reply is parsed, mapped and validated.
//!
//! # Architecture
//!
//! ```text
//! Text → CategoryRouter → SchemaRegistry → Provider → ResponseParser
//!      → FieldMapper → CanonicalRecord → RecordValidator (warnings)
//! ```
//!
//! # Key Features
//!
//! - **Two-stage routing**: main category, then one of its five sub-categories
//! - **Resilient parsing**: fences, final-answer markers, stray prose, raw
//!   newlines and quoted numbers
//! - **Rule-driven mapping**: per sub-category direct and note-append rules
//! - **Timeouts**: every provider call is bounded
//!
//! # Example Usage
//!
//! ```no_run
//! use credex_definitions::DefinitionLoader;
//! use credex_extractor::{Extractor, ExtractorConfig};
//! use credex_llm::OllamaProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = Arc::new(DefinitionLoader::new("definitions"));
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.2");
//! let extractor = Extractor::new(provider, loader, ExtractorConfig::default())?;
//!
//! let result = extractor
//!     .extract("GitHub account: admin@example.com, password: secret123")
//!     .await?;
//!
//! println!("{} -> {:?}", result.classification.sub_category, result.account_info);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
pub mod mapper;
pub mod parser;
mod router;
mod stage;
mod types;

#[cfg(test)]
mod tests;

pub use config::ExtractorConfig;
pub use error::{CandidateFailure, ExtractorError, ParseError, RoutingError, Strategy};
pub use extractor::Extractor;
pub use mapper::FieldMapper;
pub use parser::ResponseParser;
pub use router::CategoryRouter;
pub use stage::Stage;
pub use types::{Classification, ExtractionResult, StageTimings};
