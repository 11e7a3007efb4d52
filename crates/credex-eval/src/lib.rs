//! credex Evaluation
//!
//! Measures extraction quality against fixtures with known answers.
//!
//! # Overview
//!
//! - **Scorer**: compares expected and extracted canonical fields, with a
//!   Levenshtein-based character similarity for near misses
//! - **Analysis**: aggregates repeated runs of one document into per-field
//!   success rates, note distribution and plain-language insights
//! - **Fixtures**: loads `expected_answers.json` and the documents it
//!   describes
//! - **Benchmark**: runs every fixture several times with bounded
//!   concurrency and reports accuracy and latency
//!
//! # Example Usage
//!
//! ```no_run
//! use credex_definitions::DefinitionLoader;
//! use credex_eval::{Benchmark, BenchmarkConfig, FixtureSet};
//! use credex_extractor::{Extractor, ExtractorConfig};
//! use credex_llm::OllamaProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = Arc::new(DefinitionLoader::new("definitions"));
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.2");
//! let extractor = Arc::new(Extractor::new(provider, loader, ExtractorConfig::default())?);
//!
//! let fixtures = FixtureSet::load("fixtures")?;
//! let benchmark = Benchmark::new(extractor, BenchmarkConfig::default())?;
//! let report = benchmark.run(&fixtures).await?;
//!
//! for fixture in &report.fixtures {
//!     println!("{}: {:.2}", fixture.name, fixture.mean_accuracy());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod analysis;
pub mod benchmark;
mod error;
pub mod fixtures;
pub mod scorer;

pub use analysis::{FieldLevelAnalysis, FieldStats, NoteContentAnalysis, NoteCount, ResponseInsights, RunOutcome};
pub use benchmark::{Benchmark, BenchmarkConfig, BenchmarkReport, FixtureReport, LatencySummary};
pub use error::{EvalError, Result};
pub use fixtures::{parse_level, parse_test_case_name, ExpectedAnswers, FixtureCase, FixtureSet};
pub use scorer::{
    character_similarity, levenshtein, score_expected, score_field, score_record, AccuracyError,
    ExpectedFields, FieldAccuracy, RecordAccuracy,
};
