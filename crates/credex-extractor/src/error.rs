//! Error types for the Extractor

use crate::stage::Stage;
use credex_definitions::DefinitionError;
use credex_domain::{MainCategory, SubCategory};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during a pipeline run
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// A definition resource is missing, undecodable or inconsistent
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The router produced an unusable category
    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    /// No parse candidate decoded against the expected shape
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The generation provider failed
    #[error("Generation error ({provider}, {stage}): {message}")]
    Generation {
        /// Provider name
        provider: String,
        /// Stage that called the provider
        stage: Stage,
        /// Provider error text
        message: String,
    },

    /// A provider call exceeded the stage timeout
    #[error("Timeout after {secs}s during {stage}")]
    Timeout {
        /// Stage that timed out
        stage: Stage,
        /// Configured limit in seconds
        secs: u64,
    },

    /// Document is empty after trimming
    #[error("Document is empty")]
    EmptyText,

    /// Document exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether the host should stop instead of moving on to the next document
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExtractorError::Definition(_) | ExtractorError::Config(_))
    }

    /// Raw model text, when the failure happened after a reply was received
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            ExtractorError::Parse(e) => Some(&e.raw),
            ExtractorError::Routing(RoutingError::UnknownMainCategory { raw, .. })
            | ExtractorError::Routing(RoutingError::UnknownSubCategory { raw, .. }) => Some(raw),
            _ => None,
        }
    }
}

impl From<credex_gatekeeper::GatekeeperError> for ExtractorError {
    fn from(e: credex_gatekeeper::GatekeeperError) -> Self {
        ExtractorError::Config(e.to_string())
    }
}

/// Routing failures; none of them is corrected automatically
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    /// Stage A answered with an id outside the main category set
    #[error("unknown main category '{id}'")]
    UnknownMainCategory {
        /// Id the model answered
        id: String,
        /// Full reply
        raw: String,
    },

    /// Stage B answered with an id outside the sub-category set
    #[error("unknown sub-category '{id}' under '{main}'")]
    UnknownSubCategory {
        /// Main category chosen in stage A
        main: MainCategory,
        /// Id the model answered
        id: String,
        /// Full reply
        raw: String,
    },

    /// Stage B answered with a sub-category of another main category
    #[error("sub-category '{sub}' belongs to '{}', not '{main}'", .sub.main_category())]
    CategoryMismatch {
        /// Main category chosen in stage A
        main: MainCategory,
        /// Sub-category chosen in stage B
        sub: SubCategory,
    },
}

/// Parse strategy that produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Content of a ```` ```json ```` fence
    JsonFence,
    /// Text after the `assistantfinal` marker
    FinalAnswerMarker,
    /// First `{` to last `}`
    Braces,
    /// Whole trimmed reply
    WholeText,
    /// Content of a ```` ```yaml ```` fence
    YamlFence,
    /// Whole trimmed reply read as YAML
    YamlText,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::JsonFence => "json fence",
            Strategy::FinalAnswerMarker => "final-answer marker",
            Strategy::Braces => "braces",
            Strategy::WholeText => "whole text",
            Strategy::YamlFence => "yaml fence",
            Strategy::YamlText => "yaml text",
        };
        f.write_str(name)
    }
}

/// Why one candidate was rejected
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFailure {
    /// Strategy that produced the candidate
    pub strategy: Strategy,
    /// Decode or shape error
    pub reason: String,
}

/// Every parse candidate failed
///
/// Keeps the original reply for logging and troubleshooting.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("no candidate decoded ({})", summarize(.failures))]
pub struct ParseError {
    /// Reply text exactly as received
    pub raw: String,
    /// One entry per non-empty candidate, in the order tried
    pub failures: Vec<CandidateFailure>,
}

fn summarize(failures: &[CandidateFailure]) -> String {
    if failures.is_empty() {
        return "reply has no content".to_string();
    }
    failures
        .iter()
        .map(|f| format!("{}: {}", f.strategy, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}
