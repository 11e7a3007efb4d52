//! Trait definitions for external interactions
//!
//! The generation capability is the only external collaborator the pipeline
//! calls. Implementations live in `credex-llm`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reply format requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputContract {
    /// Provider-native structured output, returned as a JSON document
    Structured,
    /// A JSON object in free text
    #[default]
    Json,
    /// A YAML mapping in free text
    Yaml,
}

impl OutputContract {
    /// Get the contract name
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputContract::Structured => "structured",
            OutputContract::Json => "json",
            OutputContract::Yaml => "yaml",
        }
    }

    /// Whether the provider should be asked for JSON mode
    pub fn wants_json(&self) -> bool {
        matches!(self, OutputContract::Structured | OutputContract::Json)
    }
}

impl fmt::Display for OutputContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputContract {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structured" | "generable" => Ok(OutputContract::Structured),
            "json" => Ok(OutputContract::Json),
            "yaml" => Ok(OutputContract::Yaml),
            _ => Err(format!("Invalid output contract: {}", s)),
        }
    }
}

/// Trait for text generation providers
///
/// Implemented by the infrastructure layer (credex-llm). The returned text is
/// untrusted: callers must parse it defensively.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Error type for generation failures
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short provider name for logs and reports
    fn name(&self) -> &str;

    /// Generate a reply to `prompt` in the requested format
    async fn generate(&self, prompt: &str, contract: OutputContract)
        -> Result<String, Self::Error>;
}

#[async_trait]
impl<P: GenerationProvider + ?Sized> GenerationProvider for std::sync::Arc<P> {
    type Error = P::Error;

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(
        &self,
        prompt: &str,
        contract: OutputContract,
    ) -> Result<String, Self::Error> {
        (**self).generate(prompt, contract).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_parse() {
        assert_eq!("JSON".parse::<OutputContract>(), Ok(OutputContract::Json));
        assert_eq!(
            "generable".parse::<OutputContract>(),
            Ok(OutputContract::Structured)
        );
        assert!("xml".parse::<OutputContract>().is_err());
        assert!(OutputContract::Structured.wants_json());
        assert!(!OutputContract::Yaml.wants_json());
    }
}
