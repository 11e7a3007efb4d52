//! Provider selected by the configuration.

use crate::config::{ProviderConfig, ProviderKind};
use async_trait::async_trait;
use credex_domain::{GenerationProvider, OutputContract};
use credex_llm::{LlmError, OllamaProvider, OpenAiProvider};

/// One of the HTTP providers, chosen at runtime
#[derive(Debug, Clone)]
pub enum ConfiguredProvider {
    /// Local Ollama server
    Ollama(OllamaProvider),
    /// OpenAI-compatible endpoint
    OpenAi(OpenAiProvider),
}

impl ConfiguredProvider {
    /// Build the provider described by `config`
    pub fn from_config(config: &ProviderConfig) -> Self {
        match config.kind {
            ProviderKind::Ollama => Self::Ollama(
                OllamaProvider::new(&config.endpoint, &config.model)
                    .with_timeout(config.timeout_secs)
                    .with_max_retries(config.max_retries),
            ),
            ProviderKind::OpenAi => {
                let provider = OpenAiProvider::new(&config.endpoint, &config.model);
                Self::OpenAi(match config.api_key() {
                    Some(key) => provider.with_api_key(key),
                    None => provider,
                })
            }
        }
    }
}

#[async_trait]
impl GenerationProvider for ConfiguredProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        match self {
            Self::Ollama(p) => p.name(),
            Self::OpenAi(p) => p.name(),
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        contract: OutputContract,
    ) -> Result<String, Self::Error> {
        match self {
            Self::Ollama(p) => p.generate(prompt, contract).await,
            Self::OpenAi(p) => p.generate(prompt, contract).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_selects_backend() {
        let ollama = ConfiguredProvider::from_config(&ProviderConfig::default());
        assert!(matches!(ollama, ConfiguredProvider::Ollama(_)));

        let openai = ConfiguredProvider::from_config(&ProviderConfig {
            kind: ProviderKind::OpenAi,
            endpoint: "https://api.example.com/v1".to_string(),
            ..Default::default()
        });
        match openai {
            ConfiguredProvider::OpenAi(p) => {
                assert_eq!(
                    p.completions_url(),
                    "https://api.example.com/v1/chat/completions"
                );
            }
            other => panic!("unexpected provider: {other:?}"),
        }
    }
}
