//! Configuration for the Extractor

use credex_domain::{Language, OutputContract};
use credex_gatekeeper::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Prompt language for all three stages
    pub language: Language,

    /// Reply format requested for the extraction call
    pub output_contract: OutputContract,

    /// Maximum time for a single provider call (seconds)
    pub stage_timeout_secs: u64,

    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Run the gatekeeper on every extracted record
    pub validate_records: bool,

    /// Gatekeeper checks
    pub validation: ValidationConfig,
}

impl ExtractorConfig {
    /// Get the stage timeout as a Duration
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.stage_timeout_secs == 0 {
            return Err("stage_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            language: Language::Ja,
            output_contract: OutputContract::Json,
            stage_timeout_secs: 60,
            max_text_length: 20_000,
            validate_records: true,
            validation: ValidationConfig::default(),
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: short timeouts, small documents, strict checks
    pub fn aggressive() -> Self {
        Self {
            stage_timeout_secs: 20,
            max_text_length: 8_000,
            validation: ValidationConfig::strict(),
            ..Self::default()
        }
    }

    /// Lenient preset: long timeouts for slow local models, large documents
    pub fn lenient() -> Self {
        Self {
            stage_timeout_secs: 300,
            max_text_length: 100_000,
            validation: ValidationConfig::permissive(),
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stage_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_aggressive_config_is_valid() {
        let config = ExtractorConfig::aggressive();
        assert!(config.validate().is_ok());
        assert!(!config.validation.allow_schemeless_url);
    }

    #[test]
    fn test_lenient_config_is_valid() {
        let config = ExtractorConfig::lenient();
        assert!(config.validate().is_ok());
        assert!(config.stage_timeout_secs > ExtractorConfig::default().stage_timeout_secs);
    }

    #[test]
    fn test_invalid_max_text_length() {
        let mut config = ExtractorConfig::default();
        config.max_text_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = ExtractorConfig::default();
        config.stage_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ExtractorConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml(
            r#"
            language = "en"
            output_contract = "yaml"
            "#,
        )
        .unwrap();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.output_contract, OutputContract::Yaml);
        assert_eq!(config.max_text_length, 20_000);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ExtractorConfig::from_toml("stage_timeout_secs = \"soon\"").is_err());
    }
}
