//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use credex_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "CREDEX_API_KEY";

/// Environment variable overriding the definitions directory.
pub const DEFINITIONS_ENV: &str = "CREDEX_DEFINITIONS";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Definitions directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<PathBuf>,

    /// Generation provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Pipeline settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI-compatible chat completions endpoint
    OpenAi,
}

/// Generation provider profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend
    #[serde(default)]
    pub kind: ProviderKind,

    /// Base URL of the backend
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// HTTP timeout per request in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request (Ollama)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".credex").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. The default path falls back to the
    /// built-in defaults when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::path()?, false),
        };

        if !path.exists() {
            if required {
                return Err(CliError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let config = Self::from_toml(&contents)?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.extractor.validate().map_err(CliError::Config)?;
        if self.provider.endpoint.trim().is_empty() {
            return Err(CliError::Config("provider.endpoint is empty".into()));
        }
        if self.provider.model.trim().is_empty() {
            return Err(CliError::Config("provider.model is empty".into()));
        }
        if self.provider.timeout_secs == 0 {
            return Err(CliError::Config("provider.timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Definitions directory: flag or environment first, then the file, then `./definitions`.
    pub fn definitions_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.definitions.clone())
            .unwrap_or_else(|| PathBuf::from("definitions"))
    }
}

impl ProviderConfig {
    /// Resolve the API key.
    ///
    /// `CREDEX_API_KEY` wins over the variable named by `api_key_env`.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_from(|name| std::env::var(name).ok())
    }

    fn api_key_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        lookup(API_KEY_ENV)
            .or_else(|| self.api_key_env.as_deref().and_then(&lookup))
            .filter(|key| !key.is_empty())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Ollama,
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_endpoint() -> String {
    credex_llm::ollama::DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    credex_llm::ollama::DEFAULT_MAX_RETRIES
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use credex_domain::{Language, OutputContract};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.kind, ProviderKind::Ollama);
        assert_eq!(config.provider.endpoint, "http://localhost:11434");
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            definitions = "/opt/credex/definitions"

            [provider]
            kind = "openai"
            endpoint = "https://api.example.com/v1"
            model = "gpt-4o-mini"
            api_key_env = "EXAMPLE_KEY"

            [extractor]
            language = "en"
            output_contract = "yaml"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.provider.timeout_secs, 120);
        assert_eq!(config.extractor.language, Language::En);
        assert_eq!(config.extractor.output_contract, OutputContract::Yaml);
        assert_eq!(config.extractor.stage_timeout_secs, 60);
        assert_eq!(
            config.definitions_dir(None),
            PathBuf::from("/opt/credex/definitions")
        );
    }

    #[test]
    fn test_invalid_extractor_section_rejected() {
        let err = Config::from_toml("[extractor]\nstage_timeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.provider.model = "qwen2.5".to_string();
        config.settings.color = false;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.provider, config.provider);
        assert!(!loaded.settings.color);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_definitions_dir_precedence() {
        let config = Config {
            definitions: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };
        assert_eq!(
            config.definitions_dir(Some(Path::new("/from/flag"))),
            PathBuf::from("/from/flag")
        );
        assert_eq!(config.definitions_dir(None), PathBuf::from("/from/file"));
        assert_eq!(
            Config::default().definitions_dir(None),
            PathBuf::from("definitions")
        );
    }

    #[test]
    fn test_api_key_precedence() {
        let provider = ProviderConfig {
            api_key_env: Some("EXAMPLE_KEY".to_string()),
            ..Default::default()
        };

        let both = |name: &str| match name {
            API_KEY_ENV => Some("primary".to_string()),
            "EXAMPLE_KEY" => Some("secondary".to_string()),
            _ => None,
        };
        assert_eq!(provider.api_key_from(both).as_deref(), Some("primary"));

        let named_only = |name: &str| (name == "EXAMPLE_KEY").then(|| "secondary".to_string());
        assert_eq!(provider.api_key_from(named_only).as_deref(), Some("secondary"));

        let empty = |_: &str| Some(String::new());
        assert_eq!(provider.api_key_from(empty), None);
    }
}
