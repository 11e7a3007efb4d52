//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Configuration for validation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Warn when no content field was extracted
    pub check_empty: bool,

    /// Enable URL format checking
    pub check_url: bool,

    /// Accept URLs without a scheme (`example.com/login`)
    pub allow_schemeless_url: bool,

    /// Enable email checking of user ids containing `@`
    pub check_email: bool,

    /// Enable hostname / IP address checking
    pub check_host: bool,

    /// Enable port range checking
    pub check_port: bool,

    /// Enable private key header checking
    pub check_auth_key: bool,

    /// Enable confidence bounds checking (0.0-1.0)
    pub check_confidence: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_empty: true,
            check_url: true,
            allow_schemeless_url: true,
            check_email: true,
            check_host: true,
            check_port: true,
            check_auth_key: true,
            check_confidence: true,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (only the empty-record check)
    pub fn permissive() -> Self {
        Self {
            check_empty: true,
            check_url: false,
            allow_schemeless_url: true,
            check_email: false,
            check_host: false,
            check_port: false,
            check_auth_key: false,
            check_confidence: false,
        }
    }

    /// Create a strict configuration (all checks, URLs need a scheme)
    pub fn strict() -> Self {
        Self {
            allow_schemeless_url: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert!(config.check_empty);
        assert!(config.check_url);
        assert!(config.allow_schemeless_url);
        assert!(config.check_auth_key);
    }

    #[test]
    fn test_permissive_config() {
        let config = ValidationConfig::permissive();
        assert!(config.check_empty);
        assert!(!config.check_host);
        assert!(!config.check_confidence);
    }

    #[test]
    fn test_strict_config() {
        let config = ValidationConfig::strict();
        assert!(!config.allow_schemeless_url);
        assert!(config.check_email);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ValidationConfig = serde_json::from_str(r#"{"check_host": false}"#).unwrap();
        assert!(!config.check_host);
        assert!(config.check_port);
    }
}
