//! Command implementations.

pub mod bench;
pub mod classify;
pub mod definitions;
pub mod extract;

pub use self::bench::execute_bench;
pub use self::classify::execute_classify;
pub use self::definitions::execute_definitions;
pub use self::extract::execute_extract;

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::provider::ConfiguredProvider;
use credex_definitions::DefinitionLoader;
use credex_extractor::Extractor;
use std::fs;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs: resolved configuration, definitions and output.
pub struct Session {
    /// Resolved configuration (flags already applied)
    pub config: Config,
    /// Shared definition cache
    pub loader: Arc<DefinitionLoader>,
    /// Output formatter
    pub formatter: Formatter,
}

impl Session {
    /// Create a session
    pub fn new(config: Config, loader: Arc<DefinitionLoader>, formatter: Formatter) -> Self {
        Self {
            config,
            loader,
            formatter,
        }
    }

    /// Build an extractor for the configured provider
    pub fn extractor(&self) -> Result<Extractor<ConfiguredProvider>> {
        let provider = ConfiguredProvider::from_config(&self.config.provider);
        debug!(
            provider = ?self.config.provider.kind,
            model = %self.config.provider.model,
            endpoint = %self.config.provider.endpoint,
            "Provider configured"
        );
        Ok(Extractor::new(
            provider,
            Arc::clone(&self.loader),
            self.config.extractor.clone(),
        )?)
    }
}

/// Read a document from a file, or from stdin when `input` is `-`.
pub fn read_input(input: &str) -> Result<String> {
    let text = if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)
            .map_err(|e| CliError::InvalidInput(format!("Cannot read {}: {}", input, e)))?
    };

    if text.trim().is_empty() {
        return Err(CliError::InvalidInput(format!("{} is empty", input)));
    }
    Ok(text)
}
