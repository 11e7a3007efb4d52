//! Pipeline stages and the timed provider call they share

use crate::error::ExtractorError;
use credex_domain::{GenerationProvider, OutputContract};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// One provider call of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Main category judgment
    MainCategory,
    /// Sub-category judgment
    SubCategory,
    /// Schema extraction
    Extraction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::MainCategory => "main category judgment",
            Stage::SubCategory => "sub-category judgment",
            Stage::Extraction => "extraction",
        };
        f.write_str(name)
    }
}

/// Call the provider once, bounded by `limit`
pub(crate) async fn generate<P>(
    provider: &P,
    stage: Stage,
    prompt: &str,
    contract: OutputContract,
    limit: Duration,
) -> Result<String, ExtractorError>
where
    P: GenerationProvider,
{
    debug!(%stage, provider = provider.name(), prompt_len = prompt.len(), "Calling provider");

    let reply = timeout(limit, provider.generate(prompt, contract))
        .await
        .map_err(|_| {
            warn!(%stage, secs = limit.as_secs(), "Provider call timed out");
            ExtractorError::Timeout {
                stage,
                secs: limit.as_secs(),
            }
        })?
        .map_err(|e| {
            warn!(%stage, provider = provider.name(), error = %e, "Provider call failed");
            ExtractorError::Generation {
                provider: provider.name().to_string(),
                stage,
                message: e.to_string(),
            }
        })?;

    debug!(%stage, reply_len = reply.len(), raw = %reply, "Provider replied");
    Ok(reply)
}
