//! Two-stage category routing

use crate::error::{ExtractorError, RoutingError};
use crate::parser::ResponseParser;
use crate::stage::{self, Stage};
use crate::types::Classification;
use credex_definitions::{DefinitionLoader, PromptBuilder};
use credex_domain::{GenerationProvider, Language, MainCategory, OutputContract, SubCategory};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default limit for one routing call
const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Picks a main category, then one of its sub-categories
///
/// Both calls request the JSON contract. Answers outside the taxonomy and
/// sub-categories owned by another main category are errors; nothing is
/// corrected.
pub struct CategoryRouter<P: GenerationProvider> {
    provider: Arc<P>,
    loader: Arc<DefinitionLoader>,
    parser: ResponseParser,
    stage_timeout: Duration,
}

impl<P: GenerationProvider> CategoryRouter<P> {
    /// Create a router
    pub fn new(provider: Arc<P>, loader: Arc<DefinitionLoader>) -> Self {
        Self {
            provider,
            loader,
            parser: ResponseParser::new(),
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }

    /// Set the limit for each provider call
    pub fn with_stage_timeout(mut self, stage_timeout: Duration) -> Self {
        self.stage_timeout = stage_timeout;
        self
    }

    /// Run both stages
    pub async fn classify(
        &self,
        document: &str,
        language: Language,
    ) -> Result<Classification, ExtractorError> {
        let main_category = self.classify_main(document, language).await?;
        let sub_category = self.classify_sub(main_category, document, language).await?;
        Ok(Classification {
            main_category,
            sub_category,
        })
    }

    /// Stage A: main category
    pub async fn classify_main(
        &self,
        document: &str,
        language: Language,
    ) -> Result<MainCategory, ExtractorError> {
        let prompt = self.prompts(language).main_category_prompt(document)?;
        let raw = self.call(Stage::MainCategory, &prompt).await?;
        let id = self.parser.parse_main_category(&raw)?;

        let main = MainCategory::parse(&id).ok_or_else(|| {
            warn!(id = %id, raw = %raw, "Unknown main category");
            RoutingError::UnknownMainCategory {
                id: id.clone(),
                raw: raw.clone(),
            }
        })?;
        info!(main_category = %main, "Main category judged");
        Ok(main)
    }

    /// Stage B: sub-category of `main`
    pub async fn classify_sub(
        &self,
        main: MainCategory,
        document: &str,
        language: Language,
    ) -> Result<SubCategory, ExtractorError> {
        let prompt = self.prompts(language).sub_category_prompt(main, document)?;
        let raw = self.call(Stage::SubCategory, &prompt).await?;
        let id = self.parser.parse_sub_category(&raw)?;

        let sub = SubCategory::parse(&id).ok_or_else(|| {
            warn!(main_category = %main, id = %id, raw = %raw, "Unknown sub-category");
            RoutingError::UnknownSubCategory {
                main,
                id: id.clone(),
                raw: raw.clone(),
            }
        })?;
        if sub.main_category() != main {
            warn!(main_category = %main, sub_category = %sub, "Sub-category belongs to another main category");
            return Err(RoutingError::CategoryMismatch { main, sub }.into());
        }
        info!(main_category = %main, sub_category = %sub, "Sub-category judged");
        Ok(sub)
    }

    fn prompts(&self, language: Language) -> PromptBuilder {
        PromptBuilder::new(Arc::clone(&self.loader), language)
    }

    async fn call(&self, stage: Stage, prompt: &str) -> Result<String, ExtractorError> {
        stage::generate(
            self.provider.as_ref(),
            stage,
            prompt,
            OutputContract::Json,
            self.stage_timeout,
        )
        .await
    }
}
