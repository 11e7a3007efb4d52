//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::mapper::FieldMapper;
use crate::parser::ResponseParser;
use crate::router::CategoryRouter;
use crate::stage::{self, Stage};
use crate::types::{Classification, ExtractionResult, StageTimings};
use credex_definitions::{DefinitionLoader, PromptBuilder, SchemaRegistry};
use credex_domain::{GenerationProvider, SubCategory};
use credex_gatekeeper::RecordValidator;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The Extractor turns a document into a validated canonical record
///
/// A run is strictly sequential: main category, sub-category, then one
/// extraction call. Dropping the returned future abandons the run between
/// stages.
pub struct Extractor<P: GenerationProvider> {
    provider: Arc<P>,
    router: CategoryRouter<P>,
    registry: SchemaRegistry,
    loader: Arc<DefinitionLoader>,
    parser: ResponseParser,
    validator: RecordValidator,
    config: ExtractorConfig,
}

impl<P: GenerationProvider> Extractor<P> {
    /// Create a new Extractor
    pub fn new(
        provider: P,
        loader: Arc<DefinitionLoader>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        let provider = Arc::new(provider);
        let router = CategoryRouter::new(Arc::clone(&provider), Arc::clone(&loader))
            .with_stage_timeout(config.stage_timeout());
        let validator = RecordValidator::new(config.validation.clone())?;

        Ok(Self {
            provider,
            router,
            registry: SchemaRegistry::new(Arc::clone(&loader)),
            loader,
            parser: ResponseParser::new(),
            validator,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Name of the provider behind this extractor
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Schema and mapping lookup used by this extractor
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Route a document without extracting
    pub async fn classify(&self, text: &str) -> Result<Classification, ExtractorError> {
        self.check_text(text)?;
        self.router.classify(text, self.config.language).await
    }

    /// Route and extract
    pub async fn extract(&self, text: &str) -> Result<ExtractionResult, ExtractorError> {
        self.check_text(text)?;
        let started = Instant::now();
        info!(
            provider = self.provider.name(),
            chars = text.chars().count(),
            "Starting extraction"
        );

        let language = self.config.language;
        let stage_started = Instant::now();
        let main_category = self.router.classify_main(text, language).await?;
        let main_time = stage_started.elapsed();

        let stage_started = Instant::now();
        let sub_category = self
            .router
            .classify_sub(main_category, text, language)
            .await?;
        let sub_time = stage_started.elapsed();

        let classification = Classification {
            main_category,
            sub_category,
        };
        let timings = StageTimings {
            main_category: Some(main_time),
            sub_category: Some(sub_time),
            ..StageTimings::default()
        };
        self.run_extraction(text, classification, timings, started)
            .await
    }

    /// Extract with a known sub-category, skipping routing
    pub async fn extract_with_category(
        &self,
        text: &str,
        sub_category: SubCategory,
    ) -> Result<ExtractionResult, ExtractorError> {
        self.check_text(text)?;
        info!(
            provider = self.provider.name(),
            sub_category = %sub_category,
            "Starting direct extraction"
        );
        self.run_extraction(
            text,
            Classification::from_sub_category(sub_category),
            StageTimings::default(),
            Instant::now(),
        )
        .await
    }

    fn check_text(&self, text: &str) -> Result<(), ExtractorError> {
        if text.trim().is_empty() {
            return Err(ExtractorError::EmptyText);
        }
        let chars = text.chars().count();
        if chars > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                chars,
                self.config.max_text_length,
            ));
        }
        Ok(())
    }

    async fn run_extraction(
        &self,
        text: &str,
        classification: Classification,
        mut timings: StageTimings,
        started: Instant,
    ) -> Result<ExtractionResult, ExtractorError> {
        let sub = classification.sub_category;
        let contract = self.config.output_contract;
        let stage_started = Instant::now();

        let (schema, rule) = self.registry.entry(sub)?;
        let prompt = PromptBuilder::new(Arc::clone(&self.loader), self.config.language)
            .extraction_prompt(sub, text, contract)?;
        debug!(sub_category = %sub, prompt_len = prompt.len(), "Extraction prompt built");

        let raw = stage::generate(
            self.provider.as_ref(),
            Stage::Extraction,
            &prompt,
            contract,
            self.config.stage_timeout(),
        )
        .await?;

        let record = self.parser.parse_schema_record(&raw, &schema, contract)?;
        let account_info = FieldMapper::map(&record, &rule);
        timings.extraction = stage_started.elapsed();

        let warnings = if self.config.validate_records {
            self.validator.validate(&account_info).warnings
        } else {
            Vec::new()
        };
        if !warnings.is_empty() {
            warn!(sub_category = %sub, warnings = ?warnings, "Record has validation warnings");
        }

        info!(
            sub_category = %sub,
            fields = account_info.extracted_field_count(),
            account_type = %account_info.account_type(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Extraction complete"
        );

        Ok(ExtractionResult {
            id: Uuid::now_v7(),
            account_info,
            raw_response: raw,
            request_content: prompt,
            extraction_time: started.elapsed(),
            method: contract,
            classification,
            warnings,
            timings,
            provider: self.provider.name().to_string(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        })
    }
}
