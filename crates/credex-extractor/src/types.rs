//! Result types of a pipeline run

use crate::stage::Stage;
use credex_domain::{CanonicalRecord, MainCategory, OutputContract, SubCategory};
use credex_gatekeeper::ValidationWarning;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Outcome of the two-stage category judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Stage A answer
    pub main_category: MainCategory,
    /// Stage B answer, owned by `main_category`
    pub sub_category: SubCategory,
}

impl Classification {
    /// Classification implied by a sub-category alone
    pub fn from_sub_category(sub_category: SubCategory) -> Self {
        Self {
            main_category: sub_category.main_category(),
            sub_category,
        }
    }
}

/// Wall time spent in each provider call
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimings {
    /// Main category judgment; absent when routing was skipped
    pub main_category: Option<Duration>,
    /// Sub-category judgment; absent when routing was skipped
    pub sub_category: Option<Duration>,
    /// Extraction call including parse and mapping
    pub extraction: Duration,
}

impl StageTimings {
    /// Time spent in `stage`, if it ran
    pub fn get(&self, stage: Stage) -> Option<Duration> {
        match stage {
            Stage::MainCategory => self.main_category,
            Stage::SubCategory => self.sub_category,
            Stage::Extraction => Some(self.extraction),
        }
    }

    /// Sum of all stages that ran
    pub fn total(&self) -> Duration {
        self.main_category.unwrap_or_default()
            + self.sub_category.unwrap_or_default()
            + self.extraction
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Run id (UUIDv7, time ordered)
    pub id: Uuid,

    /// Extracted canonical record
    pub account_info: CanonicalRecord,

    /// Extraction reply exactly as received
    pub raw_response: String,

    /// Extraction prompt sent to the provider
    pub request_content: String,

    /// Wall time of the whole run
    pub extraction_time: Duration,

    /// Reply format requested for the extraction call
    pub method: OutputContract,

    /// Categories the schema was chosen by
    pub classification: Classification,

    /// Gatekeeper findings; never block the result
    pub warnings: Vec<ValidationWarning>,

    /// Per-stage wall time
    pub timings: StageTimings,

    /// Provider that produced the replies
    pub provider: String,

    /// Unix timestamp (seconds) of completion
    pub timestamp: u64,
}

impl ExtractionResult {
    /// True when the gatekeeper raised nothing
    pub fn is_valid(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_from_sub_category() {
        let classification = Classification::from_sub_category(SubCategory::InfraTelecom);
        assert_eq!(classification.main_category, MainCategory::Infrastructure);
    }

    #[test]
    fn test_timings_total_skips_missing_stages() {
        let timings = StageTimings {
            main_category: None,
            sub_category: Some(Duration::from_millis(200)),
            extraction: Duration::from_millis(300),
        };
        assert_eq!(timings.total(), Duration::from_millis(500));
        assert_eq!(timings.get(Stage::MainCategory), None);
        assert_eq!(timings.get(Stage::Extraction), Some(Duration::from_millis(300)));
    }

    #[test]
    fn test_classification_wire_format() {
        let json = serde_json::to_string(&Classification::from_sub_category(SubCategory::DigitalAi))
            .unwrap();
        assert_eq!(json, r#"{"mainCategory":"digital","subCategory":"digitalAI"}"#);
    }
}
