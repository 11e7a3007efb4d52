//! Aggregation of repeated runs over one fixture
//!
//! Everything here is a pure reducer over a slice of [`RunOutcome`]s.

use crate::scorer::{character_similarity, non_blank, ExpectedFields};
use credex_domain::{CanonicalField, CanonicalRecord};
use credex_extractor::ExtractionResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Result of one pipeline run inside a benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RunOutcome {
    /// The pipeline produced a record
    Extracted(Box<ExtractionResult>),
    /// The pipeline failed for this document
    Failed {
        /// Error message
        error: String,
        /// Model text the failure was raised on, when known
        raw_response: Option<String>,
    },
}

impl RunOutcome {
    /// Extracted record, if any
    pub fn record(&self) -> Option<&CanonicalRecord> {
        match self {
            RunOutcome::Extracted(result) => Some(&result.account_info),
            RunOutcome::Failed { .. } => None,
        }
    }

    /// Successful run: a record with no validation warnings
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Extracted(result) if result.is_valid())
    }

    /// Whether the run produced a record the gatekeeper warned about
    pub fn has_warnings(&self) -> bool {
        matches!(self, RunOutcome::Extracted(result) if !result.is_valid())
    }
}

fn present_value(record: &CanonicalRecord, field: CanonicalField) -> Option<String> {
    field
        .value_of(record)
        .filter(|value| !value.trim().is_empty())
}

/// Per-field statistics of one fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStats {
    /// Value the fixture expects; `None` when the field should stay absent
    pub expected: Option<String>,
    /// Successful runs that extracted the field, over all runs
    pub success_rate: f64,
    /// Runs that extracted the field
    pub extraction_count: usize,
    /// Runs that failed, missed the field, or raised warnings
    pub error_count: usize,
    /// Mean character similarity of extracted values to the expected value
    pub character_accuracy: f64,
}

/// Field-level view of repeated runs over one fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLevelAnalysis {
    /// Statistics of each field the fixture lists
    pub fields: BTreeMap<CanonicalField, FieldStats>,
    /// Note content distribution
    pub notes: NoteContentAnalysis,
    /// Issues, patterns and suggestions
    pub insights: ResponseInsights,
    /// Runs analysed
    pub total_runs: usize,
}

impl FieldLevelAnalysis {
    /// Aggregate `results` against `expected`
    ///
    /// Fields the fixture does not list are not reported.
    pub fn from_results(results: &[RunOutcome], expected: &ExpectedFields) -> Self {
        let total_runs = results.len();
        let mut fields = BTreeMap::new();

        for (field, expected_value) in expected {
            let expected_value = non_blank(expected_value);
            let mut successes = 0;
            let mut extraction_count = 0;
            let mut error_count = 0;
            let mut similarity_sum = 0.0;
            let mut similarity_count = 0;

            for outcome in results {
                let value = outcome.record().and_then(|r| present_value(r, *field));
                let Some(value) = value else {
                    error_count += 1;
                    continue;
                };

                extraction_count += 1;
                if let Some(expected_value) = expected_value {
                    similarity_sum += character_similarity(expected_value, &value);
                    similarity_count += 1;
                }
                if outcome.is_success() {
                    successes += 1;
                } else {
                    error_count += 1;
                }
            }

            fields.insert(
                *field,
                FieldStats {
                    expected: expected_value.map(str::to_string),
                    success_rate: ratio(successes, total_runs),
                    extraction_count,
                    error_count,
                    character_accuracy: if similarity_count > 0 {
                        similarity_sum / similarity_count as f64
                    } else {
                        0.0
                    },
                },
            );
        }

        let tracked: Vec<CanonicalField> = expected.keys().copied().collect();
        Self {
            fields,
            notes: NoteContentAnalysis::from_results(results),
            insights: ResponseInsights::from_results(results, &tracked),
            total_runs,
        }
    }

    /// Mean success rate over the reported fields
    pub fn mean_success_rate(&self) -> f64 {
        if self.fields.is_empty() {
            return 0.0;
        }
        self.fields.values().map(|s| s.success_rate).sum::<f64>() / self.fields.len() as f64
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// One distinct note and how often it was extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteCount {
    /// Note text
    pub content: String,
    /// Occurrences
    pub count: usize,
}

/// Distribution of extracted notes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteContentAnalysis {
    /// Distinct notes, most frequent first
    pub ranking: Vec<NoteCount>,
    /// Most frequent note
    pub most_common: Option<String>,
    /// Distinct notes over notes extracted (0.0 when none)
    pub diversity: f64,
    /// Runs that extracted a non-empty note
    pub total: usize,
}

impl NoteContentAnalysis {
    /// Count the notes of every run that produced one
    pub fn from_results(results: &[RunOutcome]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut total = 0;

        for note in results
            .iter()
            .filter_map(RunOutcome::record)
            .filter_map(|r| r.note.as_deref())
            .filter(|note| !note.is_empty())
        {
            total += 1;
            *counts.entry(note).or_default() += 1;
        }

        let mut ranking: Vec<NoteCount> = counts
            .iter()
            .map(|(content, count)| NoteCount {
                content: content.to_string(),
                count: *count,
            })
            .collect();
        // Ties are ordered by content so reports are stable
        ranking.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.content.cmp(&b.content)));

        Self {
            most_common: ranking.first().map(|n| n.content.clone()),
            diversity: ratio(counts.len(), total),
            ranking,
            total,
        }
    }
}

/// Findings derived from a batch of runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInsights {
    /// Problems seen in the batch
    pub issues: Vec<String>,
    /// Things that worked consistently
    pub success_patterns: Vec<String>,
    /// Suggested follow-ups
    pub suggestions: Vec<String>,
    /// Human-readable summary
    pub summary: String,
    /// Runs analysed
    pub total_runs: usize,
}

impl ResponseInsights {
    /// Derive insights for `fields` from `results`
    pub fn from_results(results: &[RunOutcome], fields: &[CanonicalField]) -> Self {
        let total = results.len();
        let successes = results.iter().filter(|r| r.is_success()).count();

        let mut issues = BTreeSet::new();
        let mut patterns = BTreeSet::new();
        let mut suggestions = BTreeSet::new();

        if total > 0 {
            if successes == 0 {
                issues.insert("Every run failed; the document may be too complex".to_string());
                suggestions.insert("Simplify the document or improve the prompt".to_string());
            } else if successes < total / 2 {
                issues.insert("Fewer than half of the runs succeeded; results are inconsistent".to_string());
                suggestions.insert("Clarify the prompt so the model answers consistently".to_string());
            } else if successes == total {
                patterns.insert("Every run succeeded".to_string());
            }
        }

        for field in fields {
            let values: Vec<String> = results
                .iter()
                .filter_map(RunOutcome::record)
                .filter_map(|r| field.value_of(r))
                .collect();
            let unique: BTreeSet<&str> = values.iter().map(String::as_str).collect();

            if unique.len() > 1 {
                issues.insert(format!(
                    "{} is inconsistent: {} distinct values",
                    field,
                    unique.len()
                ));
                suggestions.insert(format!("Improve extraction of {}", field));
            } else if unique.len() == 1 {
                patterns.insert(format!("{} extracted consistently", field));
            }
        }

        let warned = results.iter().filter(|r| r.has_warnings()).count();
        if warned > 0 {
            issues.insert(format!("{} run(s) raised validation warnings", warned));
        }

        let issues: Vec<String> = issues.into_iter().collect();
        let success_patterns: Vec<String> = patterns.into_iter().collect();
        let summary = summarize(successes, total, &issues, &success_patterns);

        Self {
            issues,
            success_patterns,
            suggestions: suggestions.into_iter().collect(),
            summary,
            total_runs: total,
        }
    }
}

fn summarize(successes: usize, total: usize, issues: &[String], patterns: &[String]) -> String {
    let rate = ratio(successes, total);
    let mut lines = vec![format!(
        "Success rate: {:.1}% ({}/{})",
        rate * 100.0,
        successes,
        total
    )];

    if !patterns.is_empty() {
        lines.push("Success patterns:".to_string());
        lines.extend(patterns.iter().take(3).map(|p| format!("  - {}", p)));
    }
    if !issues.is_empty() {
        lines.push("Main issues:".to_string());
        lines.extend(issues.iter().take(3).map(|i| format!("  - {}", i)));
    }

    let verdict = if rate >= 0.8 {
        "Verdict: extraction performs well"
    } else if rate >= 0.5 {
        "Verdict: extraction has room for improvement"
    } else {
        "Verdict: extraction needs substantial improvement"
    };
    lines.push(verdict.to_string());
    lines.join("\n")
}
