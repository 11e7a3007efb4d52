//! Field and record accuracy against expected answers

use credex_domain::{CanonicalField, CanonicalRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Expected answers of one fixture, keyed by canonical field
///
/// A blank value means the field is expected to be absent.
pub type ExpectedFields = BTreeMap<CanonicalField, String>;

/// Outcome of comparing one expected value with one extracted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldAccuracy {
    /// Both absent
    Match,
    /// Nothing expected, something extracted
    FalsePositive {
        /// Extracted value
        extracted: String,
    },
    /// Something expected, nothing extracted
    Missing {
        /// Expected value
        expected: String,
    },
    /// Both present and identical
    ExactMatch,
    /// Both present but different
    Incorrect {
        /// Expected value
        expected: String,
        /// Extracted value
        extracted: String,
        /// Character similarity of the two (0.0-1.0)
        similarity: f64,
    },
}

impl FieldAccuracy {
    /// Binary score: 1.0 for `Match` and `ExactMatch`, 0.0 otherwise
    pub fn score(&self) -> f64 {
        match self {
            FieldAccuracy::Match | FieldAccuracy::ExactMatch => 1.0,
            _ => 0.0,
        }
    }

    /// Character similarity, where both sides are present
    pub fn similarity(&self) -> Option<f64> {
        match self {
            FieldAccuracy::ExactMatch => Some(1.0),
            FieldAccuracy::Incorrect { similarity, .. } => Some(*similarity),
            _ => None,
        }
    }

    fn error(&self, field: CanonicalField) -> Option<AccuracyError> {
        match self {
            FieldAccuracy::Match | FieldAccuracy::ExactMatch => None,
            FieldAccuracy::FalsePositive { extracted } => Some(AccuracyError::FalsePositive {
                field,
                extracted: extracted.clone(),
            }),
            FieldAccuracy::Missing { expected } => Some(AccuracyError::FalseNegative {
                field,
                expected: expected.clone(),
            }),
            FieldAccuracy::Incorrect {
                expected,
                extracted,
                ..
            } => Some(AccuracyError::IncorrectValue {
                field,
                expected: expected.clone(),
                extracted: extracted.clone(),
            }),
        }
    }
}

/// A field that did not score
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AccuracyError {
    /// Extracted although nothing was expected
    #[error("{field}: unexpected value '{extracted}'")]
    FalsePositive {
        /// Field
        field: CanonicalField,
        /// Extracted value
        extracted: String,
    },

    /// Expected but not extracted
    #[error("{field}: missing, expected '{expected}'")]
    FalseNegative {
        /// Field
        field: CanonicalField,
        /// Expected value
        expected: String,
    },

    /// Extracted with the wrong value
    #[error("{field}: expected '{expected}', got '{extracted}'")]
    IncorrectValue {
        /// Field
        field: CanonicalField,
        /// Expected value
        expected: String,
        /// Extracted value
        extracted: String,
    },
}

/// Accuracy of one extracted record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordAccuracy {
    /// Per-field outcome
    pub fields: BTreeMap<CanonicalField, FieldAccuracy>,
    /// Mean field score
    pub overall: f64,
    /// Fields that did not score
    pub errors: Vec<AccuracyError>,
}

/// Compare one expected value with one extracted value
///
/// # Examples
///
/// ```
/// use credex_eval::{score_field, FieldAccuracy};
///
/// assert_eq!(score_field(None, None), FieldAccuracy::Match);
/// assert_eq!(score_field(Some("22"), Some("22")).score(), 1.0);
/// assert_eq!(score_field(Some("22"), None).score(), 0.0);
/// ```
pub fn score_field(expected: Option<&str>, extracted: Option<&str>) -> FieldAccuracy {
    match (expected, extracted) {
        (None, None) => FieldAccuracy::Match,
        (None, Some(extracted)) => FieldAccuracy::FalsePositive {
            extracted: extracted.to_string(),
        },
        (Some(expected), None) => FieldAccuracy::Missing {
            expected: expected.to_string(),
        },
        (Some(expected), Some(extracted)) if expected == extracted => FieldAccuracy::ExactMatch,
        (Some(expected), Some(extracted)) => FieldAccuracy::Incorrect {
            expected: expected.to_string(),
            extracted: extracted.to_string(),
            similarity: character_similarity(expected, extracted),
        },
    }
}

/// Score every content field of `extracted` against `expected`
///
/// `confidence` is not scored.
pub fn score_record(expected: &CanonicalRecord, extracted: &CanonicalRecord) -> RecordAccuracy {
    score_pairs(
        CanonicalField::CONTENT
            .iter()
            .map(|field| (*field, field.value_of(expected))),
        extracted,
    )
}

/// Score only the fields listed in a fixture's expected answers
pub fn score_expected(expected: &ExpectedFields, extracted: &CanonicalRecord) -> RecordAccuracy {
    score_pairs(
        expected
            .iter()
            .map(|(field, value)| (*field, non_blank(value).map(str::to_string))),
        extracted,
    )
}

fn score_pairs(
    expected: impl Iterator<Item = (CanonicalField, Option<String>)>,
    extracted: &CanonicalRecord,
) -> RecordAccuracy {
    let mut fields = BTreeMap::new();
    let mut errors = Vec::new();

    for (field, expected) in expected {
        let value = field.value_of(extracted);
        let accuracy = score_field(expected.as_deref(), value.as_deref());
        if let Some(error) = accuracy.error(field) {
            errors.push(error);
        }
        fields.insert(field, accuracy);
    }

    let overall = if fields.is_empty() {
        0.0
    } else {
        fields.values().map(FieldAccuracy::score).sum::<f64>() / fields.len() as f64
    };

    RecordAccuracy {
        fields,
        overall,
        errors,
    }
}

pub(crate) fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Similarity in 0.0-1.0 ignoring case and spaces
///
/// `max(0, (maxLen - levenshtein) / maxLen)` over the normalized strings;
/// two empty strings are identical.
pub fn character_similarity(expected: &str, extracted: &str) -> f64 {
    let expected: Vec<char> = normalize(expected);
    let extracted: Vec<char> = normalize(extracted);

    let max_len = expected.len().max(extracted.len());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein(&expected, &extracted);
    ((max_len - distance) as f64 / max_len as f64).max(0.0)
}

fn normalize(text: &str) -> Vec<char> {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| *c != ' ')
        .collect()
}

/// Edit distance between two character sequences
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }

    // Single row of the DP matrix
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_score_field_cases() {
        assert_eq!(score_field(None, None), FieldAccuracy::Match);
        assert_eq!(score_field(Some("x"), Some("x")), FieldAccuracy::ExactMatch);
        assert_eq!(score_field(Some("x"), Some("x")).score(), 1.0);
        assert_eq!(
            score_field(None, Some("admin")),
            FieldAccuracy::FalsePositive {
                extracted: "admin".to_string()
            }
        );
        assert_eq!(
            score_field(Some("admin"), None),
            FieldAccuracy::Missing {
                expected: "admin".to_string()
            }
        );
    }

    #[test]
    fn test_incorrect_keeps_both_values() {
        let accuracy = score_field(Some("GitHub"), Some("Git Hub Inc"));
        match &accuracy {
            FieldAccuracy::Incorrect {
                expected,
                extracted,
                similarity,
            } => {
                assert_eq!(expected, "GitHub");
                assert_eq!(extracted, "Git Hub Inc");
                // "github" vs "githubinc": 3 insertions over 9 chars
                assert!((similarity - 6.0 / 9.0).abs() < 1e-9);
            }
            other => panic!("unexpected accuracy: {other:?}"),
        }
        assert_eq!(accuracy.score(), 0.0);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein(&chars(""), &chars("abc")), 3);
        assert_eq!(levenshtein(&chars("abc"), &chars("")), 3);
        assert_eq!(levenshtein(&chars("管理者"), &chars("管理人")), 1);
    }

    #[test]
    fn test_character_similarity_normalizes() {
        assert_eq!(character_similarity("Git Hub", "github"), 1.0);
        assert_eq!(character_similarity("", "  "), 1.0);
        assert_eq!(character_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_score_record_ignores_confidence() {
        let expected = CanonicalRecord {
            title: Some("GitHub".to_string()),
            user_id: Some("admin@example.com".to_string()),
            ..Default::default()
        };
        let extracted = CanonicalRecord {
            title: Some("GitHub".to_string()),
            password: Some("secret123".to_string()),
            confidence: Some(0.4),
            ..Default::default()
        };

        let accuracy = score_record(&expected, &extracted);
        assert_eq!(accuracy.fields.len(), CanonicalField::CONTENT.len());
        assert!(!accuracy.fields.contains_key(&CanonicalField::Confidence));
        // 7 of 9 fields score: title matches, six are absent on both sides
        assert!((accuracy.overall - 7.0 / 9.0).abs() < 1e-9);
        assert_eq!(accuracy.errors.len(), 2);
        assert!(accuracy.errors.contains(&AccuracyError::FalseNegative {
            field: CanonicalField::UserId,
            expected: "admin@example.com".to_string(),
        }));
    }

    #[test]
    fn test_score_expected_only_listed_fields() {
        let mut expected = ExpectedFields::new();
        expected.insert(CanonicalField::Port, "22".to_string());
        expected.insert(CanonicalField::Url, String::new());

        let extracted = CanonicalRecord {
            port: Some(22),
            title: Some("db".to_string()),
            ..Default::default()
        };

        let accuracy = score_expected(&expected, &extracted);
        assert_eq!(accuracy.fields.len(), 2);
        assert_eq!(accuracy.fields[&CanonicalField::Port], FieldAccuracy::ExactMatch);
        assert_eq!(accuracy.fields[&CanonicalField::Url], FieldAccuracy::Match);
        assert_eq!(accuracy.overall, 1.0);
        assert!(accuracy.errors.is_empty());
    }

    #[test]
    fn test_error_messages() {
        let err = AccuracyError::IncorrectValue {
            field: CanonicalField::UserId,
            expected: "a".to_string(),
            extracted: "b".to_string(),
        };
        assert_eq!(err.to_string(), "userID: expected 'a', got 'b'");
    }
}
