//! Fixture loading: test documents plus their expected answers
//!
//! A fixture directory holds `expected_answers.json`, a nested
//! `scenario -> level -> field -> value` map, and one document per scenario
//! and level. Documents are either `<scenario>_level<N>.txt` files at the top
//! level or `<scenario>/Level<N>_<label>.txt` files in a scenario directory.

use crate::error::{EvalError, Result};
use crate::scorer::ExpectedFields;
use credex_domain::CanonicalField;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File holding the expected answers
pub const EXPECTED_ANSWERS_FILE: &str = "expected_answers.json";

/// Raw shape of `expected_answers.json`
pub type ExpectedAnswers = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// One document to benchmark and what it should produce
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureCase {
    /// Scenario name (`Chat`, `Contract`, ...)
    pub scenario: String,
    /// Difficulty level, starting at 1
    pub level: u32,
    /// Document text
    pub document: String,
    /// Expected canonical fields
    pub expected: ExpectedFields,
}

impl FixtureCase {
    /// Display name, e.g. `Chat level2`
    pub fn name(&self) -> String {
        format!("{} level{}", self.scenario, self.level)
    }
}

/// Parse a test case name into scenario and level
///
/// Accepts `Chat level2`, `Chat Level2 General` and `Chat Level 2 (General)`.
/// The level defaults to 1 when none is given.
///
/// # Examples
///
/// ```
/// use credex_eval::parse_test_case_name;
///
/// assert_eq!(parse_test_case_name("Chat level2"), Some(("Chat".to_string(), 2)));
/// assert_eq!(parse_test_case_name("Contract"), Some(("Contract".to_string(), 1)));
/// assert_eq!(parse_test_case_name("  "), None);
/// ```
pub fn parse_test_case_name(name: &str) -> Option<(String, u32)> {
    let mut parts = name.trim().splitn(2, char::is_whitespace);
    let scenario = parts.next().filter(|s| !s.is_empty())?;
    let level = parts.next().and_then(parse_level).unwrap_or(1);
    Some((scenario.to_string(), level))
}

/// Parse a level label such as `level2`, `Level2_General` or `Level 2 (General)`
pub fn parse_level(label: &str) -> Option<u32> {
    let label = label.trim();
    let prefix = label.get(..5)?;
    if !prefix.eq_ignore_ascii_case("level") {
        return None;
    }
    let digits: String = label[5..]
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Loaded fixture directory
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    /// Cases ordered by scenario then level
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load every document under `dir` and pair it with its expected answers
    ///
    /// Documents without expected answers are kept with an empty expectation;
    /// expected answers without a document are skipped.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let answers = load_expected_answers(&dir.join(EXPECTED_ANSWERS_FILE))?;
        let documents = load_documents(dir)?;

        let mut cases = Vec::with_capacity(documents.len());
        for ((scenario, level), document) in documents {
            let expected = match lookup(&answers, &scenario, level) {
                Some(fields) => to_expected_fields(&scenario, fields)?,
                None => {
                    warn!(%scenario, level, "Document has no expected answers");
                    ExpectedFields::new()
                }
            };
            cases.push(FixtureCase {
                scenario,
                level,
                document,
                expected,
            });
        }

        for (scenario, levels) in &answers {
            for level in levels.keys().filter_map(|l| parse_level(l)) {
                if !cases.iter().any(|c| c.scenario == *scenario && c.level == level) {
                    warn!(%scenario, level, "Expected answers have no document");
                }
            }
        }

        if cases.is_empty() {
            return Err(EvalError::Fixture(format!(
                "no documents found in {}",
                dir.display()
            )));
        }

        info!(cases = cases.len(), dir = %dir.display(), "Fixtures loaded");
        Ok(Self { cases })
    }

    /// Keep only cases of `scenario` (case-insensitive)
    pub fn filter_scenario(mut self, scenario: &str) -> Self {
        self.cases
            .retain(|c| c.scenario.eq_ignore_ascii_case(scenario));
        self
    }

    /// Number of cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// True when there are no cases
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Read and decode `expected_answers.json`
pub fn load_expected_answers(path: &Path) -> Result<ExpectedAnswers> {
    let data = fs::read_to_string(path).map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|e| EvalError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Expected answers of `scenario` at `level`
///
/// Level keys may be `level2`, `Level2_General` or similar.
pub fn lookup<'a>(
    answers: &'a ExpectedAnswers,
    scenario: &str,
    level: u32,
) -> Option<&'a BTreeMap<String, String>> {
    answers
        .get(scenario)?
        .iter()
        .find(|(key, _)| parse_level(key) == Some(level))
        .map(|(_, fields)| fields)
}

fn to_expected_fields(scenario: &str, fields: &BTreeMap<String, String>) -> Result<ExpectedFields> {
    fields
        .iter()
        .map(|(name, value)| {
            CanonicalField::from_wire_name(name)
                .filter(|field| *field != CanonicalField::Confidence)
                .map(|field| (field, value.clone()))
                .ok_or_else(|| {
                    EvalError::Fixture(format!(
                        "{}: '{}' is not a scored canonical field",
                        scenario, name
                    ))
                })
        })
        .collect()
}

fn load_documents(dir: &Path) -> Result<BTreeMap<(String, u32), String>> {
    let mut documents = BTreeMap::new();

    for entry in read_dir(dir)? {
        if entry.is_dir() {
            let Some(scenario) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            for file in read_dir(&entry)? {
                let level = text_stem(&file).and_then(parse_level);
                if let Some(level) = level {
                    insert_document(&mut documents, scenario.to_string(), level, &file)?;
                }
            }
        } else if let Some((scenario, level)) = text_stem(&entry).and_then(split_flat_name) {
            insert_document(&mut documents, scenario, level, &entry)?;
        }
    }

    Ok(documents)
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_error = |source| EvalError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        paths.push(entry.map_err(io_error)?.path());
    }
    paths.sort();
    Ok(paths)
}

fn text_stem(path: &Path) -> Option<&str> {
    if path.extension().and_then(|e| e.to_str()) != Some("txt") {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}

fn split_flat_name(stem: &str) -> Option<(String, u32)> {
    let (scenario, level) = stem.rsplit_once('_')?;
    Some((scenario.to_string(), parse_level(level)?))
}

fn insert_document(
    documents: &mut BTreeMap<(String, u32), String>,
    scenario: String,
    level: u32,
    path: &Path,
) -> Result<()> {
    let text = fs::read_to_string(path).map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        warn!(path = %path.display(), "Skipping empty document");
        return Ok(());
    }
    debug!(%scenario, level, path = %path.display(), "Document loaded");
    documents.insert((scenario, level), text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, relative: &str, contents: &str) {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_parse_test_case_name() {
        assert_eq!(parse_test_case_name("Chat level2"), Some(("Chat".to_string(), 2)));
        assert_eq!(
            parse_test_case_name("Chat Level 2 (General)"),
            Some(("Chat".to_string(), 2))
        );
        assert_eq!(
            parse_test_case_name("PasswordManager Level3 Complex"),
            Some(("PasswordManager".to_string(), 3))
        );
        assert_eq!(parse_test_case_name("Chat basic"), Some(("Chat".to_string(), 1)));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("level1"), Some(1));
        assert_eq!(parse_level("Level2_General"), Some(2));
        assert_eq!(parse_level("LEVEL 3"), Some(3));
        assert_eq!(parse_level("lvl1"), None);
        assert_eq!(parse_level("level"), None);
        assert_eq!(parse_level("レベル1"), None);
    }

    #[test]
    fn test_load_flat_and_nested_layouts() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            EXPECTED_ANSWERS_FILE,
            r#"{
                "Chat": {"level1": {"title": "Slack", "userID": "alice"}},
                "Contract": {"Level2_General": {"title": "Cloud", "url": ""}}
            }"#,
        );
        write(&dir, "Chat_level1.txt", "Slack login alice / pw1");
        write(&dir, "Contract/Level2_General.txt", "Cloud contract");
        write(&dir, "notes.md", "ignored");

        let set = FixtureSet::load(dir.path()).unwrap();
        assert_eq!(set.len(), 2);

        let chat = &set.cases[0];
        assert_eq!(chat.name(), "Chat level1");
        assert_eq!(chat.expected[&CanonicalField::UserId], "alice");

        let contract = &set.cases[1];
        assert_eq!(contract.level, 2);
        assert_eq!(contract.expected[&CanonicalField::Url], "");
        assert_eq!(contract.document, "Cloud contract");
    }

    #[test]
    fn test_document_without_answers_is_kept() {
        let dir = TempDir::new().unwrap();
        write(&dir, EXPECTED_ANSWERS_FILE, "{}");
        write(&dir, "Chat_level3.txt", "text");

        let set = FixtureSet::load(dir.path()).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.cases[0].expected.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            EXPECTED_ANSWERS_FILE,
            r#"{"Chat": {"level1": {"nickname": "al"}}}"#,
        );
        write(&dir, "Chat_level1.txt", "text");

        let err = FixtureSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, EvalError::Fixture(ref m) if m.contains("nickname")));
    }

    #[test]
    fn test_missing_answers_file() {
        let dir = TempDir::new().unwrap();
        let err = FixtureSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, EvalError::Io { .. }));
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, EXPECTED_ANSWERS_FILE, "{}");
        write(&dir, "Chat_level1.txt", "   \n");

        let err = FixtureSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, EvalError::Fixture(_)));
    }

    #[test]
    fn test_filter_scenario() {
        let set = FixtureSet {
            cases: vec![
                FixtureCase {
                    scenario: "Chat".to_string(),
                    level: 1,
                    document: "a".to_string(),
                    expected: ExpectedFields::new(),
                },
                FixtureCase {
                    scenario: "Contract".to_string(),
                    level: 1,
                    document: "b".to_string(),
                    expected: ExpectedFields::new(),
                },
            ],
        };
        let set = set.filter_scenario("chat");
        assert_eq!(set.len(), 1);
        assert_eq!(set.cases[0].scenario, "Chat");
    }
}
