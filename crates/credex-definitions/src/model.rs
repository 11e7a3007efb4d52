//! Definition resource shapes and the schema types derived from them

use credex_domain::{CanonicalField, Language, SubCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A value available in both prompt languages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Localized<T> {
    /// Japanese
    pub ja: T,
    /// English
    pub en: T,
}

impl<T> Localized<T> {
    /// Pick the value for `language`
    pub fn get(&self, language: Language) -> &T {
        match language {
            Language::Ja => &self.ja,
            Language::En => &self.en,
        }
    }
}

/// Contents of `category_definitions.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDefinition {
    /// Resource version
    pub version: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Main categories in prompt order
    pub main_categories: Vec<MainCategoryDef>,
    /// Routing prompt templates
    pub prompts: CategoryPrompts,
}

impl CategoryDefinition {
    /// Find a main category entry by id
    pub fn main_category(&self, id: &str) -> Option<&MainCategoryDef> {
        self.main_categories.iter().find(|m| m.id == id)
    }
}

/// One main category entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainCategoryDef {
    /// Category id (`personal`, `financial`, ...)
    pub id: String,
    /// Display name
    pub name: Localized<String>,
    /// Description shown to the model
    pub description: Localized<String>,
    /// Example documents shown to the model
    pub examples: Localized<Vec<String>>,
    /// Sub-category ids owned by this category
    pub subcategories: Vec<String>,
}

/// Routing prompt templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPrompts {
    /// Stage A template (`{MAIN_CATEGORY_DEFINITIONS}`, `{TEXT}`)
    pub main_category_judgment: Localized<String>,
    /// Stage B template (`{MAIN_CATEGORY_NAME}`, `{SUB_CATEGORY_COUNT}`,
    /// `{SUB_CATEGORY_DEFINITIONS}`, `{TEXT}`)
    pub sub_category_judgment: Localized<String>,
}

/// Contents of `subcategories/<id>.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryDefinition {
    /// Sub-category id; must match the file stem
    pub id: String,
    /// Owning main category id
    pub main_category_id: String,
    /// Display name
    pub name: Localized<String>,
    /// Description shown to the router
    pub description: Localized<String>,
    /// Examples shown to the router
    #[serde(default = "empty_examples")]
    pub examples: Localized<Vec<String>>,
    /// Extraction schema fields, in output order
    pub fields: Vec<FieldSpec>,
    /// Optional explicit prompts
    #[serde(default)]
    pub prompts: SubCategoryPrompts,
    /// Conversion rule to the canonical record
    pub mapping: MappingRule,
}

impl SubCategoryDefinition {
    /// Inconsistencies that make the definition unusable for `sub`
    ///
    /// Covers the owning main category, the mapping tag, field declarations,
    /// mapping keys and targets, and the `{TEXT}` placeholder of an explicit
    /// extraction prompt.
    pub fn problems(&self, sub: SubCategory) -> Vec<String> {
        let mut problems = Vec::new();

        if self.main_category_id != sub.main_category().as_str() {
            problems.push(format!(
                "mainCategoryId is '{}', expected '{}'",
                self.main_category_id,
                sub.main_category()
            ));
        }
        if let Some(tagged) = self.mapping.sub_category {
            if tagged != sub {
                problems.push(format!("mapping is tagged '{}'", tagged));
            }
        }
        if self.fields.is_empty() {
            problems.push("schema declares no fields".to_string());
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                problems.push(format!("field '{}' is declared twice", field.name));
            }
            if field.field_type == FieldType::String && (field.min.is_some() || field.max.is_some()) {
                problems.push(format!("string field '{}' has numeric bounds", field.name));
            }
            if let (Some(min), Some(max)) = (field.min, field.max) {
                if min > max {
                    problems.push(format!("field '{}' has min {} > max {}", field.name, min, max));
                }
            }
        }

        for (source, target) in &self.mapping.direct_mapping {
            if !names.contains(source.as_str()) {
                problems.push(format!(
                    "directMapping '{}' -> '{}': field not declared",
                    source, target
                ));
            }
            if CanonicalField::from_wire_name(target).is_none() {
                problems.push(format!(
                    "directMapping '{}' -> '{}': not a canonical field",
                    source, target
                ));
            }
        }
        for (source, label) in &self.mapping.note_append_mapping {
            if !names.contains(source.as_str()) {
                problems.push(format!(
                    "noteAppendMapping '{}' -> '{}': field not declared",
                    source, label
                ));
            }
        }

        if let Some(prompt) = &self.prompts.extraction {
            for (lang, text) in [("ja", &prompt.ja), ("en", &prompt.en)] {
                if !text.contains("{TEXT}") {
                    problems.push(format!("{} extraction prompt has no {{TEXT}} placeholder", lang));
                }
            }
        }

        problems
    }
}

fn empty_examples() -> Localized<Vec<String>> {
    Localized {
        ja: Vec::new(),
        en: Vec::new(),
    }
}

/// Explicit prompt templates of a sub-category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubCategoryPrompts {
    /// Extraction template with a `{TEXT}` placeholder
    #[serde(default)]
    pub extraction: Option<Localized<String>>,
}

/// Declared type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    #[default]
    String,
    /// Whole number, optionally range-checked
    Integer,
}

impl FieldType {
    /// Name used in schema listings
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
        }
    }
}

/// One field of an extraction schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key the model must use
    pub name: String,
    /// Human description
    pub description: Localized<String>,
    /// Declared type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Inclusive lower bound (integer fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Inclusive upper bound (integer fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Whether the model must always fill it
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    /// Whether `value` satisfies the declared bounds
    pub fn accepts(&self, value: i64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Ordered, typed, optional fields expected from one extraction call
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSchema {
    /// Sub-category the schema belongs to
    pub sub_category: SubCategory,
    /// Fields in output order
    pub fields: Vec<FieldSpec>,
}

impl ExtractionSchema {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `name` is declared
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Integer-typed fields
    pub fn integer_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| f.field_type == FieldType::Integer)
    }

    /// Field names in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Conversion rule from a schema record to the canonical record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRule {
    /// Sub-category the rule applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<SubCategory>,
    /// Source field -> canonical field wire name
    pub direct_mapping: BTreeMap<String, String>,
    /// Source field -> note label
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub note_append_mapping: BTreeMap<String, String>,
    /// Reserved; carried but not interpreted
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_rules: BTreeMap<String, String>,
}

/// A value decoded from a model reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaValue {
    /// Integer field value
    Integer(i64),
    /// Any other field value
    Text(String),
}

impl SchemaValue {
    /// Render as text; empty text counts as absent
    pub fn as_text(&self) -> Option<String> {
        match self {
            SchemaValue::Integer(n) => Some(n.to_string()),
            SchemaValue::Text(s) if s.trim().is_empty() => None,
            SchemaValue::Text(s) => Some(s.clone()),
        }
    }
}

/// Values of one extraction reply, tagged with the schema that produced them
///
/// Entries keep schema field order; absent fields are not stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRecord {
    /// Schema the record was decoded against
    pub sub_category: SubCategory,
    entries: Vec<(String, SchemaValue)>,
}

impl SchemaRecord {
    /// Create an empty record for `sub_category`
    pub fn new(sub_category: SubCategory) -> Self {
        Self {
            sub_category,
            entries: Vec::new(),
        }
    }

    /// Append a value; an existing entry with the same name is replaced
    pub fn insert(&mut self, name: impl Into<String>, value: SchemaValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style insert of a text value
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, SchemaValue::Text(value.into()));
        self
    }

    /// Value of a field, if present
    pub fn get(&self, name: &str) -> Option<&SchemaValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Present entries in schema order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &SchemaValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of present entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_spec_bounds() {
        let port: FieldSpec = serde_json::from_str(
            r#"{"name": "port", "description": {"ja": "ポート", "en": "Port"},
                "type": "integer", "min": 1, "max": 65535}"#,
        )
        .unwrap();
        assert_eq!(port.field_type, FieldType::Integer);
        assert!(port.accepts(22));
        assert!(!port.accepts(0));
        assert!(!port.accepts(99999));
        assert!(!port.required);
    }

    #[test]
    fn test_field_type_defaults_to_string() {
        let field: FieldSpec = serde_json::from_str(
            r#"{"name": "title", "description": {"ja": "t", "en": "t"}}"#,
        )
        .unwrap();
        assert_eq!(field.field_type, FieldType::String);
        assert!(field.accepts(i64::MIN));
    }

    fn server_definition() -> SubCategoryDefinition {
        serde_json::from_str(
            r#"{
                "id": "workServer",
                "mainCategoryId": "work",
                "name": {"ja": "サーバー", "en": "Servers"},
                "description": {"ja": "x", "en": "x"},
                "fields": [
                    {"name": "title", "description": {"ja": "t", "en": "t"}},
                    {"name": "port", "description": {"ja": "p", "en": "p"},
                     "type": "integer", "min": 1, "max": 65535},
                    {"name": "plan", "description": {"ja": "p", "en": "p"}}
                ],
                "mapping": {
                    "directMapping": {"title": "title", "port": "port"},
                    "noteAppendMapping": {"plan": "Plan"}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_consistent_definition_has_no_problems() {
        assert!(server_definition().problems(SubCategory::WorkServer).is_empty());
    }

    #[test]
    fn test_definition_problems() {
        let mut definition = server_definition();
        definition.mapping.direct_mapping.insert("hostname".into(), "host".into());
        definition.mapping.direct_mapping.insert("title".into(), "heading".into());
        definition.mapping.note_append_mapping.insert("tier".into(), "Tier".into());

        let problems = definition.problems(SubCategory::WorkServer);
        assert_eq!(problems.len(), 3, "{problems:?}");
        assert!(problems[0].contains("'hostname' -> 'host': field not declared"));
        assert!(problems[1].contains("'title' -> 'heading': not a canonical field"));
        assert!(problems[2].contains("noteAppendMapping 'tier'"));

        // Same file served under another sub-category
        let problems = server_definition().problems(SubCategory::FinancialBanking);
        assert_eq!(problems, vec!["mainCategoryId is 'work', expected 'financial'"]);
    }

    #[test]
    fn test_mapping_rule_optional_parts() {
        let rule: MappingRule = serde_json::from_str(
            r#"{"subCategory": "digitalAI", "directMapping": {"serviceName": "title"}}"#,
        )
        .unwrap();
        assert_eq!(rule.sub_category, Some(SubCategory::DigitalAi));
        assert!(rule.note_append_mapping.is_empty());
        assert!(rule.custom_rules.is_empty());
    }

    #[test]
    fn test_schema_record_keeps_insert_order() {
        let mut record = SchemaRecord::new(SubCategory::WorkServer)
            .with_text("title", "db")
            .with_text("host", "10.0.0.5");
        record.insert("port", SchemaValue::Integer(22));
        record.insert("title", SchemaValue::Text("db-1".to_string()));

        let names: Vec<&str> = record.entries().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["title", "host", "port"]);
        assert_eq!(
            record.get("title"),
            Some(&SchemaValue::Text("db-1".to_string()))
        );
    }

    #[test]
    fn test_schema_value_text() {
        assert_eq!(SchemaValue::Integer(8080).as_text(), Some("8080".to_string()));
        assert_eq!(SchemaValue::Text("  ".to_string()).as_text(), None);
    }
}
