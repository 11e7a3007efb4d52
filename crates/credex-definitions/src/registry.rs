//! Per sub-category schema and mapping lookup, plus cross-reference checks

use crate::error::DefinitionError;
use crate::loader::DefinitionLoader;
use crate::model::{ExtractionSchema, MappingRule};
use credex_domain::{MainCategory, SubCategory};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Fields every schema is expected to leave to the mapper unconditionally
const PASS_THROUGH_FIELDS: [&str; 2] = ["title", "note"];

/// Schema and mapping lookup built on a [`DefinitionLoader`]
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    loader: Arc<DefinitionLoader>,
}

impl SchemaRegistry {
    /// Create a registry sharing `loader`'s cache
    pub fn new(loader: Arc<DefinitionLoader>) -> Self {
        Self { loader }
    }

    /// Underlying loader
    pub fn loader(&self) -> &Arc<DefinitionLoader> {
        &self.loader
    }

    /// Extraction schema of `sub`
    pub fn schema(&self, sub: SubCategory) -> Result<ExtractionSchema, DefinitionError> {
        let definition = self.loader.load_sub_category_definition(sub)?;
        Ok(ExtractionSchema {
            sub_category: sub,
            fields: definition.fields.clone(),
        })
    }

    /// Mapping rule of `sub`, tagged with its sub-category
    pub fn mapping_rule(&self, sub: SubCategory) -> Result<MappingRule, DefinitionError> {
        let definition = self.loader.load_sub_category_definition(sub)?;
        let mut rule = definition.mapping.clone();
        rule.sub_category = Some(sub);
        Ok(rule)
    }

    /// Schema and mapping rule of `sub` in one lookup
    pub fn entry(&self, sub: SubCategory) -> Result<(ExtractionSchema, MappingRule), DefinitionError> {
        Ok((self.schema(sub)?, self.mapping_rule(sub)?))
    }

    /// Load every definition and check cross-references
    ///
    /// Load failures are returned as errors. Inconsistencies between resources
    /// are collected in the report so they can all be shown at once.
    pub fn validate_all(&self) -> Result<RegistryReport, DefinitionError> {
        let mut report = RegistryReport::default();
        let category = self.loader.load_category_definition()?;

        let mut listed: HashSet<SubCategory> = HashSet::new();
        for main in MainCategory::ALL {
            let Some(entry) = category.main_category(main.as_str()) else {
                report.problem("category_definitions", format!("main category '{}' is missing", main));
                continue;
            };
            for id in &entry.subcategories {
                match SubCategory::parse(id) {
                    None => report.problem(
                        "category_definitions",
                        format!("unknown sub-category '{}' under '{}'", id, main),
                    ),
                    Some(sub) if sub.main_category() != main => report.problem(
                        "category_definitions",
                        format!(
                            "'{}' is listed under '{}' but belongs to '{}'",
                            sub,
                            main,
                            sub.main_category()
                        ),
                    ),
                    Some(sub) => {
                        if !listed.insert(sub) {
                            report.problem(
                                "category_definitions",
                                format!("'{}' is listed more than once", sub),
                            );
                        }
                    }
                }
            }
        }
        for entry in &category.main_categories {
            if MainCategory::parse(&entry.id).is_none() {
                report.problem(
                    "category_definitions",
                    format!("unknown main category '{}'", entry.id),
                );
            }
        }
        for sub in SubCategory::ALL {
            if !listed.contains(&sub) {
                report.problem(
                    "category_definitions",
                    format!("'{}' is not listed under any main category", sub),
                );
            }
        }

        for sub in SubCategory::ALL {
            self.check_sub_category(sub, &mut report)?;
        }

        if report.is_valid() {
            info!(
                sub_categories = report.checked,
                unused_fields = report.unused_fields.len(),
                "Definitions validated"
            );
        } else {
            warn!(problems = report.problems.len(), "Definition problems found");
        }
        Ok(report)
    }

    fn check_sub_category(
        &self,
        sub: SubCategory,
        report: &mut RegistryReport,
    ) -> Result<(), DefinitionError> {
        report.checked += 1;
        let definition = match self.loader.load_sub_category_definition(sub) {
            Ok(definition) => definition,
            Err(DefinitionError::Invalid { id, reason }) => {
                report.problem(&id, reason);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        for field in &definition.fields {
            let used = definition.mapping.direct_mapping.contains_key(&field.name)
                || definition.mapping.note_append_mapping.contains_key(&field.name);
            if !used && !PASS_THROUGH_FIELDS.contains(&field.name.as_str()) {
                report.unused_fields.push((sub, field.name.clone()));
            }
        }

        Ok(())
    }
}

/// One inconsistency found by [`SchemaRegistry::validate_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionProblem {
    /// Resource id
    pub id: String,
    /// What is wrong
    pub message: String,
}

impl fmt::Display for DefinitionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}

/// Outcome of [`SchemaRegistry::validate_all`]
#[derive(Debug, Clone, Default)]
pub struct RegistryReport {
    /// Sub-category definitions checked
    pub checked: usize,
    /// Inconsistencies; any entry makes the definitions unusable
    pub problems: Vec<DefinitionProblem>,
    /// Declared fields that no mapping consumes
    pub unused_fields: Vec<(SubCategory, String)>,
}

impl RegistryReport {
    fn problem(&mut self, id: &str, message: String) {
        self.problems.push(DefinitionProblem {
            id: id.to_string(),
            message,
        });
    }

    /// True when no problems were found
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    /// Convert problems into a single configuration error
    pub fn into_result(self) -> Result<Self, DefinitionError> {
        match self.problems.first() {
            None => Ok(self),
            Some(first) => Err(DefinitionError::Invalid {
                id: first.id.clone(),
                reason: self
                    .problems
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            }),
        }
    }
}
