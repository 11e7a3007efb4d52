//! Definitions command implementation.

use super::Session;
use crate::cli::{DefinitionsAction, DefinitionsArgs};
use crate::error::Result;
use crate::output::CategoryRow;
use credex_definitions::{DefinitionLoader, SchemaRegistry};
use credex_domain::{Language, MainCategory};
use std::sync::Arc;

/// Execute a definitions action.
pub fn execute_definitions(args: DefinitionsArgs, session: &Session) -> Result<()> {
    match args.action {
        DefinitionsAction::Validate => {
            let registry = SchemaRegistry::new(Arc::clone(&session.loader));
            let report = registry.validate_all()?;
            println!("{}", session.formatter.format_registry_report(&report)?);
            // Any problem exits with the configuration status
            report.into_result()?;
        }
        DefinitionsAction::List => {
            let rows = category_rows(&session.loader, session.config.extractor.language)?;
            println!("{}", session.formatter.format_categories(&rows)?);
        }
    }
    Ok(())
}

/// One row per sub-category, in taxonomy order.
pub fn category_rows(loader: &DefinitionLoader, language: Language) -> Result<Vec<CategoryRow>> {
    let mut rows = Vec::new();
    for main in MainCategory::ALL {
        for sub in loader.sub_category_ids(main)? {
            let definition = loader.load_sub_category_definition(sub)?;
            rows.push(CategoryRow {
                main_category: main.to_string(),
                sub_category: sub.to_string(),
                name: definition.name.get(language).clone(),
                fields: definition.fields.len(),
                explicit_prompt: definition.prompts.extraction.is_some(),
            });
        }
    }
    Ok(rows)
}
