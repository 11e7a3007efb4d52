//! Definition loading with a process-lifetime cache

use crate::error::DefinitionError;
use crate::model::{CategoryDefinition, SubCategoryDefinition};
use credex_domain::{MainCategory, SubCategory};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, info};

/// File name of the category definition resource
pub const CATEGORY_FILE: &str = "category_definitions.json";

/// Directory holding one resource per sub-category
pub const SUBCATEGORY_DIR: &str = "subcategories";

/// Loads definition resources from a root directory
///
/// Successful loads are cached for the lifetime of the loader and never
/// invalidated. Concurrent readers share the cache; a miss takes the write
/// lock only to insert.
#[derive(Debug)]
pub struct DefinitionLoader {
    root: PathBuf,
    category: RwLock<Option<Arc<CategoryDefinition>>>,
    sub_categories: RwLock<HashMap<SubCategory, Arc<SubCategoryDefinition>>>,
}

impl DefinitionLoader {
    /// Create a loader rooted at `root`
    ///
    /// Nothing is read until the first request.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            category: RwLock::new(None),
            sub_categories: RwLock::new(HashMap::new()),
        }
    }

    /// Root directory of the resources
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the category definition resource
    pub fn category_path(&self) -> PathBuf {
        self.root.join(CATEGORY_FILE)
    }

    /// Path of a sub-category resource
    pub fn sub_category_path(&self, sub: SubCategory) -> PathBuf {
        self.root
            .join(SUBCATEGORY_DIR)
            .join(format!("{}.json", sub.as_str()))
    }

    /// Load (or return the cached) category definition
    pub fn load_category_definition(&self) -> Result<Arc<CategoryDefinition>, DefinitionError> {
        if let Some(cached) = self
            .category
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(cached));
        }

        let path = self.category_path();
        let definition: CategoryDefinition = read_json("category_definitions", &path)?;
        info!(
            version = %definition.version,
            main_categories = definition.main_categories.len(),
            "Category definitions loaded"
        );

        let mut slot = self.category.write().unwrap_or_else(PoisonError::into_inner);
        // Another task may have filled the slot while we were reading
        let shared = slot.get_or_insert_with(|| Arc::new(definition));
        Ok(Arc::clone(shared))
    }

    /// Load (or return the cached) definition of one sub-category
    ///
    /// A definition that is inconsistent with `sub` is rejected before it is
    /// cached, so a bad mapping rule never reaches an extraction.
    pub fn load_sub_category_definition(
        &self,
        sub: SubCategory,
    ) -> Result<Arc<SubCategoryDefinition>, DefinitionError> {
        if let Some(cached) = self
            .sub_categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&sub)
        {
            return Ok(Arc::clone(cached));
        }

        let path = self.sub_category_path(sub);
        let definition: SubCategoryDefinition = read_json(sub.as_str(), &path)?;

        if definition.id != sub.as_str() {
            error!(expected = %sub, found = %definition.id, "Sub-category id mismatch");
            return Err(DefinitionError::Invalid {
                id: sub.as_str().to_string(),
                reason: format!(
                    "file {} declares id '{}'",
                    path.display(),
                    definition.id
                ),
            });
        }
        let problems = definition.problems(sub);
        if !problems.is_empty() {
            error!(sub_category = %sub, problems = problems.len(), "Sub-category definition rejected");
            return Err(DefinitionError::Invalid {
                id: sub.as_str().to_string(),
                reason: format!("{}: {}", path.display(), problems.join("; ")),
            });
        }
        debug!(sub_category = %sub, fields = definition.fields.len(), "Sub-category definition loaded");

        let mut cache = self
            .sub_categories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let shared = cache.entry(sub).or_insert_with(|| Arc::new(definition));
        Ok(Arc::clone(shared))
    }

    /// Sub-categories listed under `main` in the category definition, in order
    pub fn sub_category_ids(&self, main: MainCategory) -> Result<Vec<SubCategory>, DefinitionError> {
        let definition = self.load_category_definition()?;
        let entry = definition
            .main_category(main.as_str())
            .ok_or_else(|| DefinitionError::Invalid {
                id: "category_definitions".to_string(),
                reason: format!("main category '{}' is not defined", main),
            })?;

        entry
            .subcategories
            .iter()
            .map(|id| {
                SubCategory::parse(id).ok_or_else(|| DefinitionError::Invalid {
                    id: "category_definitions".to_string(),
                    reason: format!("unknown sub-category '{}' under '{}'", id, main),
                })
            })
            .collect()
    }

    /// Number of sub-category definitions currently cached
    pub fn cached_sub_categories(&self) -> usize {
        self.sub_categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn read_json<T: DeserializeOwned>(id: &str, path: &Path) -> Result<T, DefinitionError> {
    let data = std::fs::read_to_string(path).map_err(|source| {
        error!(id, path = %path.display(), "Definition resource unavailable");
        if source.kind() == std::io::ErrorKind::NotFound {
            DefinitionError::NotFound {
                id: id.to_string(),
                path: path.to_path_buf(),
            }
        } else {
            DefinitionError::Io {
                id: id.to_string(),
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&data).map_err(|e| {
        error!(id, path = %path.display(), error = %e, "Definition resource undecodable");
        DefinitionError::Decode {
            id: id.to_string(),
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })
}
