//! Ingredient service: catalog loading, form submission and CSV import

use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use shared::catalog::{IngredientCatalog, MergeReport};
use shared::validation::validate_ingredient_form;
use shared::{CostingError, CostingSettings, Ingredient, IngredientInput};

use crate::error::AppResult;
use crate::external::BusyFoolApi;

/// Ingredient service for keeping the local catalog in step with the API
#[derive(Clone)]
pub struct IngredientService {
    api: BusyFoolApi,
    settings: CostingSettings,
}

/// Result of a bulk CSV import
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    /// Records added to the catalog
    pub added: Vec<Ingredient>,
    pub report: MergeReport,
}

impl IngredientService {
    pub fn new(api: BusyFoolApi, settings: CostingSettings) -> Self {
        Self { api, settings }
    }

    pub fn settings(&self) -> &CostingSettings {
        &self.settings
    }

    /// Fetch every ingredient, keeping the first record for each name
    pub async fn load_catalog(&self) -> AppResult<IngredientCatalog> {
        let records = self.api.list_ingredients().await?;
        let (catalog, report) = IngredientCatalog::from_records(records);
        if report.collapsed_in_batch > 0 {
            tracing::warn!(
                "Ignored {} ingredient records with duplicate names",
                report.collapsed_in_batch
            );
        }
        tracing::debug!("Loaded {} ingredients", catalog.len());
        Ok(catalog)
    }

    /// Validate and create an ingredient
    pub async fn add(
        &self,
        catalog: &mut IngredientCatalog,
        input: &IngredientInput,
    ) -> AppResult<Ingredient> {
        let payload = validate_ingredient_form(input, catalog, &self.settings, None)?;
        let mut created = self.api.create_ingredient(&payload).await?;
        if created.category.is_none() {
            created.category = input.category.clone();
        }
        catalog.insert(created.clone())?;
        tracing::info!("Added ingredient {} ({})", created.name, created.id);
        Ok(created)
    }

    /// Validate and update an existing ingredient
    pub async fn edit(
        &self,
        catalog: &mut IngredientCatalog,
        id: Uuid,
        input: &IngredientInput,
    ) -> AppResult<Ingredient> {
        if catalog.get(id).is_none() {
            return Err(CostingError::missing(id.to_string()).into());
        }
        let payload = validate_ingredient_form(input, catalog, &self.settings, Some(id))?;
        let mut updated = self.api.update_ingredient(id, &payload).await?;
        if updated.category.is_none() {
            updated.category = input.category.clone();
        }
        catalog.replace(updated.clone())?;
        tracing::info!("Updated ingredient {} ({})", updated.name, updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, catalog: &mut IngredientCatalog, id: Uuid) -> AppResult<Ingredient> {
        if catalog.get(id).is_none() {
            return Err(CostingError::missing(id.to_string()).into());
        }
        self.api.delete_ingredient(id).await?;
        let removed = catalog
            .remove(id)
            .ok_or_else(|| CostingError::missing(id.to_string()))?;
        tracing::info!("Deleted ingredient {} ({})", removed.name, removed.id);
        Ok(removed)
    }

    /// Upload a CSV file and merge what the API created into the catalog
    pub async fn import_csv(
        &self,
        catalog: &mut IngredientCatalog,
        path: &Path,
    ) -> AppResult<ImportOutcome> {
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("ingredients.csv");

        let imported = self.api.import_ingredients_csv(file_name, contents).await?;
        let before = catalog.len();
        let report = catalog.merge(imported);
        let added = catalog.as_slice()[before..].to_vec();

        if report.discarded() > 0 {
            tracing::warn!("Import skipped duplicates: {}", report);
        }
        tracing::info!("Imported {} ingredients from {}", report.accepted, file_name);
        Ok(ImportOutcome { added, report })
    }
}
