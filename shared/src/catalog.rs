//! Ingredient catalog with case-insensitive name uniqueness
//!
//! The catalog is an explicit, ordered collection owned by whichever layer
//! talks to persistence. It is passed by reference into the costing
//! functions through its [`CostLookup`] implementation.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::costing::CostLookup;
use crate::error::{CostingError, CostingResult};
use crate::models::{Ingredient, IngredientPayload};

/// Anything that carries an ingredient name
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Ingredient {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for IngredientPayload {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for String {
    fn name(&self) -> &str {
        self
    }
}

impl Named for &str {
    fn name(&self) -> &str {
        self
    }
}

/// Key used for name comparisons
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Counts produced by a merge
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeReport {
    /// Items added to the catalog
    pub accepted: usize,
    /// Items discarded because the catalog already had the name
    pub skipped_duplicates: usize,
    /// Later repeats of a name within the incoming batch itself
    pub collapsed_in_batch: usize,
}

impl MergeReport {
    pub fn discarded(&self) -> usize {
        self.skipped_duplicates + self.collapsed_in_batch
    }
}

impl std::fmt::Display for MergeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} accepted, {} skipped as duplicates",
            self.accepted, self.skipped_duplicates
        )?;
        if self.collapsed_in_batch > 0 {
            write!(f, ", {} repeated within the batch", self.collapsed_in_batch)?;
        }
        Ok(())
    }
}

/// Partition of an incoming batch by the deduplication rule
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan<T> {
    pub accepted: Vec<T>,
    pub skipped: Vec<T>,
    pub collapsed: Vec<T>,
}

impl<T> MergePlan<T> {
    pub fn report(&self) -> MergeReport {
        MergeReport {
            accepted: self.accepted.len(),
            skipped_duplicates: self.skipped.len(),
            collapsed_in_batch: self.collapsed.len(),
        }
    }
}

/// Split `incoming` against the `existing` names.
///
/// The first occurrence of a name in the batch wins. It is accepted unless the
/// existing names already contain it; later repeats are collapsed.
pub fn plan_merge<'a, T, E, I>(existing: E, incoming: I) -> MergePlan<T>
where
    T: Named,
    E: IntoIterator<Item = &'a str>,
    I: IntoIterator<Item = T>,
{
    let existing: HashSet<String> = existing.into_iter().map(normalize_name).collect();
    let mut seen = HashSet::new();
    let mut plan = MergePlan {
        accepted: Vec::new(),
        skipped: Vec::new(),
        collapsed: Vec::new(),
    };

    for item in incoming {
        let key = normalize_name(item.name());
        if !seen.insert(key.clone()) {
            plan.collapsed.push(item);
        } else if existing.contains(&key) {
            plan.skipped.push(item);
        } else {
            plan.accepted.push(item);
        }
    }

    plan
}

/// Ordered ingredient collection keyed by id, unique by name
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct IngredientCatalog {
    ingredients: Vec<Ingredient>,
}

impl IngredientCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a persistence listing, keeping the first record
    /// for each name
    pub fn from_records<I>(records: I) -> (Self, MergeReport)
    where
        I: IntoIterator<Item = Ingredient>,
    {
        let plan = plan_merge(std::iter::empty(), records);
        let report = plan.report();
        (
            Self {
                ingredients: plan.accepted,
            },
            report,
        )
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ingredient> {
        self.ingredients.iter()
    }

    pub fn as_slice(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(|i| i.name.as_str())
    }

    pub fn get(&self, id: Uuid) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Ingredient> {
        let key = normalize_name(name);
        self.ingredients
            .iter()
            .find(|i| normalize_name(&i.name) == key)
    }

    /// Resolve a recipe reference: by id first, then by name
    pub fn resolve(&self, reference: &str) -> Option<&Ingredient> {
        Uuid::parse_str(reference.trim())
            .ok()
            .and_then(|id| self.get(id))
            .or_else(|| self.find_by_name(reference))
    }

    /// Reject `name` if another ingredient already uses it
    pub fn ensure_unique_name(&self, name: &str, exclude: Option<Uuid>) -> CostingResult<()> {
        let key = normalize_name(name);
        let clash = self
            .ingredients
            .iter()
            .any(|i| Some(i.id) != exclude && normalize_name(&i.name) == key);
        if clash {
            return Err(CostingError::duplicate(name.trim()));
        }
        Ok(())
    }

    pub fn insert(&mut self, ingredient: Ingredient) -> CostingResult<()> {
        if self.get(ingredient.id).is_some() {
            return Err(CostingError::invalid("id", "already present in the catalog"));
        }
        self.ensure_unique_name(&ingredient.name, None)?;
        self.ingredients.push(ingredient);
        Ok(())
    }

    /// Swap in an edited record, returning the previous one
    pub fn replace(&mut self, ingredient: Ingredient) -> CostingResult<Ingredient> {
        let position = self
            .ingredients
            .iter()
            .position(|i| i.id == ingredient.id)
            .ok_or_else(|| CostingError::missing(ingredient.id.to_string()))?;
        self.ensure_unique_name(&ingredient.name, Some(ingredient.id))?;
        Ok(std::mem::replace(&mut self.ingredients[position], ingredient))
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Ingredient> {
        let position = self.ingredients.iter().position(|i| i.id == id)?;
        Some(self.ingredients.remove(position))
    }

    /// Merge a batch (e.g. a bulk import) into the catalog
    pub fn merge<I>(&mut self, incoming: I) -> MergeReport
    where
        I: IntoIterator<Item = Ingredient>,
    {
        let plan = plan_merge(self.names(), incoming);
        let report = plan.report();
        self.ingredients.extend(plan.accepted);
        report
    }
}

impl CostLookup for IngredientCatalog {
    fn unit_cost(&self, ingredient: &str) -> Option<Decimal> {
        self.resolve(ingredient)
            .and_then(|i| i.cost_per_base_unit().ok())
    }
}

impl<'a> IntoIterator for &'a IngredientCatalog {
    type Item = &'a Ingredient;
    type IntoIter = std::slice::Iter<'a, Ingredient>;

    fn into_iter(self) -> Self::IntoIter {
        self.ingredients.iter()
    }
}

impl<'de> Deserialize<'de> for IngredientCatalog {
    /// Deserialization applies the same first-wins rule as `from_records`
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let records = Vec::<Ingredient>::deserialize(deserializer)?;
        Ok(Self::from_records(records).0)
    }
}
