//! Ingredient catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::MeasurementUnit;
use crate::costing::{compute_unit_cost, UnitCost};
use crate::error::CostingResult;
use crate::validation::{validate_non_negative, validate_not_blank, validate_positive};

/// An ingredient as stored by the persistence layer.
///
/// Derived costs (`cost_per_unit`, `cost_per_ml`, `cost_per_gram`) returned by
/// the API are ignored; they are recomputed from the fields below on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub unit: MeasurementUnit,
    /// Package size in `unit`
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub waste_percent: Decimal,
    pub supplier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ingredient {
    /// Waste-adjusted unit costs for this package
    pub fn unit_cost(&self) -> CostingResult<UnitCost> {
        compute_unit_cost(
            self.purchase_price,
            Some(self.quantity),
            self.waste_percent,
            self.unit,
        )
    }

    /// True cost of one recipe unit (ml, g or item) of this ingredient
    pub fn cost_per_base_unit(&self) -> CostingResult<Decimal> {
        Ok(self.unit_cost()?.for_unit(self.unit))
    }

    /// Money lost to waste on one purchased package
    pub fn waste_cost_per_package(&self) -> Decimal {
        self.purchase_price
            .checked_mul(self.waste_percent)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Validated ingredient body sent to the API on create and update.
///
/// Decimals go over the wire as JSON numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientPayload {
    pub name: String,
    pub unit: MeasurementUnit,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub purchase_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub waste_percent: Decimal,
    pub supplier: String,
}

impl IngredientPayload {
    /// Materialise the payload as a catalog record with the given id
    pub fn into_ingredient(self, id: Uuid, category: Option<String>) -> Ingredient {
        Ingredient {
            id,
            name: self.name,
            unit: self.unit,
            quantity: self.quantity,
            purchase_price: self.purchase_price,
            waste_percent: self.waste_percent,
            supplier: self.supplier,
            category,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Raw add/edit form input. Every field may be blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct IngredientInput {
    #[validate(required, custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(required)]
    pub unit: Option<MeasurementUnit>,
    #[validate(required, custom = "validate_positive")]
    pub quantity: Option<Decimal>,
    #[validate(required, custom = "validate_positive")]
    pub purchase_price: Option<Decimal>,
    /// Blank falls back to the category preset
    #[validate(custom = "validate_non_negative")]
    pub waste_percent: Option<Decimal>,
    #[validate(required, custom = "validate_not_blank")]
    pub supplier: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<&Ingredient> for IngredientInput {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            name: Some(ingredient.name.clone()),
            unit: Some(ingredient.unit),
            quantity: Some(ingredient.quantity),
            purchase_price: Some(ingredient.purchase_price),
            waste_percent: Some(ingredient.waste_percent),
            supplier: Some(ingredient.supplier.clone()),
            category: ingredient.category.clone(),
        }
    }
}

/// Response of the bulk CSV import endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImportedIngredients {
    #[serde(rename = "importedIngredients", default)]
    pub imported_ingredients: Vec<Ingredient>,
}
