//! Product and recipe models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_not_blank, validate_positive};

/// One line of a product recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeUsage {
    /// Ingredient id or name
    #[serde(alias = "ingredientId", alias = "ingredient")]
    pub ingredient_id: String,
    /// Quantity in the ingredient's recipe unit (ml, g or item)
    #[serde(alias = "quantityUsed", alias = "quantity")]
    pub quantity_used: Decimal,
}

impl RecipeUsage {
    pub fn new(ingredient_id: impl Into<String>, quantity_used: Decimal) -> Self {
        Self {
            ingredient_id: ingredient_id.into(),
            quantity_used,
        }
    }
}

/// A product on the menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(alias = "sellPrice")]
    pub sell_price: Decimal,
    #[serde(default)]
    pub ingredients: Vec<RecipeUsage>,
    /// Units sold in the reporting period
    #[serde(default, alias = "sales", alias = "unitsSold")]
    pub units_sold: u32,
}

/// Add/edit product form input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[validate(custom = "validate_positive")]
    pub sell_price: Decimal,
    #[serde(default)]
    pub ingredients: Vec<RecipeUsage>,
}
