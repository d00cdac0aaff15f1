//! Derived ingredient and product views
//!
//! Rows are recomputed from the catalog and product list on every call; no
//! cost or margin is ever cached on a record.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::IngredientCatalog;
use crate::costing::{
    compute_product_margin, unresolved_references, CostLookup, MarginPolicy, MarginStatus,
    ProductMargin, UnitCost,
};
use crate::error::CostingError;
use crate::models::{MeasurementUnit, Product};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn contains_text(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        Some(needle) if !needle.is_empty() => {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
        _ => true,
    }
}

// ============================================================================
// Ingredients
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IngredientSortKey {
    #[default]
    Name,
    Unit,
    Quantity,
    PurchasePrice,
    WastePercent,
    Supplier,
    Cost,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: IngredientSortKey,
    #[serde(default)]
    pub order: SortOrder,
}

/// One line of the ingredient table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientRow {
    pub id: Uuid,
    pub name: String,
    pub unit: MeasurementUnit,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub waste_percent: Decimal,
    pub supplier: String,
    pub category: Option<String>,
    /// Absent when the stored figures cannot be costed
    pub unit_cost: Option<UnitCost>,
    /// Cost per recipe unit (ml, g or item)
    pub display_cost: Option<Decimal>,
    pub display_unit: MeasurementUnit,
}

pub fn ingredient_rows(catalog: &IngredientCatalog, query: &IngredientQuery) -> Vec<IngredientRow> {
    let mut rows: Vec<IngredientRow> = catalog
        .iter()
        .filter(|i| contains_text(&i.name, query.search.as_deref()))
        .map(|i| {
            let unit_cost = i.unit_cost().ok();
            IngredientRow {
                id: i.id,
                name: i.name.clone(),
                unit: i.unit,
                quantity: i.quantity,
                purchase_price: i.purchase_price,
                waste_percent: i.waste_percent,
                supplier: i.supplier.clone(),
                category: i.category.clone(),
                display_cost: unit_cost.map(|c| c.for_unit(i.unit)),
                unit_cost,
                display_unit: i.unit.recipe_unit(),
            }
        })
        .collect();

    let order = query.order;
    rows.sort_by(|a, b| match query.sort_by {
        IngredientSortKey::Name => order.apply(compare_text(&a.name, &b.name)),
        IngredientSortKey::Unit => order.apply(compare_text(a.unit.symbol(), b.unit.symbol())),
        IngredientSortKey::Quantity => order.apply(a.quantity.cmp(&b.quantity)),
        IngredientSortKey::PurchasePrice => order.apply(a.purchase_price.cmp(&b.purchase_price)),
        IngredientSortKey::WastePercent => order.apply(a.waste_percent.cmp(&b.waste_percent)),
        IngredientSortKey::Supplier => order.apply(compare_text(&a.supplier, &b.supplier)),
        IngredientSortKey::Cost => match (a.display_cost, b.display_cost) {
            (Some(x), Some(y)) => order.apply(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    });
    rows
}

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortKey {
    #[default]
    Margin,
    Sales,
    Price,
    Name,
    Impact,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub search: Option<String>,
    /// Exact category match
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<MarginStatus>,
    #[serde(default)]
    pub sort_by: ProductSortKey,
}

/// Outcome of costing one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductCosting {
    Costed(ProductMargin),
    /// Empty recipe, or ingredients with no cost on record
    MissingRecipe { unresolved: Vec<String> },
    Invalid { reason: String },
}

impl ProductCosting {
    pub fn margin(&self) -> Option<&ProductMargin> {
        match self {
            ProductCosting::Costed(margin) => Some(margin),
            _ => None,
        }
    }
}

/// Cost one product against a lookup
pub fn cost_product<L: CostLookup + ?Sized>(
    product: &Product,
    lookup: &L,
    policy: &MarginPolicy,
) -> ProductCosting {
    if product.ingredients.is_empty() {
        return ProductCosting::MissingRecipe {
            unresolved: Vec::new(),
        };
    }

    match compute_product_margin(product.sell_price, &product.ingredients, lookup, policy) {
        Ok(margin) => ProductCosting::Costed(margin),
        Err(CostingError::MissingReference { .. }) => ProductCosting::MissingRecipe {
            unresolved: unresolved_references(&product.ingredients, lookup),
        },
        Err(err) => ProductCosting::Invalid {
            reason: err.to_string(),
        },
    }
}

/// One line of the product table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub sell_price: Decimal,
    pub units_sold: u32,
    pub costing: ProductCosting,
}

impl ProductRow {
    pub fn from_product<L: CostLookup + ?Sized>(
        product: &Product,
        lookup: &L,
        policy: &MarginPolicy,
    ) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            sell_price: product.sell_price,
            units_sold: product.units_sold,
            costing: cost_product(product, lookup, policy),
        }
    }

    pub fn margin(&self) -> Option<&ProductMargin> {
        self.costing.margin()
    }

    pub fn status(&self) -> Option<MarginStatus> {
        self.margin().map(|m| m.status)
    }

    pub fn is_costed(&self) -> bool {
        self.margin().is_some()
    }

    /// `|margin_amount * units_sold|`
    pub fn impact(&self) -> Option<Decimal> {
        self.margin()
            .and_then(|m| m.margin_amount.checked_mul(Decimal::from(self.units_sold)))
            .map(|v| v.abs())
    }
}

/// Cost, filter and sort the product table
pub fn product_rows<L: CostLookup + ?Sized>(
    products: &[Product],
    lookup: &L,
    policy: &MarginPolicy,
    query: &ProductQuery,
) -> Vec<ProductRow> {
    let mut rows: Vec<ProductRow> = products
        .iter()
        .filter(|p| contains_text(&p.name, query.search.as_deref()))
        .filter(|p| query.category.as_deref().map_or(true, |c| p.category == c))
        .map(|p| ProductRow::from_product(p, lookup, policy))
        .filter(|row| query.status.map_or(true, |s| row.status() == Some(s)))
        .collect();

    rows.sort_by(|a, b| {
        b.is_costed()
            .cmp(&a.is_costed())
            .then_with(|| compare_products(a, b, query.sort_by))
    });
    rows
}

fn compare_products(a: &ProductRow, b: &ProductRow, key: ProductSortKey) -> Ordering {
    match key {
        ProductSortKey::Margin => {
            let pct = |row: &ProductRow| row.margin().map(|m| m.margin_percent);
            pct(b).cmp(&pct(a))
        }
        ProductSortKey::Sales => b.units_sold.cmp(&a.units_sold),
        ProductSortKey::Price => b.sell_price.cmp(&a.sell_price),
        ProductSortKey::Name => compare_text(&a.name, &b.name),
        ProductSortKey::Impact => b.impact().cmp(&a.impact()),
    }
}
