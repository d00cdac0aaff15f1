//! Dashboard analytics over costed product rows
//!
//! Everything here is computed from [`ProductRow`]s and the ingredient
//! catalog. Revenue, cost and profit only count products that could be
//! costed, so the three figures always agree with each other.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::IngredientCatalog;
use crate::costing::MarginStatus;
use crate::error::{CostingError, CostingResult};
use crate::view::{ProductCosting, ProductRow};

fn add(total: Decimal, value: Decimal, field: &str) -> CostingResult<Decimal> {
    total
        .checked_add(value)
        .ok_or_else(|| CostingError::invalid(field, "value out of range"))
}

fn times(value: Decimal, units: u32, field: &str) -> CostingResult<Decimal> {
    value
        .checked_mul(Decimal::from(units))
        .ok_or_else(|| CostingError::invalid(field, "value out of range"))
}

/// Counts and averages across the product list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductSummary {
    pub total_products: usize,
    pub profitable: usize,
    pub breaking_even: usize,
    pub losing_money: usize,
    pub uncosted: usize,
    /// Mean margin percent over costed products
    pub average_margin_percent: Option<Decimal>,
    /// Money lost per day by products that sell below cost
    pub daily_loss: Decimal,
}

impl ProductSummary {
    pub fn from_rows(rows: &[ProductRow]) -> CostingResult<Self> {
        let mut summary = ProductSummary {
            total_products: rows.len(),
            ..ProductSummary::default()
        };
        let mut margin_total = Decimal::ZERO;
        let mut costed = 0u32;

        for row in rows {
            let Some(margin) = row.margin() else {
                summary.uncosted += 1;
                continue;
            };
            costed += 1;
            margin_total = add(margin_total, margin.margin_percent, "average_margin_percent")?;
            match margin.status {
                MarginStatus::Profitable => summary.profitable += 1,
                MarginStatus::BreakingEven => summary.breaking_even += 1,
                MarginStatus::LosingMoney => {
                    summary.losing_money += 1;
                    let loss = times(margin.margin_amount.abs(), row.units_sold, "daily_loss")?;
                    summary.daily_loss = add(summary.daily_loss, loss, "daily_loss")?;
                }
            }
        }

        if costed > 0 {
            summary.average_margin_percent = margin_total.checked_div(Decimal::from(costed));
        }
        Ok(summary)
    }
}

/// Revenue, cost and profit for the reporting period
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeyMetrics {
    pub revenue: Decimal,
    pub costs: Decimal,
    pub profit: Decimal,
    /// `profit / revenue * 100`, absent without revenue
    pub average_margin_percent: Option<Decimal>,
}

impl KeyMetrics {
    pub fn from_rows(rows: &[ProductRow]) -> CostingResult<Self> {
        let mut revenue = Decimal::ZERO;
        let mut costs = Decimal::ZERO;

        for row in rows {
            if let Some(margin) = row.margin() {
                revenue = add(revenue, times(row.sell_price, row.units_sold, "revenue")?, "revenue")?;
                costs = add(costs, times(margin.total_cost, row.units_sold, "costs")?, "costs")?;
            }
        }

        let profit = revenue
            .checked_sub(costs)
            .ok_or_else(|| CostingError::invalid("profit", "value out of range"))?;
        let average_margin_percent = if revenue.is_zero() {
            None
        } else {
            profit
                .checked_mul(Decimal::ONE_HUNDRED)
                .and_then(|v| v.checked_div(revenue))
        };

        Ok(KeyMetrics {
            revenue,
            costs,
            profit,
            average_margin_percent,
        })
    }
}

/// Per-unit and period impact of one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImpact {
    pub id: Uuid,
    pub name: String,
    pub units_sold: u32,
    pub margin_percent: Decimal,
    pub per_unit: Decimal,
    /// `per_unit * units_sold`
    pub total: Decimal,
}

fn impacts(rows: &[ProductRow], status: MarginStatus) -> CostingResult<Vec<ProductImpact>> {
    rows.iter()
        .filter_map(|row| row.margin().filter(|m| m.status == status).map(|m| (row, m)))
        .map(|(row, margin)| {
            Ok(ProductImpact {
                id: row.id,
                name: row.name.clone(),
                units_sold: row.units_sold,
                margin_percent: margin.margin_percent,
                per_unit: margin.margin_amount,
                total: times(margin.margin_amount, row.units_sold, "total")?,
            })
        })
        .collect()
}

/// Losing products, biggest total loss first
pub fn top_losers(rows: &[ProductRow], limit: usize) -> CostingResult<Vec<ProductImpact>> {
    let mut losers = impacts(rows, MarginStatus::LosingMoney)?;
    losers.sort_by(|a, b| a.total.cmp(&b.total));
    losers.truncate(limit);
    Ok(losers)
}

/// Profitable products, biggest total profit first
pub fn top_winners(rows: &[ProductRow], limit: usize) -> CostingResult<Vec<ProductImpact>> {
    let mut winners = impacts(rows, MarginStatus::Profitable)?;
    winners.sort_by(|a, b| b.total.cmp(&a.total));
    winners.truncate(limit);
    Ok(winners)
}

/// A product the engine could not cost
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissingRecipe {
    pub id: Uuid,
    pub name: String,
    pub units_sold: u32,
    /// Ingredients with no cost on record; empty for an empty recipe
    pub unresolved: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn missing_recipes(rows: &[ProductRow]) -> Vec<MissingRecipe> {
    rows.iter()
        .filter_map(|row| {
            let (unresolved, reason) = match &row.costing {
                ProductCosting::Costed(_) => return None,
                ProductCosting::MissingRecipe { unresolved } => (unresolved.clone(), None),
                ProductCosting::Invalid { reason } => (Vec::new(), Some(reason.clone())),
            };
            Some(MissingRecipe {
                id: row.id,
                name: row.name.clone(),
                units_sold: row.units_sold,
                unresolved,
                reason,
            })
        })
        .collect()
}

/// Money lost to waste on one package of an ingredient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WasteLine {
    pub id: Uuid,
    pub name: String,
    pub waste_percent: Decimal,
    pub purchase_price: Decimal,
    pub waste_cost_per_package: Decimal,
}

/// Waste cost per ingredient, most expensive first
pub fn waste_breakdown(catalog: &IngredientCatalog) -> Vec<WasteLine> {
    let mut lines: Vec<WasteLine> = catalog
        .iter()
        .map(|i| WasteLine {
            id: i.id,
            name: i.name.clone(),
            waste_percent: i.waste_percent,
            purchase_price: i.purchase_price,
            waste_cost_per_package: i.waste_cost_per_package(),
        })
        .collect();
    lines.sort_by(|a, b| b.waste_cost_per_package.cmp(&a.waste_cost_per_package));
    lines
}

/// Catalog stat cards
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IngredientSummary {
    pub total_ingredients: usize,
    /// Mean waste percent, absent for an empty catalog
    pub average_waste_percent: Option<Decimal>,
}

impl IngredientSummary {
    pub fn from_catalog(catalog: &IngredientCatalog) -> CostingResult<Self> {
        let total_waste = catalog.iter().try_fold(Decimal::ZERO, |total, i| {
            add(total, i.waste_percent, "average_waste_percent")
        })?;
        let total_ingredients = catalog.len();
        let average_waste_percent = if total_ingredients == 0 {
            None
        } else {
            total_waste.checked_div(Decimal::from(total_ingredients))
        };
        Ok(IngredientSummary {
            total_ingredients,
            average_waste_percent,
        })
    }
}

/// Everything the analytics page shows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub summary: ProductSummary,
    pub ingredients: IngredientSummary,
    pub metrics: KeyMetrics,
    pub top_losers: Vec<ProductImpact>,
    pub top_winners: Vec<ProductImpact>,
    pub missing_recipes: Vec<MissingRecipe>,
    pub waste: Vec<WasteLine>,
    pub total_waste_cost: Decimal,
}

impl Dashboard {
    pub fn build(rows: &[ProductRow], catalog: &IngredientCatalog, limit: usize) -> CostingResult<Self> {
        let waste = waste_breakdown(catalog);
        let total_waste_cost = waste.iter().try_fold(Decimal::ZERO, |total, line| {
            add(total, line.waste_cost_per_package, "total_waste_cost")
        })?;

        Ok(Dashboard {
            summary: ProductSummary::from_rows(rows)?,
            ingredients: IngredientSummary::from_catalog(catalog)?,
            metrics: KeyMetrics::from_rows(rows)?,
            top_losers: top_losers(rows, limit)?,
            top_winners: top_winners(rows, limit)?,
            missing_recipes: missing_recipes(rows),
            waste,
            total_waste_cost,
        })
    }
}
